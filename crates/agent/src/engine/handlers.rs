//! Per-intent handlers
//!
//! Handlers that park work (transfer, auto-pay, card management) set the
//! session state themselves. The rest reply with fixed text and a
//! descriptor the transport executes.

use voice_banking_core::{format_inr, BankingAction, CardAction, Entities, Intent};

use super::DialogueTurn;
use crate::session::{DialogueSession, DialogueState, PendingAction};

const GREETING: &str = "Hello! I'm your voice banking assistant. How can I help you today?";
const GOODBYE: &str = "Thank you for using voice banking. Have a great day!";

const LOAN_REPLY: &str = "You currently have a loan balance of ₹50,000. Your next payment of ₹5,000 is due on the 15th of next month. Would you like to make a payment now?";
const INTEREST_REPLY: &str = "Current interest rates: Savings Account: 4.5% per annum, Fixed Deposit: 7.0% per annum, Personal Loan: 12.5% per annum.";
const CREDIT_LIMIT_REPLY: &str = "Your credit card limit is ₹50,000. Available credit is ₹35,000.";
const REMINDER_REPLY: &str =
    "Reminder set successfully. You'll be notified before your payment due date.";
const PAYMENT_ALERT_REPLY: &str =
    "Payment alerts have been activated. You'll receive notifications for all transactions.";
const CHEQUEBOOK_REPLY: &str =
    "Cheque book request submitted. You'll receive it in 5-7 business days.";

/// Handle a classified intent from an idle session
///
/// `None` for intents with no handler; the engine answers those with a
/// clarification.
pub(super) fn dispatch(
    session: &mut DialogueSession,
    intent: Intent,
    entities: Entities,
    balance: f64,
) -> Option<DialogueTurn> {
    let turn = match intent {
        Intent::Greeting => DialogueTurn::reply(GREETING),
        Intent::Goodbye => {
            session.clear_pending();
            DialogueTurn::reply(GOODBYE)
        }
        Intent::CheckBalance => DialogueTurn::with_action(
            format!("Your current account balance is {}", format_inr(balance)),
            BankingAction::CheckBalance { balance },
        ),
        Intent::TransferFunds => transfer_funds(session, entities, balance),
        Intent::ViewTransactions => DialogueTurn::with_action(
            "Fetching your recent transactions...",
            BankingAction::ViewTransactions,
        ),
        Intent::LoanInquiry => DialogueTurn::with_action(LOAN_REPLY, BankingAction::LoanInquiry),
        Intent::InterestInquiry => {
            DialogueTurn::with_action(INTEREST_REPLY, BankingAction::InterestInquiry)
        }
        Intent::CreditLimitInquiry => {
            DialogueTurn::with_action(CREDIT_LIMIT_REPLY, BankingAction::CreditLimitInquiry)
        }
        Intent::SetReminder => DialogueTurn::with_action(REMINDER_REPLY, BankingAction::SetReminder),
        Intent::PaymentAlert => {
            DialogueTurn::with_action(PAYMENT_ALERT_REPLY, BankingAction::PaymentAlert)
        }
        Intent::SpendingSummary => {
            let period = entities.period.unwrap_or_default();
            DialogueTurn::with_action(
                format!(
                    "Fetching your spending summary for the last {}...",
                    period.spoken()
                ),
                BankingAction::SpendingSummary { period },
            )
        }
        Intent::CategorySpending => {
            let period = entities.period.unwrap_or_default();
            let category = entities.category.unwrap_or_else(|| "all".to_string());
            DialogueTurn::with_action(
                format!(
                    "Fetching your {} spending for the last {}...",
                    category,
                    period.spoken()
                ),
                BankingAction::CategorySpending { category, period },
            )
        }
        Intent::ViewNotifications => DialogueTurn::with_action(
            "Fetching your notifications...",
            BankingAction::ViewNotifications,
        ),
        Intent::SetupAutoPay => setup_auto_pay(session, entities),
        Intent::RequestChequebook => {
            DialogueTurn::with_action(CHEQUEBOOK_REPLY, BankingAction::RequestChequebook)
        }
        Intent::ManageCard => manage_card(session, entities),
        Intent::FraudAlert | Intent::Other => return None,
    };
    Some(turn)
}

/// Gather amount and recipient, check the balance, then ask for confirmation
pub(super) fn transfer_funds(
    session: &mut DialogueSession,
    entities: Entities,
    balance: f64,
) -> DialogueTurn {
    let amount = entities.amount.filter(|a| *a > 0.0);

    let Some(amount) = amount else {
        park(session, PendingAction::TransferFunds, entities);
        return DialogueTurn::reply("How much would you like to transfer?");
    };

    let Some(recipient) = entities.recipient_name.clone() else {
        park(session, PendingAction::TransferFunds, entities);
        return DialogueTurn::reply("Who would you like to transfer to?");
    };

    if amount > balance {
        session.clear_pending();
        return DialogueTurn::reply(format!(
            "Insufficient balance. Your current balance is {}",
            format_inr(balance)
        ));
    }

    session.set_state(DialogueState::AwaitingConfirmation {
        action: PendingAction::TransferFunds,
        entities: Entities {
            amount: Some(amount),
            recipient_name: Some(recipient.clone()),
            ..Default::default()
        },
    });
    DialogueTurn::reply(format!(
        "Please confirm: Transfer {} to {}. Say 'yes' to confirm or 'no' to cancel.",
        format_inr(amount),
        recipient
    ))
}

pub(super) fn setup_auto_pay(session: &mut DialogueSession, entities: Entities) -> DialogueTurn {
    let Some(bill_type) = entities.bill_type else {
        park(session, PendingAction::SetupAutoPay, entities);
        return DialogueTurn::reply("Which bill would you like to set up auto-pay for?");
    };

    session.clear_pending();
    DialogueTurn::with_action(
        format!(
            "Auto-pay has been set up for {} bills. You'll be notified before each payment.",
            bill_type
        ),
        BankingAction::SetupAutoPay { bill_type },
    )
}

pub(super) fn manage_card(session: &mut DialogueSession, entities: Entities) -> DialogueTurn {
    let card_action = entities.card_action.unwrap_or_default();
    let card_type = entities.card_type.unwrap_or_default();

    match card_action {
        CardAction::Block => {
            session.set_state(DialogueState::AwaitingConfirmation {
                action: PendingAction::BlockCard,
                entities,
            });
            DialogueTurn::reply(format!(
                "Your {} card will be blocked. Please confirm.",
                card_type
            ))
        }
        CardAction::Unblock => {
            session.clear_pending();
            DialogueTurn::with_action(
                format!("Your {} card has been unblocked.", card_type),
                BankingAction::ManageCard {
                    card_action,
                    card_type,
                    limit: None,
                },
            )
        }
        CardAction::SetLimit => match entities.limit.filter(|l| *l > 0.0) {
            None => {
                park(session, PendingAction::SetCardLimit, entities);
                DialogueTurn::reply("What spending limit would you like to set?")
            }
            Some(limit) => {
                session.clear_pending();
                DialogueTurn::with_action(
                    format!(
                        "Spending limit set to {} for your {} card.",
                        format_inr(limit),
                        card_type
                    ),
                    BankingAction::ManageCard {
                        card_action,
                        card_type,
                        limit: Some(limit),
                    },
                )
            }
        },
        CardAction::View => {
            session.clear_pending();
            DialogueTurn::with_action(
                format!("Here are your {} card details.", card_type),
                BankingAction::ManageCard {
                    card_action,
                    card_type,
                    limit: None,
                },
            )
        }
    }
}

fn park(session: &mut DialogueSession, action: PendingAction, entities: Entities) {
    tracing::debug!(session_id = %session.id(), %action, "Waiting for missing slot");
    session.set_state(DialogueState::SlotFilling { action, entities });
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_banking_core::{BillType, CardType, Period};

    fn session() -> DialogueSession {
        DialogueSession::new("s1", "u1")
    }

    #[test]
    fn test_fixed_replies_name_their_intent() {
        for intent in [
            Intent::LoanInquiry,
            Intent::InterestInquiry,
            Intent::CreditLimitInquiry,
            Intent::SetReminder,
            Intent::PaymentAlert,
            Intent::ViewTransactions,
            Intent::RequestChequebook,
            Intent::ViewNotifications,
        ] {
            let turn = dispatch(&mut session(), intent, Entities::default(), 0.0).unwrap();
            let name = turn.action.as_ref().and_then(|a| a.action_name());
            assert_eq!(name, Some(intent.as_str()));
        }
    }

    #[test]
    fn test_spending_defaults() {
        let turn =
            dispatch(&mut session(), Intent::CategorySpending, Entities::default(), 0.0).unwrap();
        assert_eq!(turn.response, "Fetching your all spending for the last month...");

        let entities = Entities {
            period: Some(Period::LastWeek),
            ..Default::default()
        };
        let turn = dispatch(&mut session(), Intent::SpendingSummary, entities, 0.0).unwrap();
        assert_eq!(turn.response, "Fetching your spending summary for the last week...");
        assert_eq!(
            turn.action,
            Some(
                BankingAction::SpendingSummary {
                    period: Period::LastWeek
                }
                .into()
            )
        );
    }

    #[test]
    fn test_unhandled_intents_have_no_turn() {
        let mut session = session();
        for intent in [Intent::FraudAlert, Intent::Other] {
            assert!(dispatch(&mut session, intent, Entities::default(), 0.0).is_none());
        }
        assert_eq!(session.state(), &DialogueState::Idle);
    }

    #[test]
    fn test_confirmation_parks_only_transfer_slots() {
        let mut session = session();
        let entities = Entities {
            amount: Some(500.0),
            recipient_name: Some("Akash".to_string()),
            account_number: Some("12345678".to_string()),
            category: Some("food".to_string()),
            ..Default::default()
        };
        transfer_funds(&mut session, entities, 1000.0);

        let parked = session.pending_entities().cloned().unwrap();
        assert_eq!(
            parked,
            Entities {
                amount: Some(500.0),
                recipient_name: Some("Akash".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut session = session();
        let entities = Entities {
            amount: Some(5000.0),
            recipient_name: Some("Akash".to_string()),
            ..Default::default()
        };
        let turn = transfer_funds(&mut session, entities, 1000.0);
        assert_eq!(
            turn.response,
            "Insufficient balance. Your current balance is ₹1,000.00"
        );
        assert_eq!(session.state(), &DialogueState::Idle);
    }

    #[test]
    fn test_transfer_parks_missing_recipient() {
        let mut session = session();
        let entities = Entities {
            amount: Some(500.0),
            ..Default::default()
        };
        let turn = transfer_funds(&mut session, entities, 1000.0);
        assert_eq!(turn.response, "Who would you like to transfer to?");
        assert_eq!(session.pending_action(), Some(PendingAction::TransferFunds));
        assert_eq!(
            session.pending_entities().and_then(|e| e.amount),
            Some(500.0)
        );
    }

    #[test]
    fn test_zero_amount_is_missing() {
        let mut session = session();
        let entities = Entities {
            amount: Some(0.0),
            recipient_name: Some("Akash".to_string()),
            ..Default::default()
        };
        let turn = transfer_funds(&mut session, entities, 1000.0);
        assert_eq!(turn.response, "How much would you like to transfer?");
    }

    #[test]
    fn test_auto_pay() {
        let mut session = session();
        let turn = setup_auto_pay(&mut session, Entities::default());
        assert_eq!(turn.response, "Which bill would you like to set up auto-pay for?");
        assert_eq!(session.pending_action(), Some(PendingAction::SetupAutoPay));

        let entities = Entities {
            bill_type: Some(BillType::Electricity),
            ..Default::default()
        };
        let turn = setup_auto_pay(&mut session, entities);
        assert_eq!(
            turn.response,
            "Auto-pay has been set up for electricity bills. You'll be notified before each payment."
        );
        assert!(session.pending_action().is_none());
    }

    #[test]
    fn test_card_actions() {
        let mut session = session();
        let turn = manage_card(&mut session, Entities::default());
        assert_eq!(turn.response, "Here are your debit card details.");

        let entities = Entities {
            card_action: Some(CardAction::Unblock),
            card_type: Some(CardType::Credit),
            ..Default::default()
        };
        let turn = manage_card(&mut session, entities);
        assert_eq!(turn.response, "Your credit card has been unblocked.");

        let entities = Entities {
            card_action: Some(CardAction::SetLimit),
            limit: Some(20_000.0),
            ..Default::default()
        };
        let turn = manage_card(&mut session, entities);
        assert_eq!(
            turn.response,
            "Spending limit set to ₹20,000.00 for your debit card."
        );
        assert_eq!(
            turn.action,
            Some(
                BankingAction::ManageCard {
                    card_action: CardAction::SetLimit,
                    card_type: CardType::Debit,
                    limit: Some(20_000.0),
                }
                .into()
            )
        );
    }
}
