//! Rupee formatting for spoken responses

/// Format an amount as rupees with thousands separators and two decimals.
///
/// `5000.0` becomes `₹5,000.00`.
pub fn format_inr(amount: f64) -> String {
    let paise = (amount.abs() * 100.0).round() as u64;
    let whole = (paise / 100).to_string();
    let fraction = paise % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };
    format!("{}₹{}.{:02}", sign, grouped, fraction)
}
