//! Display formatting helpers shared by both dashboards

/// Format a price or cash amount as currency with two decimals
pub fn currency(value: f64) -> String {
    format!("${:.2}", value)
}

/// Format a signed amount with the sign ahead of the dollar sign
pub fn signed_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("+${:.2}", value)
    } else {
        format!("-${:.2}", value.abs())
    }
}

/// Format an optional amount, `-` when the server sent null
pub fn currency_or_dash(value: Option<f64>) -> String {
    value.map(currency).unwrap_or_else(|| "-".to_string())
}

/// Format a signed percentage with two decimals
pub fn percent(value: f64) -> String {
    format!("{:+.2}%", value)
}

/// Format a share count with thousands separators
pub fn quantity(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
