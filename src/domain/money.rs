use rust_decimal::Decimal;

/// Parses a user-entered decimal amount.
///
/// Leading/trailing whitespace is ignored. Returns `None` for anything that
/// is not a plain decimal number; sign and range checks are left to the
/// caller, which knows the operation being performed.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    input.parse::<Decimal>().ok()
}

/// Renders an amount as fixed 2-decimal text, the form used in the
/// persisted account records.
pub fn fixed2(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Renders an amount for display, e.g. `$1234.50`.
pub fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", amount)
}
