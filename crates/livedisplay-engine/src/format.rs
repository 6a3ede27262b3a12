//! Number formatting for display strings.

use serde_json::Value;

const MAX_FRACTION_DIGITS: usize = 3;
const DEFAULT_MONEY_PLACES: u32 = 2;

/// Upper bound on money decimals, as with `toFixed`
pub const MAX_MONEY_PLACES: u32 = 100;

/// Insert `,` between groups of three integer digits.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn sign(n: f64, rendered: &str) -> &'static str {
    let is_zero = rendered.chars().all(|c| matches!(c, '0' | '.' | ','));
    if n.is_sign_negative() && !is_zero {
        "-"
    } else {
        ""
    }
}

/// Grouped number with at most three fraction digits, trailing zeros dropped.
///
/// `1234567.5` → `1,234,567.5`
pub fn localise_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = group_thousands(int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    format!("{}{}", sign(n, &out), out)
}

/// Numbers are localised; strings pass through; anything else is shown as JSON.
pub fn localise_value(value: &Value) -> String {
    match value {
        Value::Number(number) => number
            .as_f64()
            .map(localise_number)
            .unwrap_or_else(|| number.to_string()),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Grouped whole part followed by the fraction rounded to `dp` places;
/// `None` or `0` mean 2.
///
/// The fraction is rounded on its own, so it never carries into the whole
/// part: `0.999` with two places is `0.00`.
pub fn format_money_number(n: f64, dp: Option<u32>) -> String {
    let places = match dp {
        None | Some(0) => DEFAULT_MONEY_PLACES,
        Some(places) => places.min(MAX_MONEY_PLACES),
    } as usize;

    let magnitude = n.abs();
    let whole = format!("{:.0}", magnitude.floor());
    let fraction = format!("{:.*}", places, magnitude.fract());
    let decimals = fraction.split_once('.').map_or("", |(_, digits)| digits);
    let out = format!("{}.{}", group_thousands(&whole), decimals);
    format!("{}{}", sign(n, &out), out)
}
