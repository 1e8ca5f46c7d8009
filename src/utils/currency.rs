// Currency conversion and display formatting
// Author: kelexine (https://github.com/kelexine)

use phf::phf_map;

/// Exchange rates relative to NGN (1 NGN = rate units of the currency).
static EXCHANGE_RATES: phf::Map<&'static str, f64> = phf_map! {
    "NGN" => 1.0,
    "USD" => 0.0012,
    "EUR" => 0.0011,
    "GBP" => 0.00095,
};

static SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    "NGN" => "₦",
    "USD" => "$",
    "EUR" => "€",
    "GBP" => "£",
};

/// Currency codes conversion is available for.
pub fn supported_currencies() -> impl Iterator<Item = &'static str> {
    EXCHANGE_RATES.keys().copied()
}

/// Convert `amount` between two currency codes by way of NGN.
///
/// Identical codes return `amount` untouched, known or not. Returns `None`
/// when either code has no rate.
pub fn convert_currency(amount: f64, from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(amount);
    }

    let from_rate = EXCHANGE_RATES.get(from)?;
    let to_rate = EXCHANGE_RATES.get(to)?;

    let amount_in_ngn = amount / from_rate;
    Some(amount_in_ngn * to_rate)
}

/// Render `amount` as `<symbol> <1,234.56>`, using the code when no symbol is known.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let symbol = SYMBOLS.get(currency).copied().unwrap_or(currency);
    format!("{} {}", symbol, group_thousands(amount))
}

/// Two-decimal rendering with `,` thousands separators.
fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    // Avoid "-0.00" for tiny negatives that round to zero.
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ngn_to_usd() {
        let usd = convert_currency(1000.0, "NGN", "USD").unwrap();
        assert!(approx_eq(usd, 1.2), "got {}", usd);
    }

    #[test]
    fn test_same_currency_is_identity() {
        for x in [0.0, 1.5, -42.0, 1e12] {
            assert_eq!(convert_currency(x, "USD", "USD"), Some(x));
        }
        // Even for codes without a rate
        assert_eq!(convert_currency(3.0, "JPY", "JPY"), Some(3.0));
    }

    #[test]
    fn test_cross_rate_goes_through_ngn() {
        let eur = convert_currency(12.0, "USD", "EUR").unwrap();
        assert!(approx_eq(eur, 11.0), "got {}", eur);
    }

    #[test]
    fn test_unknown_currency() {
        assert_eq!(convert_currency(1.0, "NGN", "JPY"), None);
        assert_eq!(convert_currency(1.0, "XYZ", "USD"), None);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5, "NGN"), "₦ 1,234.50");
        assert_eq!(format_currency(1_000_000.0, "USD"), "$ 1,000,000.00");
        assert_eq!(format_currency(0.456, "GBP"), "£ 0.46");
        assert_eq!(format_currency(-950.0, "EUR"), "€ -950.00");
        assert_eq!(format_currency(12.0, "JPY"), "JPY 12.00");
    }

    #[test]
    fn test_supported_currencies() {
        let mut codes: Vec<_> = supported_currencies().collect();
        codes.sort_unstable();
        assert_eq!(codes, vec!["EUR", "GBP", "NGN", "USD"]);
    }
}
