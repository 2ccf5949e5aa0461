// Display helpers - number grouping, currency, account masking, timestamps

use chrono::{DateTime, Local, Utc};

/// Group digits in thousands: 1500000 → "1,500,000"
pub fn format_number(value: i64) -> String {
    let grouped = format_limit(value.unsigned_abs());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Same as `format_number` for stored (unsigned) limits
pub fn format_limit(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

fn currency_symbol(currency: &str) -> &str {
    match currency {
        "RUB" => "₽",
        "USD" => "$",
        "EUR" => "€",
        other => other,
    }
}

/// Whole-unit amount with currency symbol: (150000, "RUB") → "150,000 ₽"
pub fn format_currency(value: u64, currency: &str) -> String {
    format!("{} {}", format_limit(value), currency_symbol(currency))
}

/// Mask an account number, keeping the first 5 and last 4 characters
///
/// Example: "40817810500000001234" → "40817 **** 1234"
pub fn mask_account(account: &str) -> String {
    let chars: Vec<char> = account.chars().collect();
    if chars.len() < 9 {
        return account.to_string();
    }
    let prefix: String = chars[..5].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{} **** {}", prefix, suffix)
}

/// Local wall-clock time for the change log (HH:MM:SS)
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(50_000), "50,000");
        assert_eq!(format_number(1_500_000), "1,500,000");
        assert_eq!(format_number(-5), "-5");
        assert_eq!(format_number(-12_345), "-12,345");
    }

    #[test]
    fn test_format_limit_full_range() {
        assert_eq!(format_limit(0), "0");
        assert_eq!(format_limit(10_000_000), "10,000,000");
        assert_eq!(format_limit(u64::MAX), "18,446,744,073,709,551,615");
        assert_eq!(format_number(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(150_000, "RUB"), "150,000 ₽");
        assert_eq!(format_currency(10, "USD"), "10 $");
        assert_eq!(format_currency(2_000, "CHF"), "2,000 CHF");
    }

    #[test]
    fn test_mask_account() {
        assert_eq!(mask_account("40817810500000001234"), "40817 **** 1234");
        assert_eq!(mask_account("123456789"), "12345 **** 6789");
        assert_eq!(mask_account("12345678"), "12345678");
        assert_eq!(mask_account(""), "");
    }

    #[test]
    fn test_format_timestamp_shape() {
        let formatted = format_timestamp(&Utc::now());
        assert_eq!(formatted.len(), 8);
        assert_eq!(formatted.matches(':').count(), 2);
    }
}
