/// Normalize a phone number into the `(dd) ddddd-dddd` display pattern.
///
/// Non-digit characters are stripped first and anything past eleven digits
/// is dropped, so feeding the function its own output changes nothing.
/// Shorter inputs are formatted as far as the digits go, mirroring the
/// progressive masking the roster form applies while the user types.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(11)
        .collect();

    match digits.len() {
        0 => String::new(),
        1..=2 => format!("({digits}"),
        3..=7 => format!("({}) {}", &digits[..2], &digits[2..]),
        _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_full_mobile_number() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
    }

    #[test]
    fn formats_partial_number() {
        assert_eq!(format_phone("119876"), "(11) 9876");
    }

    #[test]
    fn strips_non_digit_input() {
        assert_eq!(format_phone("11.98765.4321"), "(11) 98765-4321");
        assert_eq!(format_phone("11 98765 4321"), "(11) 98765-4321");
    }

    #[test]
    fn truncates_past_eleven_digits() {
        assert_eq!(format_phone("119876543210000"), "(11) 98765-4321");
    }

    #[test]
    fn idempotent_on_own_output() {
        for raw in ["1", "11", "119", "1198765", "11987654", "11987654321"] {
            let once = format_phone(raw);
            assert_eq!(format_phone(&once), once, "re-applying changed {raw:?}");
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("abc"), "");
    }
}
