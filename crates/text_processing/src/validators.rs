//! Email and phone validators
//!
//! Both return a plain `bool`; callers re-prompt on failure.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static PHONE_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d+]").unwrap());

// Nepali mobile numbers: +977 prefix, bare 10 digits, or a leading 0
static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\+9779[6-8]\d{8}$").unwrap(),
        Regex::new(r"^9[6-8]\d{8}$").unwrap(),
        Regex::new(r"^09[6-8]\d{8}$").unwrap(),
    ]
});

/// Syntactic email check, no DNS or mailbox verification
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Check a phone number against the Nepali mobile numbering plan
///
/// Everything except digits and `+` is stripped before matching, so
/// `"+977 981-234-5678"` is accepted.
pub fn validate_phone(phone: &str) -> bool {
    let clean = PHONE_NOISE.replace_all(phone, "");
    PHONE_PATTERNS.iter().any(|p| p.is_match(&clean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("jane@example.com"));
        assert!(validate_email("jane.doe+tag@mail.example.co"));
        assert!(validate_email("J_D%1@sub-domain.example.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!validate_email("jane.example.com"));
        assert!(!validate_email("jane@example"));
        assert!(!validate_email("jane@example.c"));
        assert!(!validate_email("jane@@example.com"));
        assert!(!validate_email("jane doe@example.com"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_local_phone_numbers() {
        for prefix in ["96", "97", "98"] {
            let number = format!("{}12345678", prefix);
            assert!(validate_phone(&number), "{} should be valid", number);
            assert!(validate_phone(&format!("0{}", number)));
            assert!(validate_phone(&format!("+977{}", number)));
        }
    }

    #[test]
    fn test_phone_formatting_is_stripped() {
        assert!(validate_phone("981-234-5678"));
        assert!(validate_phone("+977 (981) 234 5678"));
        assert!(validate_phone(" 9812345678 "));
    }

    #[test]
    fn test_invalid_phone_numbers() {
        assert!(!validate_phone("123"));
        assert!(!validate_phone("9512345678"));
        assert!(!validate_phone("9912345678"));
        assert!(!validate_phone("981234567"));
        assert!(!validate_phone("98123456789"));
        assert!(!validate_phone("+9199812345678"));
        assert!(!validate_phone("977981234567"));
        assert!(!validate_phone("0098123456789"));
        assert!(!validate_phone(""));
    }

    #[test]
    fn test_other_digit_strings_rejected() {
        // Every length from 1 to 14 with a non-mobile leading digit
        for len in 1..=14 {
            let number = "1".repeat(len);
            assert!(!validate_phone(&number));
        }
    }
}
