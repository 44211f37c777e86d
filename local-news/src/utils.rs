/// Phone number helpers for the submission form and feed display
pub mod phone {
    pub const PHONE_DIGITS: usize = 10;
    const MASK: &str = "****";
    const LEADING_DIGITS: usize = 3;

    fn digits(phone: &str) -> String {
        phone.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Exactly ten digits once separators are stripped
    pub fn validate_phone_number(phone: &str) -> bool {
        digits(phone).len() == PHONE_DIGITS
    }

    /// Show the first 3 and last 2 digits, e.g. "987****10"
    pub fn mask_phone_number(phone: &str) -> String {
        mask_phone_number_with_tail(phone, 2)
    }

    /// Show the first 3 and last `tail` digits. Input with too few digits to
    /// mask is returned unchanged.
    pub fn mask_phone_number_with_tail(phone: &str, tail: usize) -> String {
        let digits = digits(phone);
        if digits.len() < LEADING_DIGITS + tail {
            return phone.to_string();
        }

        format!(
            "{}{}{}",
            &digits[..LEADING_DIGITS],
            MASK,
            &digits[digits.len() - tail..]
        )
    }
}

/// Text helpers
pub mod text {
    /// Case-insensitive substring match over a trimmed query
    pub fn matches_query(haystack: &str, query: &str) -> bool {
        haystack.to_lowercase().contains(&query.trim().to_lowercase())
    }

    pub fn is_blank(value: &str) -> bool {
        value.trim().is_empty()
    }
}
