//! Deterministic guest entry-code derivation.
//!
//! The daily distribution run derives each guest's door code from their phone
//! number, so re-running the job for the same guest always produces the same
//! code. The code is the last four digits of the phone number with all
//! formatting (country prefix, punctuation, spaces) ignored.

/// Derive a four-digit entry code from a guest phone number.
///
/// Returns `None` when the phone number contains fewer than four digits,
/// which the distribution run treats as a per-guest failure rather than
/// provisioning a short code.
///
/// ```
/// use lockdesk_core::entry_code::derive;
///
/// assert_eq!(derive("+15551234567").as_deref(), Some("4567"));
/// ```
pub fn derive(phone: &str) -> Option<String> {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }
    Some(digits[digits.len() - 4..].iter().collect())
}
