/// Logging utilities for address redaction
///
/// Mailbox names are user data; logs keep the domain for debugging and mask
/// the local part.
use regex::Regex;
use std::sync::LazyLock;

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\b").expect("address pattern is valid")
});

/// Redacts mail addresses in text, preserving the domain
///
/// # Examples
/// ```
/// use tempmail_core::utils::logging::redact_address;
///
/// assert_eq!(redact_address("alice@example.com"), "***@example.com");
/// assert_eq!(redact_address("to: bob@mail.test now"), "to: ***@mail.test now");
/// ```
pub fn redact_address(text: &str) -> String {
    ADDRESS_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let address = &caps[0];
            match address.find('@') {
                Some(at) => format!("***{}", &address[at..]),
                None => "***@***".to_string(),
            }
        })
        .to_string()
}
