//! ID generation utilities for Circulate
//!
//! Provides functions for generating unique identifiers for books, users,
//! and loans.

use rand::Rng;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

fn generate_id(prefix: &str) -> String {
    let timestamp = now_ms();
    let random: u16 = rand::rng().random();
    format!("{}-{}-{:04x}", prefix, timestamp, random)
}

/// Generate a unique book ID
///
/// Format: `book-{timestamp_ms}-{random_hex}`
/// Example: `book-1738300800123-a1b2`
pub fn generate_book_id() -> String {
    generate_id("book")
}

/// Generate a unique user ID
///
/// Format: `user-{timestamp_ms}-{random_hex}`
pub fn generate_user_id() -> String {
    generate_id("user")
}

/// Generate a unique loan ID
///
/// Format: `loan-{timestamp_ms}-{random_hex}`
pub fn generate_loan_id() -> String {
    generate_id("loan")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_returns_reasonable_timestamp() {
        let ts = now_ms();
        // Should be after 2020-01-01 and before 2100-01-01
        assert!(ts > 1577836800000); // 2020-01-01
        assert!(ts < 4102444800000); // 2100-01-01
    }

    #[test]
    fn test_generate_book_id_format() {
        let id = generate_book_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "book");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        // 4-char hex suffix
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_user_id_prefix() {
        assert!(generate_user_id().starts_with("user-"));
    }

    #[test]
    fn test_generate_loan_id_prefix() {
        assert!(generate_loan_id().starts_with("loan-"));
    }

    #[test]
    fn test_generate_id_uniqueness() {
        let id1 = generate_loan_id();
        let id2 = generate_loan_id();
        // With random component, should be different
        assert_ne!(id1, id2);
    }
}
