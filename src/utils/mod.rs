//! Shared helpers: short-code generation and path-segment validation

/// 62-symbol alphanumeric alphabet (62^8 ≈ 2.2e14 at the default length)
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random short code
///
/// Draws from the thread-local CSPRNG, so codes are not guessable from
/// previously issued ones.
pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Mint a fresh tracking id. One per visit: re-visits by the same visitor
/// intentionally get a new id so each click is its own attribution anchor.
pub fn generate_tracking_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generated short codes: 6-10 chars, alphanumeric only
pub fn is_valid_short_code(code: &str) -> bool {
    (6..=10).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Custom aliases: 3-50 chars, alphanumeric plus hyphen and underscore
pub fn is_valid_custom_alias(alias: &str) -> bool {
    (3..=50).contains(&alias.len())
        && alias
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// External video ids are fixed-format: 11 chars of [A-Za-z0-9_-]
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
