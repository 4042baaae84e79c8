//! Short code generation and validation utilities.

use rand::Rng;

/// Length of a generated short code.
pub const SHORT_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a random 6-character lowercase base-36 short code.
///
/// The keyspace is small (36^6), so callers must check the code is unused
/// before storing it.
///
/// # Examples
///
/// ```ignore
/// let code = generate_short_code();
/// assert_eq!(code.len(), 6);
/// ```
pub fn generate_short_code() -> String {
    let mut rng = rand::rng();
    (0..SHORT_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns true if `code` could have been produced by [`generate_short_code`].
///
/// Used to reject junk on the public redirect route before touching storage.
pub fn is_valid_short_code(code: &str) -> bool {
    code.len() == SHORT_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}
