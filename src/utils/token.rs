use rand::Rng;
use rand::distr::Alphanumeric;

/// Generate an opaque random token of the given length
///
/// Tokens are drawn from the alphanumeric character set, so they are
/// safe to transport in HTTP headers without further encoding.
///
/// # Arguments
/// * `length` - Number of characters in the generated token
///
/// # Returns
/// * `String` - The generated token
pub fn generate_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
