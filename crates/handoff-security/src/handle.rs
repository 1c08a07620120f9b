//! Opaque session-handle generation

use rand::Rng;

const HANDLE_BYTES: usize = 32;

/// Generate the opaque token identifying a pending session record.
///
/// The handle travels inside deep links and is the consume key; it carries
/// no structure and is distinct from the final app session id.
pub fn generate_session_handle() -> String {
    let bytes: [u8; HANDLE_BYTES] = rand::rng().random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_is_hex_encoded() {
        let handle = generate_session_handle();
        assert_eq!(handle.len(), HANDLE_BYTES * 2);
        assert!(handle.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_handles_are_unique() {
        assert_ne!(generate_session_handle(), generate_session_handle());
    }
}
