//! Digests for sticker bytes and scan outcomes.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// SHA-256 over the compact JSON encoding of `value`.
///
/// Struct fields serialize in declaration order, so equal values always
/// produce equal digests.
pub fn json_digest<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let encoded = serde_json::to_vec(value)?;
    Ok(sha256_hex(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Outcome<'a> {
        name: &'a str,
        valid: bool,
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn json_digest_tracks_content() {
        let ok = [Outcome { name: "tray.png", valid: true }];
        let bad = [Outcome { name: "tray.png", valid: false }];

        assert_eq!(json_digest(&ok[..]).unwrap(), json_digest(&ok[..]).unwrap());
        assert_ne!(json_digest(&ok[..]).unwrap(), json_digest(&bad[..]).unwrap());
    }
}
