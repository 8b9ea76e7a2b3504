//! Public key fingerprints in the presentation `ssh-keygen -l` uses.

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use keyprobe_codec::encoder::Encoder;
use md5::Md5;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::public_key::PublicKey;

pub const SHA256_PREFIX: &str = "SHA256:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprints {
    pub md5: String,
    pub sha256: String,
}

/// Lowercase hex pairs joined by colons, without a prefix.
pub fn md5(blob: &[u8]) -> String {
    Md5::digest(blob)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// `SHA256:` followed by unpadded standard base64.
pub fn sha256(blob: &[u8]) -> String {
    format!("{}{}", SHA256_PREFIX, STANDARD_NO_PAD.encode(Sha256::digest(blob)))
}

/// Fingerprints the canonical blob of `key`.
pub fn compute(key: &PublicKey) -> Result<Fingerprints> {
    let blob: Vec<u8> = key.encode()?;
    Ok(Fingerprints {
        md5: md5(&blob),
        sha256: sha256(&blob),
    })
}
