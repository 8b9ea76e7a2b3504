use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::algorithm::KeyAlgorithm;

/// On-disk container of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyFormat {
    /// PEM armored PKCS#1, DSA, SEC1 or PKCS#8 DER.
    LegacyPem,
    /// `openssh-key-v1` binary container.
    OpensshNew,
    /// PuTTY `.ppk`, versions 2 and 3.
    Putty,
    /// SSH.com / SECSH private key.
    Sshcom,
    Unknown,
}

impl KeyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyFormat::LegacyPem => "legacy-pem",
            KeyFormat::OpensshNew => "openssh-new",
            KeyFormat::Putty => "putty",
            KeyFormat::Sshcom => "sshcom",
            KeyFormat::Unknown => "unknown",
        }
    }
}

impl Display for KeyFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What was learned about one key file.
///
/// `bits` and both fingerprints are `None` when the public key cannot be
/// recovered without decrypting; they are never zero or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    #[serde(rename = "Format")]
    format: KeyFormat,
    #[serde(rename = "Type")]
    algorithm: KeyAlgorithm,
    #[serde(rename = "Encrypted")]
    encrypted: bool,
    #[serde(rename = "Bits")]
    bits: Option<u32>,
    #[serde(rename = "FingerprintMD5")]
    fingerprint_md5: Option<String>,
    #[serde(rename = "FingerprintSHA256")]
    fingerprint_sha256: Option<String>,
    #[serde(rename = "Encryption")]
    encryption: Option<String>,
    #[serde(rename = "Comment")]
    comment: Option<String>,
}

impl KeyDescriptor {
    pub(crate) fn new(format: KeyFormat, algorithm: KeyAlgorithm, encrypted: bool) -> Self {
        KeyDescriptor {
            format,
            algorithm,
            encrypted,
            bits: None,
            fingerprint_md5: None,
            fingerprint_sha256: None,
            encryption: None,
            comment: None,
        }
    }

    pub(crate) fn with_bits(mut self, bits: Option<u32>) -> Self {
        self.bits = bits;
        self
    }

    pub(crate) fn with_fingerprints(mut self, md5: String, sha256: String) -> Self {
        self.fingerprint_md5 = Some(md5);
        self.fingerprint_sha256 = Some(sha256);
        self
    }

    pub(crate) fn with_encryption(mut self, encryption: Option<String>) -> Self {
        self.encryption = encryption;
        self
    }

    pub(crate) fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Canonical algorithm name, e.g. `ssh-ed25519`.
    pub fn key_type(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn bits(&self) -> Option<u32> {
        self.bits
    }

    /// MD5 of the public key blob as colon separated hex pairs.
    pub fn fingerprint_md5(&self) -> Option<&str> {
        self.fingerprint_md5.as_deref()
    }

    /// SHA256 of the public key blob as `SHA256:` plus unpadded base64.
    pub fn fingerprint_sha256(&self) -> Option<&str> {
        self.fingerprint_sha256.as_deref()
    }

    /// Cipher named by the container, `None` for unencrypted keys.
    pub fn encryption(&self) -> Option<&str> {
        self.encryption.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
