//! Per-format parsers.
//!
//! Every parser turns raw bytes, already matched by its
//! [`FormatSignature`], into a [`ParsedKey`]. Bit length and fingerprints
//! are derived from the `ParsedKey` afterwards by the identifier.

pub mod legacy_pem;
pub mod openssh;
mod pkcs;
pub mod putty;
pub mod sshcom;

use crate::algorithm::KeyAlgorithm;
use crate::detect::FormatSignature;
use crate::error::{Malformed, Result};
use crate::public_key::PublicKey;

pub use legacy_pem::LegacyPemParser;
pub use openssh::OpensshParser;
pub use putty::PuttyParser;
pub use sshcom::SshcomParser;

/// Normalized result of parsing one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub algorithm: KeyAlgorithm,
    pub encrypted: bool,
    /// Cipher declared by the container, `None` when unencrypted.
    pub encryption: Option<String>,
    pub comment: Option<String>,
    /// Present only when it can be read without decrypting.
    pub public_key: Option<PublicKey>,
}

impl ParsedKey {
    pub(crate) fn encrypted(algorithm: KeyAlgorithm, cipher: &str) -> Self {
        ParsedKey {
            algorithm,
            encrypted: true,
            encryption: Some(cipher.to_string()),
            comment: None,
            public_key: None,
        }
    }

    pub(crate) fn unencrypted(public_key: PublicKey) -> Self {
        ParsedKey {
            algorithm: public_key.algorithm(),
            encrypted: false,
            encryption: None,
            comment: None,
            public_key: Some(public_key),
        }
    }

    pub(crate) fn with_comment(mut self, comment: Option<&str>) -> Self {
        self.comment = comment.filter(|c| !c.is_empty()).map(str::to_string);
        self
    }
}

pub trait FormatParser: Send + Sync {
    fn signature(&self) -> &'static FormatSignature;

    fn parse(&self, input: &[u8]) -> Result<ParsedKey>;

    fn detect(&self, input: &[u8]) -> bool {
        self.signature().matches(input)
    }
}

/// Parsers in detection order.
pub fn default_parsers() -> Vec<Box<dyn FormatParser>> {
    vec![
        Box::new(OpensshParser),
        Box::new(LegacyPemParser),
        Box::new(PuttyParser),
        Box::new(SshcomParser),
    ]
}

pub(crate) fn text(input: &[u8]) -> Result<&str> {
    std::str::from_utf8(input).map_err(|_| Malformed::InvalidUtf8.into())
}

/// `"none"` means unencrypted; any other cipher name is kept.
pub(crate) fn cipher(name: &str) -> Option<&str> {
    (name != "none").then_some(name)
}
