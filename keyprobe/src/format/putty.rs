//! PuTTY `.ppk` files, versions 2 and 3.
//!
//! ```text
//! PuTTY-User-Key-File-3: ssh-ed25519
//! Encryption: aes256-cbc
//! Comment: ed25519@keyprobe
//! Public-Lines: 2
//! <base64 public blob>
//! Key-Derivation: Argon2id          (version 3, encrypted only)
//! Argon2-Memory: 8192
//! ...
//! Private-Lines: 1
//! <base64 private blob>
//! Private-MAC: <hex>
//! ```
//!
//! The public blob is never encrypted.

use std::str::Lines;

use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::trace;

use super::{FormatParser, ParsedKey, cipher, text};
use crate::algorithm::KeyAlgorithm;
use crate::detect::{FormatSignature, PUTTY};
use crate::error::{Error, Malformed, Result};
use crate::public_key::PublicKey;

const HEADER_PREFIX: &str = "PuTTY-User-Key-File-";
const KEY_DERIVATION_HEADERS: &[&str] = &[
    "Key-Derivation",
    "Argon2-Memory",
    "Argon2-Passes",
    "Argon2-Parallelism",
    "Argon2-Salt",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PuttyParser;

impl FormatParser for PuttyParser {
    fn signature(&self) -> &'static FormatSignature {
        &PUTTY
    }

    fn parse(&self, input: &[u8]) -> Result<ParsedKey> {
        let mut fields = Fields::new(text(input)?);

        let (version, header_algorithm) = fields.preamble()?;
        let algorithm = KeyAlgorithm::from_ssh_name(header_algorithm)?;
        let encryption = fields.expect("Encryption")?;
        let comment = fields.expect("Comment")?;
        let public_blob = fields.block("Public-Lines")?;
        trace!(version, encryption, "PuTTY header");

        let public_key = PublicKey::from_blob(&public_blob)?;
        if public_key.algorithm() != algorithm {
            return Err(Error::structure(format!(
                "header algorithm {} does not match public key {}",
                algorithm,
                public_key.algorithm()
            )));
        }

        if version == 3 {
            fields.skip_key_derivation();
        }
        fields.block("Private-Lines")?;
        fields.expect("Private-MAC")?;

        let parsed = match cipher(encryption) {
            Some(name) => {
                let mut key = ParsedKey::encrypted(algorithm, name);
                key.public_key = Some(public_key);
                key
            }
            None => ParsedKey::unencrypted(public_key),
        };
        Ok(parsed.with_comment(Some(comment)))
    }
}

fn split(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}

/// Cursor over `Name: value` lines. Line endings may be LF or CRLF.
struct Fields<'a> {
    lines: std::iter::Peekable<Lines<'a>>,
}

impl<'a> Fields<'a> {
    fn new(input: &'a str) -> Self {
        Fields {
            lines: input.lines().peekable(),
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        self.lines.next().map(|line| line.trim_end_matches('\r'))
    }

    /// Skips text before the first header line and returns the file
    /// version and the declared algorithm.
    fn preamble(&mut self) -> Result<(u32, &'a str)> {
        while let Some(line) = self.next_line() {
            let Some(rest) = line.strip_prefix(HEADER_PREFIX) else {
                continue;
            };
            let (version, algorithm) =
                split(rest).ok_or(Malformed::MissingHeader("PuTTY-User-Key-File"))?;
            return match version {
                "2" => Ok((2, algorithm)),
                "3" => Ok((3, algorithm)),
                other => Err(Error::structure(format!("unsupported PuTTY version {}", other))),
            };
        }
        Err(Malformed::MissingHeader("PuTTY-User-Key-File").into())
    }

    fn expect(&mut self, name: &'static str) -> Result<&'a str> {
        let line = self.next_line().ok_or(Malformed::MissingHeader(name))?;
        match split(line) {
            Some((found, value)) if found == name => Ok(value),
            _ => Err(Malformed::MissingHeader(name).into()),
        }
    }

    /// Reads a `*-Lines: N` header and decodes the N base64 lines after it.
    fn block(&mut self, name: &'static str) -> Result<Vec<u8>> {
        let count: usize = self
            .expect(name)?
            .parse()
            .map_err(|_| Error::structure(format!("{} is not a line count", name)))?;
        let mut encoded = String::new();
        for _ in 0..count {
            let line = self
                .next_line()
                .ok_or_else(|| Error::structure(format!("{} declares {} lines", name, count)))?;
            encoded.push_str(line);
        }
        Ok(STANDARD.decode(encoded)?)
    }

    fn skip_key_derivation(&mut self) {
        while let Some(line) = self.lines.peek() {
            let is_kdf = split(line.trim_end_matches('\r'))
                .is_some_and(|(name, _)| KEY_DERIVATION_HEADERS.contains(&name));
            if !is_kdf {
                break;
            }
            self.lines.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::PuttyParser;
    use crate::algorithm::KeyAlgorithm;
    use crate::error::{Error, ErrorKind, Malformed};
    use crate::format::FormatParser;

    const V2_RSA: &str = include_str!("../../../testdata/keys/putty-v2-rsa-2048.ppk");
    const V2_RSA_ENCRYPTED: &str = include_str!("../../../testdata/keys/putty-v2-rsa-2048-encrypted.ppk");
    const V3_ED25519: &str = include_str!("../../../testdata/keys/putty-v3-ed25519.ppk");
    const V3_ED25519_ENCRYPTED: &str =
        include_str!("../../../testdata/keys/putty-v3-ed25519-encrypted.ppk");

    const ED25519_PUBLIC: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIPlx6qosU+6B/tOPThuk1p5TzVRiSKY+A0FNHQhG2t5N";

    fn ppk(header: &str, encryption: &str, public: &str, tail: &str) -> String {
        format!(
            "PuTTY-User-Key-File-{}\nEncryption: {}\nComment: test\nPublic-Lines: 1\n{}\n{}",
            header, encryption, public, tail
        )
    }

    #[rstest]
    #[case::v2_rsa(V2_RSA, KeyAlgorithm::Rsa, None)]
    #[case::v2_rsa_encrypted(V2_RSA_ENCRYPTED, KeyAlgorithm::Rsa, Some("aes256-cbc"))]
    #[case::v3_ed25519(V3_ED25519, KeyAlgorithm::Ed25519, None)]
    #[case::v3_ed25519_encrypted(V3_ED25519_ENCRYPTED, KeyAlgorithm::Ed25519, Some("aes256-cbc"))]
    fn test_parse(
        #[case] input: &str,
        #[case] expected: KeyAlgorithm,
        #[case] encryption: Option<&str>,
    ) {
        let key = PuttyParser.parse(input.as_bytes()).unwrap();
        assert_eq!(key.algorithm, expected);
        assert_eq!(key.encrypted, encryption.is_some());
        assert_eq!(key.encryption.as_deref(), encryption);
        assert!(key.public_key.is_some());
        assert!(key.comment.as_deref().is_some_and(|c| c.ends_with("@keyprobe")));
    }

    #[test]
    fn test_parse_synthetic_v3() {
        let input = ppk(
            "3: ssh-ed25519",
            "none",
            ED25519_PUBLIC,
            "Private-Lines: 1\nAAAA\nPrivate-MAC: 00\n",
        );
        let key = PuttyParser.parse(input.as_bytes()).unwrap();
        assert_eq!(key.comment.as_deref(), Some("test"));
    }

    #[rstest]
    #[case::algorithm_mismatch(ppk("2: ssh-rsa", "none", ED25519_PUBLIC, "Private-Lines: 1\nAAAA\nPrivate-MAC: 00\n"))]
    #[case::missing_mac(ppk("2: ssh-ed25519", "none", ED25519_PUBLIC, "Private-Lines: 1\nAAAA\n"))]
    #[case::short_private(ppk("2: ssh-ed25519", "none", ED25519_PUBLIC, "Private-Lines: 3\nAAAA\n"))]
    #[case::bad_count(ppk("2: ssh-ed25519", "none", ED25519_PUBLIC, "Private-Lines: many\n"))]
    #[case::bad_base64(ppk("2: ssh-ed25519", "none", "AAAA*", "Private-Lines: 0\nPrivate-MAC: 00\n"))]
    #[case::kdf_in_v2(ppk("2: ssh-ed25519", "aes256-cbc", ED25519_PUBLIC, "Key-Derivation: Argon2id\nPrivate-Lines: 0\nPrivate-MAC: 00\n"))]
    fn test_parse_malformed(#[case] input: String) {
        let err = PuttyParser.parse(input.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKeyData);
    }

    #[test]
    fn test_parse_missing_comment() {
        let input = "PuTTY-User-Key-File-2: ssh-ed25519\nEncryption: none\nPublic-Lines: 1\n";
        let err = PuttyParser.parse(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedKeyData(Malformed::MissingHeader("Comment"))
        ));
    }

    #[test]
    fn test_parse_unsupported_algorithm() {
        let input = ppk("3: ssh-ed448", "none", "AAAA", "");
        let err = PuttyParser.parse(input.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }
}
