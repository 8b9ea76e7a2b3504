//! Key algorithms and the table that normalizes their spellings.
//!
//! Every container spells algorithms its own way: PEM labels say
//! `RSA PRIVATE KEY`, SSH blobs say `ssh-rsa`, fixture files say `rsa`.
//! [`KeyAlgorithm::name`] is the single canonical spelling (the SSH
//! algorithm name) and [`ALIASES`] is the one place where other spellings
//! are mapped onto it.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use keyprobe_asn1::ObjectIdentifier;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const OID_SECP256R1: &str = "1.2.840.10045.3.1.7";
pub const OID_SECP384R1: &str = "1.3.132.0.34";
pub const OID_SECP521R1: &str = "1.3.132.0.35";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcdsaCurve {
    NistP256,
    NistP384,
    NistP521,
}

impl EcdsaCurve {
    /// Curve identifier used inside SSH ECDSA blobs.
    pub fn identifier(&self) -> &'static str {
        match self {
            EcdsaCurve::NistP256 => "nistp256",
            EcdsaCurve::NistP384 => "nistp384",
            EcdsaCurve::NistP521 => "nistp521",
        }
    }

    pub fn oid(&self) -> &'static str {
        match self {
            EcdsaCurve::NistP256 => OID_SECP256R1,
            EcdsaCurve::NistP384 => OID_SECP384R1,
            EcdsaCurve::NistP521 => OID_SECP521R1,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            EcdsaCurve::NistP256 => 256,
            EcdsaCurve::NistP384 => 384,
            EcdsaCurve::NistP521 => 521,
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.identifier() == identifier)
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL.into_iter().find(|c| *oid == c.oid())
    }

    const ALL: [EcdsaCurve; 3] = [
        EcdsaCurve::NistP256,
        EcdsaCurve::NistP384,
        EcdsaCurve::NistP521,
    ];
}

/// A supported key algorithm.
///
/// `Ecdsa(None)` is an ECDSA key whose curve cannot be read without
/// decrypting (encrypted legacy PEM). Its name is the bare family `ecdsa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum KeyAlgorithm {
    Rsa,
    Dsa,
    Ecdsa(Option<EcdsaCurve>),
    Ed25519,
}

const ECDSA_FAMILY: &str = "ecdsa";

/// Alternative spellings accepted by [`KeyAlgorithm::from_str`].
pub const ALIASES: &[(&str, KeyAlgorithm)] = &[
    ("rsa", KeyAlgorithm::Rsa),
    ("dsa", KeyAlgorithm::Dsa),
    ("dss", KeyAlgorithm::Dsa),
    ("ed25519", KeyAlgorithm::Ed25519),
    ("ecdsa", KeyAlgorithm::Ecdsa(None)),
    ("nistp256", KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP256))),
    ("nistp384", KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP384))),
    ("nistp521", KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP521))),
];

impl KeyAlgorithm {
    /// Canonical SSH algorithm name, e.g. `ssh-rsa` or `ecdsa-sha2-nistp256`.
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "ssh-rsa",
            KeyAlgorithm::Dsa => "ssh-dss",
            KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP256)) => "ecdsa-sha2-nistp256",
            KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP384)) => "ecdsa-sha2-nistp384",
            KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP521)) => "ecdsa-sha2-nistp521",
            KeyAlgorithm::Ecdsa(None) => ECDSA_FAMILY,
            KeyAlgorithm::Ed25519 => "ssh-ed25519",
        }
    }

    /// The name with any ECDSA curve suffix dropped.
    pub fn family(&self) -> &'static str {
        match self {
            KeyAlgorithm::Ecdsa(_) => ECDSA_FAMILY,
            other => other.name(),
        }
    }

    /// Parses an algorithm name as it appears inside an SSH public key blob.
    /// Only canonical names are accepted.
    pub fn from_ssh_name(name: &str) -> Result<Self, Error> {
        match name {
            "ssh-rsa" => Ok(KeyAlgorithm::Rsa),
            "ssh-dss" => Ok(KeyAlgorithm::Dsa),
            "ssh-ed25519" => Ok(KeyAlgorithm::Ed25519),
            _ => name
                .strip_prefix("ecdsa-sha2-")
                .and_then(EcdsaCurve::from_identifier)
                .map(|c| KeyAlgorithm::Ecdsa(Some(c)))
                .ok_or_else(|| Error::UnsupportedAlgorithm(name.to_string())),
        }
    }
}

impl Display for KeyAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ECDSA_FAMILY {
            return Ok(KeyAlgorithm::Ecdsa(None));
        }
        KeyAlgorithm::from_ssh_name(s).or_else(|err| {
            let lower = s.to_ascii_lowercase();
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == lower)
                .map(|(_, algorithm)| *algorithm)
                .ok_or(err)
        })
    }
}

impl From<KeyAlgorithm> for String {
    fn from(algorithm: KeyAlgorithm) -> Self {
        algorithm.name().to_string()
    }
}

impl TryFrom<String> for KeyAlgorithm {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use keyprobe_asn1::ObjectIdentifier;
    use rstest::rstest;

    use super::{EcdsaCurve, KeyAlgorithm};
    use crate::error::ErrorKind;

    #[rstest]
    #[case("ssh-rsa", KeyAlgorithm::Rsa)]
    #[case("ssh-dss", KeyAlgorithm::Dsa)]
    #[case("ssh-ed25519", KeyAlgorithm::Ed25519)]
    #[case("ecdsa-sha2-nistp256", KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP256)))]
    #[case("ecdsa-sha2-nistp384", KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP384)))]
    #[case("ecdsa-sha2-nistp521", KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP521)))]
    fn test_from_ssh_name(#[case] name: &str, #[case] expected: KeyAlgorithm) {
        let algorithm = KeyAlgorithm::from_ssh_name(name).unwrap();
        assert_eq!(algorithm, expected);
        assert_eq!(algorithm.name(), name);
    }

    #[rstest]
    #[case("rsa")]
    #[case("ecdsa")]
    #[case("ssh-ed448")]
    #[case("ecdsa-sha2-nistp192")]
    #[case("sk-ssh-ed25519@openssh.com")]
    fn test_from_ssh_name_rejects(#[case] name: &str) {
        let err = KeyAlgorithm::from_ssh_name(name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }

    #[rstest]
    #[case("rsa", KeyAlgorithm::Rsa)]
    #[case("RSA", KeyAlgorithm::Rsa)]
    #[case("dsa", KeyAlgorithm::Dsa)]
    #[case("ed25519", KeyAlgorithm::Ed25519)]
    #[case("ecdsa", KeyAlgorithm::Ecdsa(None))]
    #[case("ssh-dss", KeyAlgorithm::Dsa)]
    fn test_from_str_aliases(#[case] name: &str, #[case] expected: KeyAlgorithm) {
        assert_eq!(KeyAlgorithm::from_str(name).unwrap(), expected);
    }

    #[rstest]
    #[case(KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP256)), "ecdsa")]
    #[case(KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP521)), "ecdsa")]
    #[case(KeyAlgorithm::Ecdsa(None), "ecdsa")]
    #[case(KeyAlgorithm::Rsa, "ssh-rsa")]
    #[case(KeyAlgorithm::Ed25519, "ssh-ed25519")]
    fn test_family(#[case] algorithm: KeyAlgorithm, #[case] expected: &str) {
        assert_eq!(algorithm.family(), expected);
        assert!(algorithm.name().starts_with(algorithm.family()));
    }

    #[rstest]
    #[case("1.2.840.10045.3.1.7", Some(EcdsaCurve::NistP256))]
    #[case("1.3.132.0.34", Some(EcdsaCurve::NistP384))]
    #[case("1.3.132.0.35", Some(EcdsaCurve::NistP521))]
    #[case("1.3.132.0.10", None)]
    fn test_curve_from_oid(#[case] oid: &str, #[case] expected: Option<EcdsaCurve>) {
        let oid = ObjectIdentifier::from_str(oid).unwrap();
        assert_eq!(EcdsaCurve::from_oid(&oid), expected);
    }

    #[test]
    fn test_serde_uses_canonical_name() {
        let algorithm = KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP384));
        let json = serde_json::to_string(&algorithm).unwrap();
        assert_eq!(json, r#""ecdsa-sha2-nistp384""#);
        let parsed: KeyAlgorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, algorithm);
    }
}
