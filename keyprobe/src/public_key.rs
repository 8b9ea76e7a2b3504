use keyprobe_codec::encoder::{EncodableTo, Encoder};
use num_bigint::BigUint;

use crate::algorithm::{EcdsaCurve, KeyAlgorithm};
use crate::error::{Error, Result};
use crate::wire::{Reader, Writer};

const ED25519_KEY_LEN: usize = 32;

/// The public half of a key, holding exactly the fields of its SSH blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa {
        e: BigUint,
        n: BigUint,
    },
    Dsa {
        p: BigUint,
        q: BigUint,
        g: BigUint,
        y: BigUint,
    },
    Ecdsa {
        curve: EcdsaCurve,
        point: Vec<u8>,
    },
    Ed25519 {
        key: Vec<u8>,
    },
}

impl PublicKey {
    pub(crate) fn rsa(e: BigUint, n: BigUint) -> Result<Self> {
        if n.bits() == 0 {
            return Err(Error::structure("RSA modulus is zero"));
        }
        Ok(PublicKey::Rsa { e, n })
    }

    pub(crate) fn dsa(p: BigUint, q: BigUint, g: BigUint, y: BigUint) -> Result<Self> {
        if p.bits() == 0 {
            return Err(Error::structure("DSA prime is zero"));
        }
        Ok(PublicKey::Dsa { p, q, g, y })
    }

    pub(crate) fn ecdsa(curve: EcdsaCurve, point: &[u8]) -> Result<Self> {
        if point.is_empty() {
            return Err(Error::structure("empty ECDSA public point"));
        }
        Ok(PublicKey::Ecdsa {
            curve,
            point: point.to_vec(),
        })
    }

    pub(crate) fn ed25519(key: &[u8]) -> Result<Self> {
        if key.len() != ED25519_KEY_LEN {
            return Err(Error::structure(format!(
                "Ed25519 public key is {} bytes",
                key.len()
            )));
        }
        Ok(PublicKey::Ed25519 { key: key.to_vec() })
    }

    /// Parses an SSH wire format public key blob.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(blob);
        let name = reader.str()?;
        let key = match KeyAlgorithm::from_ssh_name(name)? {
            KeyAlgorithm::Rsa => {
                let e = reader.mpint("e")?;
                let n = reader.mpint("n")?;
                PublicKey::rsa(e, n)?
            }
            KeyAlgorithm::Dsa => {
                let p = reader.mpint("p")?;
                let q = reader.mpint("q")?;
                let g = reader.mpint("g")?;
                let y = reader.mpint("y")?;
                PublicKey::dsa(p, q, g, y)?
            }
            KeyAlgorithm::Ecdsa(curve) => {
                let identifier = reader.str()?;
                let curve = curve
                    .filter(|c| c.identifier() == identifier)
                    .ok_or_else(|| {
                        Error::structure(format!(
                            "curve {} does not match algorithm {}",
                            identifier, name
                        ))
                    })?;
                PublicKey::ecdsa(curve, reader.string()?)?
            }
            KeyAlgorithm::Ed25519 => PublicKey::ed25519(reader.string()?)?,
        };
        reader.finish("public key blob")?;
        Ok(key)
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PublicKey::Rsa { .. } => KeyAlgorithm::Rsa,
            PublicKey::Dsa { .. } => KeyAlgorithm::Dsa,
            PublicKey::Ecdsa { curve, .. } => KeyAlgorithm::Ecdsa(Some(*curve)),
            PublicKey::Ed25519 { .. } => KeyAlgorithm::Ed25519,
        }
    }
}

impl EncodableTo<PublicKey> for Vec<u8> {}

impl Encoder<PublicKey, Vec<u8>> for PublicKey {
    type Error = Error;

    /// Canonical SSH blob: the algorithm name followed by the algorithm's
    /// fields in their fixed order.
    fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::default();
        writer.string(self.algorithm().name().as_bytes())?;
        match self {
            PublicKey::Rsa { e, n } => {
                writer.mpint(e)?.mpint(n)?;
            }
            PublicKey::Dsa { p, q, g, y } => {
                writer.mpint(p)?.mpint(q)?.mpint(g)?.mpint(y)?;
            }
            PublicKey::Ecdsa { curve, point } => {
                writer.string(curve.identifier().as_bytes())?.string(point)?;
            }
            PublicKey::Ed25519 { key } => {
                writer.string(key)?;
            }
        }
        Ok(writer.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use keyprobe_codec::encoder::Encoder;
    use num_bigint::BigUint;
    use rstest::rstest;

    use super::PublicKey;
    use crate::algorithm::{EcdsaCurve, KeyAlgorithm};
    use crate::error::ErrorKind;

    // Public half of testdata/keys/openssh-ed25519.
    const ED25519_BLOB: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIPlx6qosU+6B/tOPThuk1p5TzVRiSKY+A0FNHQhG2t5N";

    fn blob(b64: &str) -> Vec<u8> {
        STANDARD.decode(b64).unwrap()
    }

    fn build(fields: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for field in fields {
            out.extend_from_slice(&(field.len() as u32).to_be_bytes());
            out.extend_from_slice(field);
        }
        out
    }

    #[test]
    fn test_from_blob_ed25519_roundtrips() {
        let data = blob(ED25519_BLOB);
        let key = PublicKey::from_blob(&data).unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Ed25519);
        let encoded: Vec<u8> = key.encode().unwrap();
        assert_eq!(encoded, data);
    }

    #[test]
    fn test_from_blob_rsa() {
        let data = build(&[b"ssh-rsa", &[0x01, 0x00, 0x01], &[0x00, 0xc1, 0x02, 0x03]]);
        let key = PublicKey::from_blob(&data).unwrap();
        assert_eq!(
            key,
            PublicKey::Rsa {
                e: BigUint::from(65537u32),
                n: BigUint::from(0xc10203u32),
            }
        );
        let encoded: Vec<u8> = key.encode().unwrap();
        assert_eq!(encoded, data);
    }

    #[test]
    fn test_from_blob_ecdsa() {
        let point = [0x04u8; 65];
        let data = build(&[b"ecdsa-sha2-nistp256", b"nistp256", &point]);
        let key = PublicKey::from_blob(&data).unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Ecdsa(Some(EcdsaCurve::NistP256)));
    }

    #[rstest]
    #[case::curve_mismatch(build(&[b"ecdsa-sha2-nistp256", b"nistp384", &[0x04]]))]
    #[case::short_ed25519(build(&[b"ssh-ed25519", &[0u8; 31]]))]
    #[case::zero_modulus(build(&[b"ssh-rsa", &[0x03], &[]]))]
    #[case::negative_modulus(build(&[b"ssh-rsa", &[0x03], &[0x80]]))]
    #[case::trailing(build(&[b"ssh-ed25519", &[0u8; 32], b"extra"]))]
    #[case::truncated(build(&[b"ssh-dss", &[0x01], &[0x01]]))]
    fn test_from_blob_malformed(#[case] data: Vec<u8>) {
        let err = PublicKey::from_blob(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKeyData);
    }

    #[test]
    fn test_from_blob_unsupported() {
        let data = build(&[b"ssh-ed448", &[0u8; 57]]);
        let err = PublicKey::from_blob(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }
}
