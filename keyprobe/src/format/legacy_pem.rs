//! PEM armored DER private keys: PKCS#1 RSA, OpenSSL DSA, SEC1 EC and
//! unencrypted PKCS#8.
//!
//! Encryption is announced by the RFC 1421 `Proc-Type` header and the
//! cipher by `DEK-Info`. An encrypted body is never decoded, so only the
//! label is left to name the algorithm.

use keyprobe_codec::decoder::Decoder;
use keyprobe_pem::{Label, Pem};
use tracing::trace;

use super::pkcs::{DsaPrivateKey, EcPrivateKey, PrivateKeyInfo, RsaPrivateKey, decode_der};
use super::{FormatParser, ParsedKey, text};
use crate::algorithm::KeyAlgorithm;
use crate::detect::{FormatSignature, LEGACY_PEM};
use crate::error::{Error, Malformed, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyPemParser;

impl FormatParser for LegacyPemParser {
    fn signature(&self) -> &'static FormatSignature {
        &LEGACY_PEM
    }

    fn parse(&self, input: &[u8]) -> Result<ParsedKey> {
        let pem = keyprobe_pem::parse_many(text(input)?)?
            .into_iter()
            .find(|pem| pem.label().is_private_key() && pem.label() != Label::OpenSSHPrivateKey)
            .ok_or_else(|| Error::structure("no private key block"))?;
        trace!(label = %pem.label(), encrypted = pem.is_encrypted(), "legacy PEM block");

        if pem.label() == Label::EncryptedPrivateKey {
            return Err(Error::UnsupportedAlgorithm(
                "encrypted PKCS#8 does not reveal its algorithm".to_string(),
            ));
        }
        if pem.is_encrypted() {
            return parse_encrypted(&pem);
        }

        let der: Vec<u8> = pem.decode()?;
        let public_key = match pem.label() {
            Label::RSAPrivateKey => decode_der::<RsaPrivateKey>(&der)?.public_key()?,
            Label::DSAPrivateKey => decode_der::<DsaPrivateKey>(&der)?.public_key()?,
            Label::ECPrivateKey => decode_der::<EcPrivateKey>(&der)?.public_key(None)?,
            Label::PrivateKey => decode_der::<PrivateKeyInfo>(&der)?.public_key()?,
            label => return Err(Error::structure(format!("unexpected label {}", label))),
        };
        Ok(ParsedKey::unencrypted(public_key))
    }
}

fn parse_encrypted(pem: &Pem) -> Result<ParsedKey> {
    let algorithm = match pem.label() {
        Label::RSAPrivateKey => KeyAlgorithm::Rsa,
        Label::DSAPrivateKey => KeyAlgorithm::Dsa,
        // The curve is inside the encrypted body.
        Label::ECPrivateKey => KeyAlgorithm::Ecdsa(None),
        label => {
            return Err(Error::UnsupportedAlgorithm(format!(
                "encrypted {} block",
                label
            )));
        }
    };
    let cipher = pem.dek_info().ok_or(Malformed::MissingHeader("DEK-Info"))?;
    Ok(ParsedKey::encrypted(algorithm, cipher))
}
