//! SSH.com (SECSH) private keys.
//!
//! ```text
//! ---- BEGIN SSH2 ENCRYPTED PRIVATE KEY ----
//! Comment: "rsa-2048@keyprobe"
//! <base64 body>
//! ---- END SSH2 ENCRYPTED PRIVATE KEY ----
//! ```
//!
//! The body is `uint32 magic`, `uint32 total length`, `string key type`,
//! `string cipher`, `string key data`. Integers inside the key data use the
//! SSH.com bit-count encoding. When the cipher is not `none` the key data,
//! public values included, is encrypted.

use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::trace;

use super::{FormatParser, ParsedKey, cipher, text};
use crate::algorithm::KeyAlgorithm;
use crate::detect::{FormatSignature, SSHCOM};
use crate::error::{Error, Malformed, Result};
use crate::public_key::PublicKey;
use crate::wire::Reader;

const BEGIN: &str = "---- BEGIN SSH2 ENCRYPTED PRIVATE KEY ----";
const END: &str = "---- END SSH2 ENCRYPTED PRIVATE KEY ----";
const MAGIC: u32 = 0x3f6f_f9eb;
const RSA_KEY_TYPE: &str = "if-modn{sign{rsa";
const DSA_KEY_TYPE: &str = "dl-modp{sign{dsa";

#[derive(Debug, Clone, Copy, Default)]
pub struct SshcomParser;

impl FormatParser for SshcomParser {
    fn signature(&self) -> &'static FormatSignature {
        &SSHCOM
    }

    fn parse(&self, input: &[u8]) -> Result<ParsedKey> {
        let armor = Armor::parse(text(input)?)?;
        let body = STANDARD.decode(&armor.body)?;
        let parsed = parse_body(&body)?;
        Ok(parsed.with_comment(armor.comment.as_deref()))
    }
}

/// Header and base64 text between the armor lines.
#[derive(Debug, Default)]
struct Armor {
    comment: Option<String>,
    body: String,
}

impl Armor {
    fn parse(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .map(str::trim_end)
            .skip_while(|line| *line != BEGIN);
        if lines.next().is_none() {
            return Err(Malformed::MissingHeader(BEGIN).into());
        }

        let mut armor = Armor::default();
        let mut pending: Option<String> = None;
        for line in lines {
            if line == END {
                if pending.is_some() {
                    return Err(Error::structure("header continues past the end line"));
                }
                if armor.body.is_empty() {
                    return Err(Error::structure("SSH2 key without body"));
                }
                return Ok(armor);
            }
            if let Some(mut header) = pending.take() {
                header.push_str(line);
                pending = armor.push_header(header);
            } else if armor.body.is_empty() && line.contains(':') {
                pending = armor.push_header(line.to_string());
            } else {
                armor.body.push_str(line.trim_start());
            }
        }
        Err(Malformed::MissingHeader(END).into())
    }

    /// Records a complete header, or hands it back when a trailing
    /// backslash continues it on the next line.
    fn push_header(&mut self, mut header: String) -> Option<String> {
        if header.ends_with('\\') {
            header.pop();
            return Some(header);
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("Comment") {
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                self.comment = Some(value.to_string());
            }
        }
        None
    }
}

fn parse_body(body: &[u8]) -> Result<ParsedKey> {
    let mut reader = Reader::new(body);
    if reader.u32()? != MAGIC {
        return Err(Malformed::BadMagic.into());
    }
    let total = reader.u32()?;
    if total as usize != body.len() {
        return Err(Error::structure(format!(
            "declared length {} but body is {} bytes",
            total,
            body.len()
        )));
    }
    let key_type = reader.str()?;
    let cipher_name = reader.str()?;
    let data = reader.string()?;
    reader.finish("SSH2 key body")?;
    trace!(key_type, cipher = cipher_name, "SSH2 key header");

    let algorithm = if key_type.starts_with(RSA_KEY_TYPE) {
        KeyAlgorithm::Rsa
    } else if key_type.starts_with(DSA_KEY_TYPE) {
        KeyAlgorithm::Dsa
    } else {
        return Err(Error::UnsupportedAlgorithm(key_type.to_string()));
    };

    match cipher(cipher_name) {
        Some(name) => Ok(ParsedKey::encrypted(algorithm, name)),
        None => Ok(ParsedKey::unencrypted(key_data(algorithm, data)?)),
    }
}

/// Reads the plaintext key data and keeps the public values.
fn key_data(algorithm: KeyAlgorithm, data: &[u8]) -> Result<PublicKey> {
    let mut outer = Reader::new(data);
    let length = outer.u32()? as usize;
    let inner = outer.bytes(length)?;
    outer.finish("SSH2 key data")?;

    let mut reader = Reader::new(inner);
    let key = match algorithm {
        KeyAlgorithm::Rsa => {
            let e = reader.sshcom_mpint()?;
            let _d = reader.sshcom_mpint()?;
            let n = reader.sshcom_mpint()?;
            let _u = reader.sshcom_mpint()?;
            let _p = reader.sshcom_mpint()?;
            let _q = reader.sshcom_mpint()?;
            PublicKey::rsa(e, n)?
        }
        KeyAlgorithm::Dsa => {
            if reader.u32()? != 0 {
                return Err(Error::structure("unknown SSH2 DSA key layout"));
            }
            let p = reader.sshcom_mpint()?;
            let g = reader.sshcom_mpint()?;
            let q = reader.sshcom_mpint()?;
            let y = reader.sshcom_mpint()?;
            let _x = reader.sshcom_mpint()?;
            PublicKey::dsa(p, q, g, y)?
        }
        other => return Err(Error::UnsupportedAlgorithm(other.name().to_string())),
    };
    reader.finish("SSH2 key data")?;
    Ok(key)
}
