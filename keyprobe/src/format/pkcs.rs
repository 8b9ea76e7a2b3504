//! DER private key structures carried by legacy PEM blocks.
//!
//! Each structure decodes from an ASN.1 [`Element`] and yields the
//! [`PublicKey`] it embeds. Private scalars are walked over but never kept.

use keyprobe_asn1::{ASN1Object, BitString, Element, ObjectIdentifier, OctetString};
use keyprobe_codec::decoder::{DecodableFrom, Decoder};
use num_bigint::BigUint;
use num_traits::One;

use crate::algorithm::{EcdsaCurve, KeyAlgorithm};
use crate::error::{Error, Malformed, Result};
use crate::public_key::PublicKey;

pub(crate) const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
pub(crate) const OID_DSA: &str = "1.2.840.10040.4.1";
pub(crate) const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
pub(crate) const OID_ED25519: &str = "1.3.101.112";
pub(crate) const OID_ED448: &str = "1.3.101.113";

/// Largest DSA prime modulus accepted before recomputing `y`.
const MAX_DSA_PRIME_BITS: u64 = 10000;
/// Largest DSA subprime; FIPS 186 tops out at 256 bits.
const MAX_DSA_SUBPRIME_BITS: u64 = 512;

fn sequence<'a>(element: &'a Element, what: &str) -> Result<&'a [Element]> {
    match element {
        Element::Sequence(elements) => Ok(elements),
        other => Err(Error::structure(format!(
            "{}: expected SEQUENCE, got {}",
            what,
            other.kind()
        ))),
    }
}

fn unsigned(element: &Element, field: &'static str) -> Result<BigUint> {
    match element {
        Element::Integer(int) => int
            .to_biguint()
            .ok_or_else(|| Malformed::NegativeInteger(field).into()),
        other => Err(Error::structure(format!(
            "{}: expected INTEGER, got {}",
            field,
            other.kind()
        ))),
    }
}

fn root(der: &[u8]) -> Result<Element> {
    let object: ASN1Object = der.to_vec().decode()?;
    object
        .elements()
        .first()
        .cloned()
        .ok_or_else(|| Error::structure("empty DER"))
}

/*
RFC 8017 A.1.2

RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER,  -- (inverse of q) mod p
    otherPrimeInfos   OtherPrimeInfos OPTIONAL
}
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RsaPrivateKey {
    pub modulus: BigUint,
    pub public_exponent: BigUint,
}

impl DecodableFrom<Element> for RsaPrivateKey {}

impl Decoder<Element, RsaPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RsaPrivateKey> {
        let elements = sequence(self, "RSAPrivateKey")?;
        if elements.len() < 9 || !elements[..9].iter().all(|e| matches!(e, Element::Integer(_))) {
            return Err(Error::structure("RSAPrivateKey needs nine INTEGER fields"));
        }
        Ok(RsaPrivateKey {
            modulus: unsigned(&elements[1], "modulus")?,
            public_exponent: unsigned(&elements[2], "publicExponent")?,
        })
    }
}

impl RsaPrivateKey {
    pub(crate) fn public_key(self) -> Result<PublicKey> {
        PublicKey::rsa(self.public_exponent, self.modulus)
    }
}

/*
OpenSSL traditional DSA private key

DSAPrivateKey ::= SEQUENCE {
    version  INTEGER,
    p        INTEGER,
    q        INTEGER,
    g        INTEGER,
    y        INTEGER,
    x        INTEGER
}
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DsaPrivateKey {
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
    pub y: BigUint,
}

impl DecodableFrom<Element> for DsaPrivateKey {}

impl Decoder<Element, DsaPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DsaPrivateKey> {
        match sequence(self, "DSAPrivateKey")? {
            [_version, p, q, g, y, _x] => Ok(DsaPrivateKey {
                p: unsigned(p, "p")?,
                q: unsigned(q, "q")?,
                g: unsigned(g, "g")?,
                y: unsigned(y, "y")?,
            }),
            elements => Err(Error::structure(format!(
                "DSAPrivateKey has {} fields, expected 6",
                elements.len()
            ))),
        }
    }
}

impl DsaPrivateKey {
    pub(crate) fn public_key(self) -> Result<PublicKey> {
        PublicKey::dsa(self.p, self.q, self.g, self.y)
    }
}

/*
RFC 5915

ECPrivateKey ::= SEQUENCE {
    version        INTEGER { ecPrivkeyVer1(1) } (ecPrivkeyVer1),
    privateKey     OCTET STRING,
    parameters [0] ECParameters {{ NamedCurve }} OPTIONAL,
    publicKey  [1] BIT STRING OPTIONAL
}
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EcPrivateKey {
    pub curve: Option<ObjectIdentifier>,
    pub public_key: Option<BitString>,
}

impl DecodableFrom<Element> for EcPrivateKey {}

impl Decoder<Element, EcPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<EcPrivateKey> {
        let elements = sequence(self, "ECPrivateKey")?;
        match elements {
            [Element::Integer(_), Element::OctetString(_), ..] => {}
            _ => return Err(Error::structure("ECPrivateKey must start with version and privateKey")),
        }

        let mut curve = None;
        let mut public_key = None;
        for element in &elements[2..] {
            match element {
                Element::ContextSpecific { slot: 0, element, .. } => match element.as_ref() {
                    Element::ObjectIdentifier(oid) => curve = Some(oid.clone()),
                    other => {
                        return Err(Error::structure(format!(
                            "ECParameters: expected named curve, got {}",
                            other.kind()
                        )));
                    }
                },
                Element::ContextSpecific { slot: 1, element, .. } => match element.as_ref() {
                    Element::BitString(bits) => public_key = Some(bits.clone()),
                    other => {
                        return Err(Error::structure(format!(
                            "publicKey: expected BIT STRING, got {}",
                            other.kind()
                        )));
                    }
                },
                _ => {}
            }
        }
        Ok(EcPrivateKey { curve, public_key })
    }
}

impl EcPrivateKey {
    /// `fallback_curve` comes from the PKCS#8 AlgorithmIdentifier when the
    /// inner structure omits its parameters.
    pub(crate) fn public_key(self, fallback_curve: Option<&ObjectIdentifier>) -> Result<PublicKey> {
        let oid = self
            .curve
            .as_ref()
            .or(fallback_curve)
            .ok_or_else(|| Error::structure("EC private key without named curve"))?;
        let curve = named_curve(oid)?;
        let point = self
            .public_key
            .ok_or_else(|| Error::structure("EC private key without public point"))?;
        PublicKey::ecdsa(curve, point.as_bytes())
    }
}

fn named_curve(oid: &ObjectIdentifier) -> Result<EcdsaCurve> {
    EcdsaCurve::from_oid(oid)
        .ok_or_else(|| Error::UnsupportedAlgorithm(format!("EC curve {}", oid)))
}

/*
RFC 5208

PrivateKeyInfo ::= SEQUENCE {
    version                   Version,
    privateKeyAlgorithm       AlgorithmIdentifier,
    privateKey                OCTET STRING,
    attributes           [0]  IMPLICIT Attributes OPTIONAL
}

AlgorithmIdentifier ::= SEQUENCE {
    algorithm   OBJECT IDENTIFIER,
    parameters  ANY DEFINED BY algorithm OPTIONAL
}
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PrivateKeyInfo {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<Element>,
    pub private_key: OctetString,
}

impl DecodableFrom<Element> for PrivateKeyInfo {}

impl Decoder<Element, PrivateKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        let (identifier, private_key) = match sequence(self, "PrivateKeyInfo")? {
            [Element::Integer(_), identifier, Element::OctetString(private_key), ..] => {
                (identifier, private_key)
            }
            _ => return Err(Error::structure("PrivateKeyInfo fields out of order")),
        };
        let (algorithm, parameters) = match sequence(identifier, "AlgorithmIdentifier")? {
            [Element::ObjectIdentifier(oid)] => (oid.clone(), None),
            [Element::ObjectIdentifier(oid), Element::Null] => (oid.clone(), None),
            [Element::ObjectIdentifier(oid), parameters] => (oid.clone(), Some(parameters.clone())),
            _ => return Err(Error::structure("AlgorithmIdentifier without OBJECT IDENTIFIER")),
        };
        Ok(PrivateKeyInfo {
            algorithm,
            parameters,
            private_key: private_key.clone(),
        })
    }
}

impl PrivateKeyInfo {
    pub(crate) fn public_key(self) -> Result<PublicKey> {
        if self.algorithm == OID_RSA_ENCRYPTION {
            let key: RsaPrivateKey = decode_der(self.private_key.as_bytes())?;
            key.public_key()
        } else if self.algorithm == OID_DSA {
            let x = root(self.private_key.as_bytes())?;
            self.dsa_public_key(&x)
        } else if self.algorithm == OID_EC_PUBLIC_KEY {
            let curve = match &self.parameters {
                Some(Element::ObjectIdentifier(oid)) => Some(oid),
                _ => None,
            };
            let key: EcPrivateKey = decode_der(self.private_key.as_bytes())?;
            key.public_key(curve)
        } else if self.algorithm == OID_ED25519 {
            // Ed25519 is only described from OpenSSH containers.
            Err(Error::UnsupportedAlgorithm(format!(
                "{} in PKCS#8",
                KeyAlgorithm::Ed25519
            )))
        } else if self.algorithm == OID_ED448 {
            Err(Error::UnsupportedAlgorithm("ssh-ed448".to_string()))
        } else {
            Err(Error::UnsupportedAlgorithm(format!(
                "PKCS#8 algorithm {}",
                self.algorithm
            )))
        }
    }

    /// PKCS#8 DSA keys store only `x`; `y = g^x mod p` is recomputed.
    fn dsa_public_key(&self, inner: &Element) -> Result<PublicKey> {
        let (p, q, g) = match &self.parameters {
            Some(Element::Sequence(params)) => match params.as_slice() {
                [p, q, g] => (unsigned(p, "p")?, unsigned(q, "q")?, unsigned(g, "g")?),
                _ => return Err(Error::structure("Dss-Parms needs p, q and g")),
            },
            _ => return Err(Error::structure("DSA key without Dss-Parms")),
        };
        if p.bits() > MAX_DSA_PRIME_BITS {
            return Err(Error::structure(format!(
                "DSA prime of {} bits exceeds {}",
                p.bits(),
                MAX_DSA_PRIME_BITS
            )));
        }
        if p <= BigUint::one() {
            return Err(Error::structure("DSA prime is not greater than one"));
        }
        if q.bits() > MAX_DSA_SUBPRIME_BITS || q >= p {
            return Err(Error::structure("DSA subprime out of range"));
        }
        // x must lie in [1, q-1]
        let x = unsigned(inner, "x")?;
        if x.bits() == 0 || x >= q {
            return Err(Error::structure("DSA private exponent out of range"));
        }
        let y = g.modpow(&x, &p);
        PublicKey::dsa(p, q, g, y)
    }
}

/// Decodes `der` as `T` through its root element.
pub(crate) fn decode_der<T>(der: &[u8]) -> Result<T>
where
    T: DecodableFrom<Element>,
    Element: Decoder<Element, T, Error = Error>,
{
    root(der)?.decode()
}
