use std::{fmt::Display, str::FromStr};

use error::Error;
use keyprobe_codec::decoder::{DecodableFrom, Decoder};
use keyprobe_der::{Der, PrimitiveTag, Tag, Tlv};
use num_bigint::{BigInt, BigUint, Sign};

pub mod error;

#[derive(Debug, Clone)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }

    /// The first top-level element, which for key bodies is the whole structure.
    pub fn root(&self) -> Option<&Element> {
        self.elements.first()
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;
    fn decode(&self) -> Result<ASN1Object, Error> {
        let mut elements = Vec::new();
        for tlv in self.elements() {
            let element = Element::try_from(tlv)?;
            elements.push(element);
        }
        Ok(ASN1Object { elements })
    }
}

impl DecodableFrom<Vec<u8>> for ASN1Object {}

impl Decoder<Vec<u8>, ASN1Object> for Vec<u8> {
    type Error = Error;
    fn decode(&self) -> Result<ASN1Object, Error> {
        let der: Der = self.decode().map_err(Error::FailedToDecodeDer)?;
        der.decode()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    Sequence(Vec<Element>),
    ContextSpecific {
        slot: u8,
        constructed: bool,
        element: Box<Element>,
    },
    Unimplemented(Tlv),
}

impl Element {
    /// Short name of the element kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Boolean(_) => "BOOLEAN",
            Element::Integer(_) => "INTEGER",
            Element::BitString(_) => "BIT STRING",
            Element::OctetString(_) => "OCTET STRING",
            Element::Null => "NULL",
            Element::ObjectIdentifier(_) => "OBJECT IDENTIFIER",
            Element::Sequence(_) => "SEQUENCE",
            Element::ContextSpecific { .. } => "context-specific",
            Element::Unimplemented(_) => "unimplemented",
        }
    }
}

fn primitive_data<'a>(tlv: &'a Tlv, kind: &'static str) -> Result<&'a [u8], Error> {
    tlv.data().ok_or(Error::UnexpectedEncoding(kind))
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        match tlv.tag() {
            Tag::Primitive(primitive_tag, _value) => match primitive_tag {
                PrimitiveTag::Boolean => match primitive_data(tlv, "BOOLEAN")? {
                    [0x00] => Ok(Element::Boolean(false)),
                    [0xff] => Ok(Element::Boolean(true)),
                    _ => Err(Error::InvalidBoolean),
                },
                PrimitiveTag::Integer => {
                    let data = primitive_data(tlv, "INTEGER")?;
                    if data.is_empty() {
                        return Err(Error::IntegerNoData);
                    }
                    Ok(Element::Integer(Integer::from(data)))
                }
                PrimitiveTag::BitString => {
                    let data = primitive_data(tlv, "BIT STRING")?;
                    Ok(Element::BitString(BitString::try_from(data)?))
                }
                PrimitiveTag::OctetString => {
                    let data = primitive_data(tlv, "OCTET STRING")?;
                    Ok(Element::OctetString(OctetString::from(data)))
                }
                PrimitiveTag::Null => Ok(Element::Null),
                PrimitiveTag::ObjectIdentifier => {
                    let data = primitive_data(tlv, "OBJECT IDENTIFIER")?;
                    Ok(Element::ObjectIdentifier(ObjectIdentifier::try_from(data)?))
                }
                PrimitiveTag::Sequence => {
                    let tlvs = tlv.tlvs().ok_or(Error::UnexpectedEncoding("SEQUENCE"))?;
                    let mut elements = Vec::new();
                    for sub_tlv in tlvs.iter() {
                        let element = Element::try_from(sub_tlv)?;
                        elements.push(element);
                    }
                    Ok(Element::Sequence(elements))
                }
                // Strings, times and sets never carry key material here.
                _ => Ok(Element::Unimplemented(tlv.clone())),
            },
            Tag::ContextSpecific { slot, constructed } => {
                if *constructed {
                    // Constructed: EXPLICIT tagging wraps exactly one element
                    let tlvs = tlv.tlvs().unwrap_or_default();
                    match tlvs {
                        [inner] => Ok(Element::ContextSpecific {
                            slot: *slot,
                            constructed: true,
                            element: Box::new(Element::try_from(inner)?),
                        }),
                        _ => Err(Error::InvalidContextSpecific {
                            slot: *slot,
                            msg: format!(
                                "context-specific constructed must have exactly one sub-tlv, got {}",
                                tlvs.len()
                            ),
                        }),
                    }
                } else {
                    // Primitive: IMPLICIT tagging
                    // Store raw data as OctetString - the upper layer decoder interprets based on schema
                    let data = tlv.data().ok_or_else(|| Error::InvalidContextSpecific {
                        slot: *slot,
                        msg: "context-specific primitive has no data".to_string(),
                    })?;
                    Ok(Element::ContextSpecific {
                        slot: *slot,
                        constructed: false,
                        element: Box::new(Element::OctetString(OctetString::from(data))),
                    })
                }
            }
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Boolean(b) => write!(f, "BOOLEAN {}", b),
            Element::Integer(i) => write!(f, "INTEGER {}", i),
            Element::BitString(b) => write!(f, "BIT STRING ({} bits)", b.bit_len()),
            Element::OctetString(o) => write!(f, "OCTET STRING {}", o),
            Element::Null => write!(f, "NULL"),
            Element::ObjectIdentifier(oid) => write!(f, "OBJECT IDENTIFIER {}", oid),
            Element::Sequence(elements) => write!(f, "SEQUENCE ({} elements)", elements.len()),
            Element::ContextSpecific { slot, element, .. } => write!(f, "[{}] {}", slot, element),
            Element::Unimplemented(tlv) => write!(f, "unimplemented {:?}", tlv.tag()),
        }
    }
}

// ASN1 integer is possible to be a positive and negative value.
// This can be arbitrary sized values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    /// Returns a reference to the inner BigInt
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    pub fn is_negative(&self) -> bool {
        self.inner.sign() == Sign::Minus
    }

    /// Number of significant bits of the magnitude; zero has none.
    pub fn bits(&self) -> u64 {
        self.inner.bits()
    }

    /// The value as an unsigned integer, or `None` when negative.
    pub fn to_biguint(&self) -> Option<BigUint> {
        self.inner.to_biguint()
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl From<BigInt> for Integer {
    fn from(inner: BigInt) -> Self {
        Integer { inner }
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn arcs(&self) -> &[u64] {
        &self.inner
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }

        let mut subidentifiers = Vec::new();
        let mut val = 0u64;
        let mut pending = false;
        for v in value.iter() {
            if val > (u64::MAX >> 7) {
                return Err(Error::ObjectIdentifierIncompleteEncoding);
            }
            val = (val << 7) | (*v as u64 & 0x7F);
            pending = *v & 0x80 != 0;
            if !pending {
                // If the continuation bit is not set, we have reached the end of this value
                subidentifiers.push(val);
                val = 0; // Reset for the next value
            }
        }
        if pending {
            // the last octet still had its continuation bit set
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        // The first subidentifier packs the first two arcs.
        let first = subidentifiers[0];
        let mut values = match first {
            0..40 => vec![0, first],
            40..80 => vec![1, first - 40],
            _ => vec![2, first - 80],
        };
        values.extend_from_slice(&subidentifiers[1..]);

        Ok(ObjectIdentifier { inner: values })
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split('.')
            .map(|s| s.parse::<u64>().map_err(Error::ObjectIdentifierInvalidComponent))
            .collect::<Result<Vec<u64>, Error>>()?;
        if values.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(ObjectIdentifier { inner: values })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        let mut parts = other.split('.');
        self.inner
            .iter()
            .all(|arc| parts.next().and_then(|p| p.parse::<u64>().ok()) == Some(*arc))
            && parts.next().is_none()
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        other == self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    /// Creates a new BitString with the specified number of unused bits and data
    pub fn new(unused: u8, data: Vec<u8>) -> Self {
        BitString { unused, data }
    }

    /// Returns the number of unused bits in the last byte
    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    /// Returns a reference to the underlying byte data
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the total number of bits (excluding unused bits)
    pub fn bit_len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.len() * 8 - self.unused as usize
        }
    }
}

impl AsRef<[u8]> for BitString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.split_first() {
            Some((&unused, _)) if unused > 7 => Err(Error::BitStringUnusedBitsOutOfRange(unused)),
            Some((&unused, data)) => Ok(BitString {
                unused,
                data: data.to_vec(),
            }),
            None => Err(Error::BitStringNoData),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    /// Returns a reference to the underlying byte data
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }
}

impl TryFrom<&OctetString> for ASN1Object {
    type Error = Error;

    fn try_from(value: &OctetString) -> Result<Self, Self::Error> {
        value.inner.decode()
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<String>>()
            .join("");
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use keyprobe_codec::decoder::Decoder;
    use num_bigint::BigInt;
    use rstest::rstest;
    use std::str::FromStr;

    use crate::error::Error;
    use crate::{ASN1Object, BitString, Element, Integer, ObjectIdentifier, OctetString};

    #[rstest(input, expected,
        case(vec![0x01], "1"),
        case(vec![0xff], "-1"),
        case(vec![0x00, 0x80], "128"),
        case(vec![0x03, 0xd4, 0x15, 0x31, 0x8e, 0x2c, 0x57, 0x1d, 0x29, 0x05, 0xfc, 0x3e, 0x05, 0x27, 0x68, 0x9d, 0x0d, 0x09], "333504890676592408951587385614406537514249")
    )]
    fn test_parse_element_integer(input: Vec<u8>, expected: &str) {
        let expected_num = Integer {
            inner: BigInt::from_str(expected).unwrap(),
        };

        let value = Integer::from(input.as_slice());

        assert_eq!(expected_num, value);
    }

    #[rstest(input, expected_bits, expected_negative,
        case(vec![0x00], 0, false),
        case(vec![0x01], 1, false),
        case(vec![0x00, 0x80], 8, false),
        case(vec![0x00, 0xff, 0xff], 16, false),
        case(vec![0x5e, 0x00], 15, false),
        case(vec![0x80], 8, true)
    )]
    fn test_integer_bits(input: Vec<u8>, expected_bits: u64, expected_negative: bool) {
        let value = Integer::from(input.as_slice());
        assert_eq!(value.bits(), expected_bits);
        assert_eq!(value.is_negative(), expected_negative);
        assert_eq!(value.to_biguint().is_none(), expected_negative);
    }

    #[rstest(input, expected, case(ObjectIdentifier { inner: vec![0x01, 0x02, 0x03, 0x04]}, "1.2.3.4"))]
    fn test_object_identifier_to_string(input: ObjectIdentifier, expected: &str) {
        let actual = input.to_string();
        assert_eq!(expected, actual);
    }

    #[rstest(input, expected, case("1.2.3.4" ,ObjectIdentifier { inner: vec![0x01, 0x02, 0x03, 0x04]} ))]
    fn test_object_identifier_from_string(input: &str, expected: ObjectIdentifier) {
        let actual = ObjectIdentifier::from_str(input).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(input,
        case("1"),
        case("1.2.x"),
        case("")
    )]
    fn test_object_identifier_from_string_rejects(input: &str) {
        assert!(ObjectIdentifier::from_str(input).is_err());
    }

    #[rstest(input, expected,
    // Test case for ISO/ITU-T joint standards (1.2)
    case(vec![0x2A], ObjectIdentifier { inner: vec![1, 2] }),
    // Test case for ISO/IEC standard (1.3.6.1.4.1)
    case(vec![0x2B, 0x06, 0x01, 0x04, 0x01], ObjectIdentifier { inner: vec![1, 3, 6, 1, 4, 1] }),
    // Test case for ITU-T standard (0.9.2342.19200300.100.1.1)
    case(vec![0x09, 0x92, 0x26, 0x89, 0x93, 0xf2, 0x2c, 0x64, 0x01, 0x01], ObjectIdentifier { inner: vec![0, 9, 2342, 19200300, 100, 1, 1] }),
    // rsaEncryption (1.2.840.113549.1.1.1)
    case(vec![0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01], ObjectIdentifier { inner: vec![1, 2, 840, 113549, 1, 1, 1] }),
    // secp384r1 (1.3.132.0.34)
    case(vec![0x2B, 0x81, 0x04, 0x00, 0x22], ObjectIdentifier { inner: vec![1, 3, 132, 0, 34] }),
    // Ed25519 (1.3.101.112)
    case(vec![0x2B, 0x65, 0x70], ObjectIdentifier { inner: vec![1, 3, 101, 112] }),
    // joint-iso-itu-t arc above 39 (2.999)
    case(vec![0x88, 0x37], ObjectIdentifier { inner: vec![2, 999] }),
    )]
    fn test_object_identifier_from_bytes(input: Vec<u8>, expected: ObjectIdentifier) {
        let actual = ObjectIdentifier::try_from(input.as_slice()).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(input, expected,
        case(vec![], Error::ObjectIdentifierNoData),
        case(vec![0x2A, 0x86], Error::ObjectIdentifierIncompleteEncoding)
    )]
    fn test_object_identifier_from_bytes_rejects(input: Vec<u8>, expected: Error) {
        assert_eq!(ObjectIdentifier::try_from(input.as_slice()).unwrap_err(), expected);
    }

    #[rstest(oid, other, expected,
        case("1.2.840.10045.2.1", "1.2.840.10045.2.1", true),
        case("1.2.840.10045.2.1", "1.2.840.10045.2", false),
        case("1.2.840.10045.2", "1.2.840.10045.2.1", false),
        case("1.3.132.0.34", "1.3.132.0.35", false)
    )]
    fn test_object_identifier_eq_str(oid: &str, other: &str, expected: bool) {
        let oid = ObjectIdentifier::from_str(oid).unwrap();
        assert_eq!(oid == other, expected);
        assert_eq!(other == oid, expected);
    }

    #[rstest(input, expected_unused, expected_len,
        case(vec![0x00, 0x04, 0x01], 0, 16),
        case(vec![0x06, 0x6e, 0x5d, 0xc0], 6, 18),
        case(vec![0x00], 0, 0)
    )]
    fn test_bitstring_from_bytes(input: Vec<u8>, expected_unused: u8, expected_len: usize) {
        let bs = BitString::try_from(input.as_slice()).unwrap();
        assert_eq!(bs.unused_bits(), expected_unused);
        assert_eq!(bs.bit_len(), expected_len);
    }

    #[rstest(input, expected,
        case(vec![], Error::BitStringNoData),
        case(vec![0x08, 0x00], Error::BitStringUnusedBitsOutOfRange(8))
    )]
    fn test_bitstring_from_bytes_rejects(input: Vec<u8>, expected: Error) {
        assert_eq!(BitString::try_from(input.as_slice()).unwrap_err(), expected);
    }

    #[rstest(input, expected,
        // Test case: Single byte
        case(OctetString { inner: vec![0x01] }, "01"),
        // Test case: Multiple bytes
        case(OctetString { inner: vec![0x01, 0x02, 0x03] }, "010203"),
        // Test case: Empty data
        case(OctetString { inner: vec![] }, ""),
        // Test case: Mixed values
        case(OctetString { inner: vec![0x00, 0x7f, 0x80, 0xff] }, "007f80ff")
    )]
    fn test_octetstring_to_string(input: OctetString, expected: &str) {
        let actual = input.to_string();
        assert_eq!(expected, actual);
    }

    // SEQUENCE { INTEGER 1, OCTET STRING 01 02, [0] { OID 1.2.840.10045.3.1.7 }, [1] { BIT STRING 00 04 } }
    const SEC1_SHAPE: &[u8] = &[
        0x30, 0x19, 0x02, 0x01, 0x01, 0x04, 0x02, 0x01, 0x02, 0xa0, 0x0a, 0x06, 0x08, 0x2a, 0x86,
        0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0xa1, 0x04, 0x03, 0x02, 0x00, 0x04,
    ];

    #[test]
    fn test_decode_asn1_from_der() {
        let obj: ASN1Object = SEC1_SHAPE.to_vec().decode().unwrap();
        let Some(Element::Sequence(fields)) = obj.root() else {
            panic!("expected a sequence, got {:?}", obj.root());
        };
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], Element::Integer(Integer::from(BigInt::from(1))));
        assert_eq!(
            fields[1],
            Element::OctetString(OctetString::from([0x01u8, 0x02].as_slice()))
        );
        match &fields[2] {
            Element::ContextSpecific {
                slot: 0,
                constructed: true,
                element,
            } => match element.as_ref() {
                Element::ObjectIdentifier(oid) => assert_eq!(*oid, "1.2.840.10045.3.1.7"),
                other => panic!("unexpected element {}", other),
            },
            other => panic!("unexpected element {}", other),
        }
        match &fields[3] {
            Element::ContextSpecific {
                slot: 1, element, ..
            } => assert_eq!(
                element.as_ref(),
                &Element::BitString(BitString::new(0, vec![0x04]))
            ),
            other => panic!("unexpected element {}", other),
        }
    }

    #[test]
    fn test_decode_octet_string_as_object() {
        let inner = OctetString::from([0x30u8, 0x03, 0x02, 0x01, 0x05].as_slice());
        let obj = ASN1Object::try_from(&inner).unwrap();
        assert_eq!(
            obj.root(),
            Some(&Element::Sequence(vec![Element::Integer(Integer::from(
                BigInt::from(5)
            ))]))
        );
    }

    #[rstest]
    #[case::empty_integer(vec![0x02, 0x00], Error::IntegerNoData)]
    #[case::bad_boolean(vec![0x01, 0x01, 0x01], Error::InvalidBoolean)]
    #[case::bad_unused_bits(vec![0x03, 0x02, 0x09, 0x00], Error::BitStringUnusedBitsOutOfRange(9))]
    fn test_decode_asn1_errors(#[case] input: Vec<u8>, #[case] expected: Error) {
        let result: Result<ASN1Object, Error> = input.decode();
        assert_eq!(result.unwrap_err(), expected);
    }

    #[test]
    fn test_decode_asn1_truncated_der() {
        let result: Result<ASN1Object, Error> = vec![0x30, 0x05, 0x02].decode();
        assert!(matches!(result, Err(Error::FailedToDecodeDer(_))));
    }
}
