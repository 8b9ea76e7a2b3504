use error::Error;
use keyprobe_codec::decoder::{DecodableFrom, Decoder};
use nom::{IResult, Parser};

pub mod error;

/// Constructed bit of an identifier octet.
pub const TAG_CONSTRUCTED: u8 = 0x20;
/// Deepest nesting of constructed values accepted by the parser.
pub const MAX_DEPTH: usize = 32;

const CLASS_UNIVERSAL: u8 = 0x00;
const CLASS_CONTEXT_SPECIFIC: u8 = 0x80;
const CLASS_MASK: u8 = 0xc0;
const TAG_NUMBER_MASK: u8 = 0x1f;
const MAX_LENGTH_OCTETS: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }

    /// Parses a single top-level element, rejecting bytes after it.
    pub fn parse(input: &[u8]) -> error::Result<Der> {
        let (rest, tlv) = Tlv::parse(input)?;
        if !rest.is_empty() {
            return Err(Error::TrailingData(rest.len()));
        }
        Ok(Der {
            elements: vec![tlv],
        })
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        Der::parse(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    UTF8String,
    Sequence,
    Set,
    PrintableString,
    IA5String,
    UTCTime,
    GeneralizedTime,
    Unimplemented(u8),
}

impl From<u8> for PrimitiveTag {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Boolean,
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x0c => Self::UTF8String,
            0x30 => Self::Sequence,
            0x31 => Self::Set,
            0x13 => Self::PrintableString,
            0x16 => Self::IA5String,
            0x17 => Self::UTCTime,
            0x18 => Self::GeneralizedTime,
            _ => Self::Unimplemented(value),
        }
    }
}

impl From<&PrimitiveTag> for u8 {
    fn from(tag: &PrimitiveTag) -> Self {
        match tag {
            PrimitiveTag::Boolean => 0x01,
            PrimitiveTag::Integer => 0x02,
            PrimitiveTag::BitString => 0x03,
            PrimitiveTag::OctetString => 0x04,
            PrimitiveTag::Null => 0x05,
            PrimitiveTag::ObjectIdentifier => 0x06,
            PrimitiveTag::UTF8String => 0x0c,
            PrimitiveTag::Sequence => 0x30,
            PrimitiveTag::Set => 0x31,
            PrimitiveTag::PrintableString => 0x13,
            PrimitiveTag::IA5String => 0x16,
            PrimitiveTag::UTCTime => 0x17,
            PrimitiveTag::GeneralizedTime => 0x18,
            PrimitiveTag::Unimplemented(v) => *v,
        }
    }
}

/// Identifier octet of a TLV.
///
/// Universal, application and private class tags are kept as
/// `Primitive` with the raw identifier byte; context-specific tags
/// (`[0]`, `[1]`, ...) carry their slot number and constructed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tag {
    Primitive(PrimitiveTag, u8),
    ContextSpecific { slot: u8, constructed: bool },
}

impl Tag {
    pub fn is_constructed(&self) -> bool {
        match self {
            Tag::Primitive(_, raw) => raw & TAG_CONSTRUCTED != 0,
            Tag::ContextSpecific { constructed, .. } => *constructed,
        }
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value & CLASS_MASK {
            CLASS_CONTEXT_SPECIFIC => Tag::ContextSpecific {
                slot: value & TAG_NUMBER_MASK,
                constructed: value & TAG_CONSTRUCTED != 0,
            },
            CLASS_UNIVERSAL => Tag::Primitive(PrimitiveTag::from(value), value),
            _ => Tag::Primitive(PrimitiveTag::Unimplemented(value), value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    length: u64,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            length: data.len() as u64,
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        let length = tlvs.iter().map(Tlv::encoded_len).sum();
        Tlv {
            tag,
            length,
            value: Value::Tlv(tlvs),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Content octets of a primitive value.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    /// Children of a constructed value.
    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    fn encoded_len(&self) -> u64 {
        let length_octets = if self.length < 0x80 {
            1
        } else {
            1 + (8 - (self.length.leading_zeros() / 8) as u64)
        };
        1 + length_octets + self.length
    }

    fn parse(input: &[u8]) -> IResult<&[u8], Tlv, Error> {
        Self::parse_nested(input, 0)
    }

    fn parse_nested(input: &[u8], depth: usize) -> IResult<&[u8], Tlv, Error> {
        if depth > MAX_DEPTH {
            return Err(nom::Err::Failure(Error::NestingTooDeep(MAX_DEPTH)));
        }
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let size = usize::try_from(length)
            .map_err(|_| nom::Err::Failure(Error::LengthOverflow(MAX_LENGTH_OCTETS)))?;
        let (input, data) = take_bytes(input, size)?;

        if tag.is_constructed() {
            // parse TLV recursively.
            let mut tlvs = Vec::new();
            let mut data = data;
            while !data.is_empty() {
                let (new_input, v) = Self::parse_nested(data, depth + 1)?;
                data = new_input;
                tlvs.push(v);
            }

            return Ok((
                input,
                Tlv {
                    tag,
                    length,
                    value: Value::Tlv(tlvs),
                },
            ));
        }

        Ok((
            input,
            Tlv {
                tag,
                length,
                value: Value::Data(data.to_vec()),
            },
        ))
    }
}

fn be_u8(input: &[u8]) -> IResult<&[u8], u8, Error> {
    nom::number::complete::be_u8(input)
}

fn take_bytes(input: &[u8], count: usize) -> IResult<&[u8], &[u8], Error> {
    nom::bytes::complete::take(count).parse(input)
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag, Error> {
    let (input, n) = be_u8(input)?;
    if n & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        return Err(nom::Err::Failure(Error::UnsupportedTag));
    }
    Ok((input, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], u64, Error> {
    let (input, n) = be_u8(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let count = n & 0x7f;
        if count == 0 {
            return Err(nom::Err::Failure(Error::IndefiniteLength));
        }
        if count > MAX_LENGTH_OCTETS {
            return Err(nom::Err::Failure(Error::LengthOverflow(count)));
        }
        let (input, bs) = take_bytes(input, count as usize)?;
        let n = bs.iter().fold(0u64, |n, &b| (n << 8) | b as u64);
        return Ok((input, n));
    }
    // short form: 0-127
    Ok((input, n as u64))
}
