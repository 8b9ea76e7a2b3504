use nom::error::{ErrorKind, ParseError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("parser error {0:?}")]
    Parser(ErrorKind),
    #[error("parser incomplete: {0:?}")]
    ParserIncomplete(nom::Needed),
    #[error("indefinite length is not allowed in DER")]
    IndefiniteLength,
    #[error("length field of {0} bytes overflows")]
    LengthOverflow(u8),
    #[error("high tag numbers are not supported")]
    UnsupportedTag,
    #[error("constructed values nested deeper than {0}")]
    NestingTooDeep(usize),
    #[error("{0} bytes of trailing data")]
    TrailingData(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

impl<'a> ParseError<&'a [u8]> for Error {
    fn from_error_kind(_input: &'a [u8], kind: ErrorKind) -> Self {
        Error::Parser(kind)
    }

    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Incomplete(needed) => Error::ParserIncomplete(needed),
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        }
    }
}
