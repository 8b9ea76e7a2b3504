//! Error types for key identification.
//!
//! Every failure is one of five kinds (see [`ErrorKind`]). Structural
//! problems found by the lower layers (PEM armor, base64, DER, ASN.1 and
//! SSH wire fields) are all reported as [`Error::MalformedKeyData`] with
//! the underlying cause kept in [`Malformed`].

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`KeyIdentifier`](crate::KeyIdentifier).
#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No known header or magic matched.
    #[error("unrecognized key format")]
    UnrecognizedFormat,

    /// The format was recognized but its encoding is invalid.
    #[error("malformed key data: {0}")]
    MalformedKeyData(#[from] Malformed),

    /// The container is valid but holds an algorithm outside the supported set.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The input is larger than the configured limit.
    #[error("input of {size} bytes exceeds the limit of {max} bytes")]
    InputTooLarge { size: u64, max: u64 },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::UnrecognizedFormat => ErrorKind::UnrecognizedFormat,
            Error::MalformedKeyData(_) => ErrorKind::MalformedKeyData,
            Error::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Error::InputTooLarge { .. } => ErrorKind::InputTooLarge,
        }
    }

    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        Error::MalformedKeyData(Malformed::InvalidStructure(msg.into()))
    }
}

/// Copyable discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    UnrecognizedFormat,
    MalformedKeyData,
    UnsupportedAlgorithm,
    InputTooLarge,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Io => "io-error",
            ErrorKind::UnrecognizedFormat => "unrecognized-format",
            ErrorKind::MalformedKeyData => "malformed-key-data",
            ErrorKind::UnsupportedAlgorithm => "unsupported-algorithm",
            ErrorKind::InputTooLarge => "input-too-large",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The structural cause behind [`Error::MalformedKeyData`].
#[derive(Debug, Error)]
pub enum Malformed {
    #[error("PEM: {0}")]
    Pem(#[from] keyprobe_pem::error::Error),

    #[error("DER: {0}")]
    Der(#[from] keyprobe_der::error::Error),

    #[error("ASN.1: {0}")]
    Asn1(#[from] keyprobe_asn1::error::Error),

    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("truncated or invalid wire field ({0:?})")]
    Wire(nom::error::ErrorKind),

    #[error("text is not valid UTF-8")]
    InvalidUtf8,

    #[error("bad magic preamble")]
    BadMagic,

    #[error("negative integer in {0}")]
    NegativeInteger(&'static str),

    #[error("missing header {0}")]
    MissingHeader(&'static str),

    #[error("{0}")]
    InvalidStructure(String),
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for Malformed {
    fn from(err: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => Malformed::Wire(nom::error::ErrorKind::Eof),
            nom::Err::Error(e) | nom::Err::Failure(e) => Malformed::Wire(e.code),
        }
    }
}

impl From<keyprobe_pem::error::Error> for Error {
    fn from(err: keyprobe_pem::error::Error) -> Self {
        Error::MalformedKeyData(err.into())
    }
}

impl From<keyprobe_der::error::Error> for Error {
    fn from(err: keyprobe_der::error::Error) -> Self {
        Error::MalformedKeyData(err.into())
    }
}

impl From<keyprobe_asn1::error::Error> for Error {
    fn from(err: keyprobe_asn1::error::Error) -> Self {
        Error::MalformedKeyData(err.into())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::MalformedKeyData(err.into())
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        Error::MalformedKeyData(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
