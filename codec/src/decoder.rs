//! Decoder trait for type-safe conversions.
//!
//! `Decoder<T, D>` converts a source `T` into a destination `D`. The
//! destination must opt in through `DecodableFrom<T>`, so only the
//! conversions a crate declares can be called.
//!
//! # Implementation Guide
//!
//! ```no_run
//! use keyprobe_codec::decoder::{DecodableFrom, Decoder};
//!
//! struct Armored(String);
//! struct Body(Vec<u8>);
//!
//! #[derive(Debug)]
//! struct BodyError;
//!
//! impl DecodableFrom<Armored> for Body {}
//!
//! impl Decoder<Armored, Body> for Armored {
//!     type Error = BodyError;
//!
//!     fn decode(&self) -> Result<Body, Self::Error> {
//!         Ok(Body(self.0.as_bytes().to_vec()))
//!     }
//! }
//! ```

/// Converts `self` (of type `T`) into `D`.
///
/// Implemented on the source type; `D` must implement `DecodableFrom<T>`.
/// Call sites usually let inference pick the destination:
///
/// ```ignore
/// use keyprobe_codec::decoder::Decoder;
/// use keyprobe_der::Der;
///
/// let der: Der = vec![0x05, 0x00].decode()?;
/// ```
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error when the source is not a valid encoding of `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait declaring that `Self` can be decoded from `T`.
pub trait DecodableFrom<T> {}
