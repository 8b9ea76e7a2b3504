//! Encoder trait, the reverse direction of [`Decoder`](crate::decoder::Decoder).
//!
//! keyprobe only encodes in one place: rebuilding the canonical SSH wire
//! blob of a public key so that it can be fingerprinted.

/// Converts `self` (of type `T`) into the encoded form `E`.
pub trait Encoder<T, E: EncodableTo<T>> {
    /// The error type returned when encoding fails.
    type Error;

    /// Encodes `self` into type `E`.
    ///
    /// # Errors
    ///
    /// Returns an error when `self` has no valid encoding.
    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait declaring that `Self` is an encoded form of `T`.
pub trait EncodableTo<T> {}
