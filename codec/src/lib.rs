//! # keyprobe-codec
//!
//! Conversion traits shared by every stage of the keyprobe pipeline.
//!
//! ## Overview
//!
//! A key file travels through a chain of representations before it is
//! identified:
//!
//! ```text
//! bytes → Pem → Vec<u8> → Der → ASN1Object → Element → private key structure
//! bytes → SSH wire blob → PublicKey → canonical wire blob → fingerprint
//! ```
//!
//! Each step is a [`decoder::Decoder`] implementation, and the few steps that
//! run backwards (rebuilding a canonical public key blob) use
//! [`encoder::Encoder`].
//!
//! ## Type Safety
//!
//! Both traits are constrained by a marker trait (`DecodableFrom` /
//! `EncodableTo`), so a conversion exists only where a crate explicitly
//! declared it.
//!
//! ```ignore
//! use keyprobe_codec::decoder::Decoder;
//! use keyprobe_der::Der;
//! use keyprobe_asn1::ASN1Object;
//!
//! let bytes = vec![0x30, 0x03, 0x02, 0x01, 0x00];
//! let der: Der = bytes.decode().unwrap();
//! let asn1: ASN1Object = der.decode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
