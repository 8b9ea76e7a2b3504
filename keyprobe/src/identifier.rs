use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::bits;
use crate::descriptor::KeyDescriptor;
use crate::detect::{self, FormatSignature};
use crate::error::{Error, Result};
use crate::fingerprint;
use crate::format::{FormatParser, default_parsers};
use crate::options::Options;

/// Describes private key files.
///
/// An identifier holds no per-call state; one instance can be shared by
/// any number of threads.
///
/// ```
/// use keyprobe::{KeyIdentifier, Options};
///
/// let identifier = KeyIdentifier::new(Options::default());
/// let err = identifier.identify(b"not a key").unwrap_err();
/// assert_eq!(err.kind().as_str(), "unrecognized-format");
/// ```
pub struct KeyIdentifier {
    options: Options,
    parsers: Vec<Box<dyn FormatParser>>,
}

impl Default for KeyIdentifier {
    fn default() -> Self {
        KeyIdentifier::new(Options::default())
    }
}

impl std::fmt::Debug for KeyIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyIdentifier")
            .field("options", &self.options)
            .field("formats", &self.signatures().map(|s| s.format).collect::<Vec<_>>())
            .finish()
    }
}

impl KeyIdentifier {
    pub fn new(options: Options) -> Self {
        KeyIdentifier {
            options,
            parsers: default_parsers(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Signatures of the supported formats, in detection order.
    pub fn signatures(&self) -> impl Iterator<Item = &'static FormatSignature> + '_ {
        self.parsers.iter().map(|parser| parser.signature())
    }

    /// Identifies a key held in memory.
    pub fn identify(&self, input: &[u8]) -> Result<KeyDescriptor> {
        match self.options.logger() {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || self.run(input)),
            None => self.run(input),
        }
    }

    /// Reads `path` and identifies its contents. Files over the size limit
    /// are rejected before they are read.
    pub fn identify_file(&self, path: impl AsRef<Path>) -> Result<KeyDescriptor> {
        let path = path.as_ref();
        let io_error = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let size = fs::metadata(path).map_err(io_error)?.len();
        self.check_size(size)?;
        let input = fs::read(path).map_err(io_error)?;
        self.identify(&input)
    }

    fn check_size(&self, size: u64) -> Result<()> {
        let max = self.options.max_input_size() as u64;
        if size > max {
            return Err(Error::InputTooLarge { size, max });
        }
        Ok(())
    }

    fn run(&self, input: &[u8]) -> Result<KeyDescriptor> {
        self.check_size(input.len() as u64)?;

        let parser = detect::detect(&self.parsers, input).inspect_err(|_| {
            debug!(size = input.len(), "no format signature matched");
        })?;
        let signature = parser.signature();
        trace!(format = %signature.format, "format detected");

        let parsed = parser.parse(input).inspect_err(|err| {
            debug!(format = %signature.format, kind = %err.kind(), "parse failed");
        })?;

        let bits = bits::resolve(parsed.algorithm, parsed.public_key.as_ref());
        let mut descriptor = KeyDescriptor::new(signature.format, parsed.algorithm, parsed.encrypted)
            .with_bits(bits)
            .with_encryption(parsed.encryption)
            .with_comment(parsed.comment);
        if let Some(public_key) = &parsed.public_key {
            let fingerprints = fingerprint::compute(public_key)?;
            descriptor = descriptor.with_fingerprints(fingerprints.md5, fingerprints.sha256);
        }

        debug!(
            format = %descriptor.format(),
            key_type = descriptor.key_type(),
            encrypted = descriptor.encrypted(),
            bits = ?descriptor.bits(),
            "key identified"
        );
        Ok(descriptor)
    }
}
