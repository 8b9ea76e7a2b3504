use tracing::Dispatch;

/// Default upper bound on the size of an input, in bytes.
pub const DEFAULT_MAX_INPUT_SIZE: usize = 1024 * 1024;

/// Settings for a [`KeyIdentifier`](crate::KeyIdentifier).
///
/// No option changes how a key is classified. `max_input_size` bounds the
/// work done per call and `logger` receives diagnostic events.
///
/// ```
/// use keyprobe::Options;
///
/// let options = Options::default().with_max_input_size(64 * 1024);
/// assert_eq!(options.max_input_size(), 64 * 1024);
/// assert!(options.logger().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    max_input_size: usize,
    logger: Option<Dispatch>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            logger: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_input_size(mut self, max_input_size: usize) -> Self {
        self.max_input_size = max_input_size;
        self
    }

    /// Routes this identifier's `tracing` events to `logger` instead of the
    /// global default subscriber.
    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn max_input_size(&self) -> usize {
        self.max_input_size
    }

    pub fn logger(&self) -> Option<&Dispatch> {
        self.logger.as_ref()
    }
}
