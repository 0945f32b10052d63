//! Pipeline configuration.

/// Options for one decode run.
///
/// A decode run owns its buffer and diagnostics exclusively; callers wanting
/// to bound total work cap the input size here rather than cancelling
/// mid-decode.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Maximum input bytes to scan (0 = unlimited). Input beyond the cap is
    /// ignored, not an error.
    pub max_input_bytes: usize,

    /// Maximum records to decode from a recovered block (0 = unlimited).
    pub max_records: usize,

    /// Stop scanning once a dump has been recovered. When false, later
    /// regions are still attempted and their failures reported; the first
    /// recovered dump remains the result.
    pub stop_after_first: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: 0,
            max_records: 0,
            stop_after_first: true,
        }
    }
}

impl DecodeOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input size cap in bytes.
    #[must_use]
    pub const fn max_input_bytes(mut self, cap: usize) -> Self {
        self.max_input_bytes = cap;
        self
    }

    /// Sets the decoded record cap.
    #[must_use]
    pub const fn max_records(mut self, cap: usize) -> Self {
        self.max_records = cap;
        self
    }

    /// Sets whether scanning stops at the first recovered dump.
    #[must_use]
    pub const fn stop_after_first(mut self, value: bool) -> Self {
        self.stop_after_first = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = DecodeOptions::default();
        assert_eq!(options.max_input_bytes, 0);
        assert_eq!(options.max_records, 0);
        assert!(options.stop_after_first);
    }

    #[test]
    fn builder_pattern() {
        let options = DecodeOptions::new()
            .max_records(10)
            .stop_after_first(false);
        assert_eq!(options.max_records, 10);
        assert!(!options.stop_after_first);
    }
}
