pub const DEFAULT_PREFIX: &str = "DSC";
pub const SEQUENCE_WIDTH: usize = 6;

/// Hands out `<prefix>_<NNNNNN>` names for one run.
///
/// Numbering starts at 1 and is never reused. Values past 999999 simply get
/// wider.
#[derive(Debug, Clone)]
pub struct SequenceNamer {
    prefix: String,
    counter: u64,
}

impl SequenceNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    #[cfg(test)]
    fn resume_after(prefix: &str, counter: u64) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter,
        }
    }

    /// Last sequence number handed out, 0 before the first call.
    pub fn current(&self) -> u64 {
        self.counter
    }

    pub fn next_name(&mut self) -> String {
        self.counter += 1;
        format!(
            "{}_{:0width$}",
            self.prefix,
            self.counter,
            width = SEQUENCE_WIDTH
        )
    }

    pub fn next_file_name(&mut self, extension_with_dot: &str) -> String {
        format!("{}{}", self.next_name(), extension_with_dot)
    }
}

impl Default for SequenceNamer {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
