//! Parser configuration.

/// Default root element name.
pub const DEFAULT_ROOT_TAG: &str = "xode";

/// Default limit on element nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling a [`Parser`](crate::Parser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// The only element name accepted as the document root (default: `xode`).
    pub root_tag: String,
    /// Maximum number of simultaneously open elements (default: 256).
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            root_tag: DEFAULT_ROOT_TAG.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root element name.
    #[must_use]
    pub fn with_root_tag(mut self, root_tag: impl Into<String>) -> Self {
        self.root_tag = root_tag.into();
        self
    }

    /// Set the maximum element nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
