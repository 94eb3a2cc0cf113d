//! Configuration options for parsing.
//!
//! ## Examples
//!
//! ```rust
//! use jsonbind::{ParseOptions, Parser};
//!
//! let options = ParseOptions::new().with_max_depth(2);
//! let mut parser = Parser::with_options("[[[1]]]".chars(), options);
//! assert!(parser.parse().is_err());
//! ```

/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration options for [`crate::Parser`].
///
/// # Examples
///
/// ```rust
/// use jsonbind::ParseOptions;
///
/// let options = ParseOptions::new()
///     .with_max_depth(64)
///     .with_strict_control(true);
/// assert_eq!(options.max_depth, 64);
/// assert!(options.strict_control);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of arrays and objects.
    pub max_depth: usize,
    /// Reject raw U+0000..U+001F characters inside strings.
    pub strict_control: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_control: false,
        }
    }
}

impl ParseOptions {
    /// Creates default options (depth 512, raw control characters allowed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    ///
    /// Input nested deeper fails with [`crate::Error::DepthLimit`] instead of
    /// recursing further.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_strict_control(mut self, strict: bool) -> Self {
        self.strict_control = strict;
        self
    }
}
