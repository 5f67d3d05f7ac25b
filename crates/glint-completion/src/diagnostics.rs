//! Diagnostics reported by the backend alongside completions.
//!
//! These indicate potential issues in the backend itself (e.g. no flags
//! available for semantic completion) or in the source file being edited.

use once_cell::sync::Lazy;
use regex::Regex;

/// Exception type of a diagnostic about an unconfirmed extra configuration
/// file.
pub const UNKNOWN_EXTRA_CONF: &str = "UnknownExtraConf";

/// Exception type of a diagnostic about a backend runtime error.
pub const RUNTIME_ERROR: &str = "RuntimeError";

/// The ordered diagnostics of one reply. Read access only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<DiagnosticError>,
}

impl Diagnostics {
    pub(crate) fn new(entries: Vec<DiagnosticError>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DiagnosticError> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiagnosticError> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticError;
    type IntoIter = std::slice::Iter<'a, DiagnosticError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One error or warning surfaced by the backend.
///
/// Every constructed entry carries an exception type; nodes without one are
/// rejected at parse time and never become a `DiagnosticError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticError {
    pub(crate) exception_type: String,
    pub(crate) message: Option<String>,
    pub(crate) traceback: Option<String>,
    pub(crate) file_types: Option<Vec<String>>,
}

impl DiagnosticError {
    pub fn exception_type(&self) -> &str {
        &self.exception_type
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn traceback(&self) -> Option<&str> {
        self.traceback.as_deref()
    }

    pub fn file_types(&self) -> Option<&[String]> {
        self.file_types.as_deref()
    }

    /// Returns true if the diagnostic indicates an unknown extra configuration
    /// file. The user needs to confirm that they want to load and use it, as
    /// it may be unsafe otherwise.
    pub fn is_unknown_extra_conf(&self) -> bool {
        self.exception_type == UNKNOWN_EXTRA_CONF
    }

    /// Returns true if the diagnostic indicates a backend runtime error. The
    /// user needs to fix the underlying issue to get working completions.
    pub fn is_runtime_error(&self) -> bool {
        self.exception_type == RUNTIME_ERROR
    }

    /// Extracts the path of the unconfirmed extra configuration file from the
    /// diagnostic message. A message that does not match the expected pattern
    /// yields `None`, not a failure.
    ///
    /// # Panics
    ///
    /// The entry must already be classified as an unknown-extra-conf
    /// diagnostic; calling this on anything else is a caller bug.
    pub fn unknown_extra_conf_path(&self) -> Option<&str> {
        assert!(
            self.is_unknown_extra_conf(),
            "diagnostic type must be {UNKNOWN_EXTRA_CONF}: {}",
            self.exception_type
        );

        static EXTRA_CONF_PATH_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"Found (.*)\. Load\?").expect("extra-conf pattern is valid"));

        let Some(message) = self.message.as_deref() else {
            tracing::warn!(
                "failed to get unknown extra conf path, no error message available"
            );
            return None;
        };

        EXTRA_CONF_PATH_RE
            .captures(message)
            .and_then(|captures| captures.get(1))
            .map(|path| path.as_str())
    }

    /// Returns true if a runtime-error diagnostic was caused by missing
    /// compile flags.
    ///
    /// # Panics
    ///
    /// The entry must already be classified as a runtime error; calling this
    /// on anything else is a caller bug.
    pub fn is_compile_flag_missing_error(&self) -> bool {
        assert!(
            self.is_runtime_error(),
            "diagnostic type must be {RUNTIME_ERROR}: {}",
            self.exception_type
        );

        self.message
            .as_deref()
            .is_some_and(|message| message.contains("no compile flags"))
    }
}
