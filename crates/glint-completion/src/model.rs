//! The typed model of a parsed completion reply.
//!
//! Everything here is constructed once per server reply and immutable
//! afterwards: the collections expose read access only.

use std::fmt;

use serde_json::Value;

use crate::diagnostics::Diagnostics;

/// Language context from the request that produced a response.
///
/// This is the only slice of the host's request-parameter object the core
/// needs: the file types of the originating source file. They select the
/// per-language classification heuristics and tag every constructed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    file_types: Vec<String>,
}

impl RequestContext {
    pub fn new<I, S>(file_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file_types: file_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn file_types(&self) -> &[String] {
        &self.file_types
    }
}

/// One parsed server reply: the completion candidates plus the diagnostics
/// reported alongside them.
///
/// Either half may be absent when its part of the reply was malformed or
/// omitted; see [`crate::parse_response`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    completions: Option<Completions>,
    diagnostics: Option<Diagnostics>,
}

impl CompletionResponse {
    pub(crate) fn new(completions: Option<Completions>, diagnostics: Option<Diagnostics>) -> Self {
        Self {
            completions,
            diagnostics,
        }
    }

    pub fn completions(&self) -> Option<&Completions> {
        self.completions.as_ref()
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }
}

/// The ordered completion candidates of one reply.
///
/// The backend ranks its candidates; this collection preserves that order
/// exactly and never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Completions {
    options: Vec<CompletionOption>,
    start_column: i64,
}

impl Completions {
    pub(crate) fn new(options: Vec<CompletionOption>, start_column: i64) -> Self {
        Self {
            options,
            start_column,
        }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CompletionOption> {
        self.options.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompletionOption> {
        self.options.iter()
    }

    /// The 1-based column where the matched prefix begins, passed through
    /// from the server payload unmodified.
    pub fn start_column(&self) -> i64 {
        self.start_column
    }
}

impl<'a> IntoIterator for &'a Completions {
    type Item = &'a CompletionOption;
    type IntoIter = std::slice::Iter<'a, CompletionOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

/// One candidate completion.
///
/// All fields are optional in the wire format; an option without insertion
/// text is a placeholder the parser could construct but the host should never
/// insert (see [`CompletionOption::is_valid`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOption {
    pub(crate) menu_info: Option<String>,
    pub(crate) insertion_text: Option<String>,
    pub(crate) extra_data: Option<Value>,
    pub(crate) detailed_info: Option<String>,
    pub(crate) menu_text: Option<String>,
    pub(crate) kind: Option<String>,
    pub(crate) file_types: Option<Vec<String>>,
}

impl CompletionOption {
    /// The opaque, language-dependent description shown in the backend's menu.
    pub fn menu_info(&self) -> Option<&str> {
        self.menu_info.as_deref()
    }

    /// The raw insertion text, before any placeholder expansion.
    pub fn insertion_text(&self) -> Option<&str> {
        self.insertion_text.as_deref()
    }

    /// Raw error/extra payload attached to the candidate, passed through
    /// untouched.
    pub fn extra_data(&self) -> Option<&Value> {
        self.extra_data.as_ref()
    }

    pub fn detailed_info(&self) -> Option<&str> {
        self.detailed_info.as_deref()
    }

    pub fn menu_text(&self) -> Option<&str> {
        self.menu_text.as_deref()
    }

    /// The backend's kind tag, e.g. `"Class"` or `"FUNCTION"`.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn file_types(&self) -> Option<&[String]> {
        self.file_types.as_deref()
    }

    /// Whether the entry was fully constructed: insertion text is the one
    /// field an option cannot be used without.
    pub fn is_valid(&self) -> bool {
        self.insertion_text.as_deref().is_some_and(|text| !text.is_empty())
    }
}

impl fmt::Display for CompletionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.insertion_text.as_deref().unwrap_or("?"))
    }
}
