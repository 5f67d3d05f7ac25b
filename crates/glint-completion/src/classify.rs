//! Completion classification heuristics.
//!
//! The backend reports an opaque, language-dependent menu string for each
//! candidate; its format is not consistent across languages. `shortdesc`
//! normalizes it into a single short word for the auto-complete list: a
//! language-agnostic tier runs first, then per-language heuristics selected
//! by the entry's file types.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::CompletionOption;

/// The backend could not tell what the candidate is.
pub const SHORTDESC_UNKNOWN: &str = "?";
pub const SHORTDESC_KEYWORD: &str = "keywd";
pub const SHORTDESC_IDENTIFIER: &str = "ident";
pub const SHORTDESC_VARIABLE: &str = "var";
pub const SHORTDESC_FUNCTION: &str = "fn";
pub const SHORTDESC_DEFINITION: &str = "defn";
pub const SHORTDESC_ATTRIBUTE: &str = "attr";
pub const SHORTDESC_MODULE: &str = "mod";
pub const SHORTDESC_MACRO: &str = "macro";

pub const SHORTDESC_TYPE_CLASS: &str = "class";
pub const SHORTDESC_TYPE_STRING: &str = "str";
pub const SHORTDESC_TYPE_NUMBER: &str = "num";

/// Menu info the backend emits for plain identifier matches.
const MENU_INFO_IDENTIFIER: &str = "[ID]";

type ShortDescHandler = fn(Option<&str>, Option<&str>) -> Option<String>;

/// Per-language heuristics, evaluated in this fixed order.
///
/// A source file carries exactly one of these file types in practice, so the
/// order rarely matters; keeping it fixed keeps classification deterministic.
const SHORTDESC_HANDLERS: &[(&str, ShortDescHandler)] = &[
    ("cpp", shortdesc_cpp),
    ("python", shortdesc_python),
    ("javascript", shortdesc_javascript),
];

impl CompletionOption {
    /// Returns a short description of what this candidate represents. The
    /// result is a single word, suitable for display in the auto-complete
    /// list.
    pub fn shortdesc(&self) -> String {
        let menu_info = self.menu_info.as_deref();
        let kind = self.kind.as_deref();

        if let Some(desc) = shortdesc_common(menu_info, kind) {
            return desc.to_string();
        }

        // else, try to get a syntax-specific description
        for (file_type, handler) in SHORTDESC_HANDLERS {
            if self.has_file_type(file_type) {
                if let Some(desc) = handler(menu_info, kind) {
                    return desc;
                }
            }
        }

        match menu_info {
            Some(menu_info) => menu_info.to_string(),
            None => SHORTDESC_UNKNOWN.to_string(),
        }
    }

    /// Returns the text to write into the buffer when the user selects this
    /// candidate.
    ///
    /// When the menu text looks like a function call, each comma-separated
    /// argument becomes a numbered `${n:arg}` placeholder so the editor can
    /// tab through the parameters. An option that was never properly
    /// initialized (no insertion text) logs the anomaly and yields an empty
    /// string; display code must stay robust.
    pub fn text(&self) -> String {
        static FUNC_CALL_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^.*\(.*\)").expect("call pattern is valid"));
        static FUNC_ARGS_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^.*\((.+)\)").expect("args pattern is valid"));

        let Some(insertion_text) = self.insertion_text.as_deref().filter(|text| !text.is_empty())
        else {
            tracing::error!("completion option is not initialized");
            return String::new();
        };

        let menu_text = self.menu_text.as_deref().unwrap_or("");
        if !FUNC_CALL_RE.is_match(menu_text) {
            return insertion_text.to_string();
        }

        let mut placeholders = Vec::new();
        if let Some(args) = FUNC_ARGS_RE.captures(menu_text).and_then(|caps| caps.get(1)) {
            for (index, arg) in args.as_str().split(',').enumerate() {
                placeholders.push(format!("${{{}:{}}}", index + 1, arg.trim()));
            }
        }

        format!("{insertion_text}({})", placeholders.join(", "))
    }

    fn has_file_type(&self, file_type: &str) -> bool {
        let Some(file_types) = self.file_types.as_deref() else {
            tracing::warn!("completion option has no associated file types");
            return false;
        };
        file_types.iter().any(|candidate| candidate == file_type)
    }
}

/// Language-agnostic tier: handles file-type agnostic menu info items, like
/// identifiers and explicitly tagged kinds.
fn shortdesc_common(menu_info: Option<&str>, kind: Option<&str>) -> Option<&'static str> {
    let menu_info = menu_info.filter(|info| !info.is_empty());
    let kind = kind.filter(|kind| !kind.is_empty());

    if menu_info.is_none() && kind.is_none() {
        // weird, the backend doesn't know...
        // return an explicit '?' to suppress the per-language handlers
        return Some(SHORTDESC_UNKNOWN);
    }

    if menu_info == Some(MENU_INFO_IDENTIFIER) {
        return Some(SHORTDESC_IDENTIFIER);
    }

    if let Some(kind) = kind {
        if kind.eq_ignore_ascii_case("class") {
            return Some(SHORTDESC_TYPE_CLASS);
        }
        if kind.eq_ignore_ascii_case("macro") {
            return Some(SHORTDESC_MACRO);
        }
    }

    // else, unknown, let a language-specific handler try
    None
}

fn shortdesc_cpp(_menu_info: Option<&str>, kind: Option<&str>) -> Option<String> {
    match kind.filter(|kind| !kind.is_empty()) {
        // no kind tag at all: an unresolved identifier
        None => Some(MENU_INFO_IDENTIFIER.to_string()),
        Some(kind) => Some(kind.to_lowercase()),
    }
}

fn shortdesc_python(menu_info: Option<&str>, _kind: Option<&str>) -> Option<String> {
    let menu_info = menu_info?;

    if menu_info.contains(" = ") || menu_info.starts_with("instance") {
        return Some(SHORTDESC_ATTRIBUTE.to_string());
    }
    if menu_info.starts_with("keyword") {
        return Some(SHORTDESC_KEYWORD.to_string());
    }
    if menu_info.starts_with("def") {
        return Some(SHORTDESC_FUNCTION.to_string());
    }
    if menu_info.starts_with("module") {
        return Some(SHORTDESC_MODULE.to_string());
    }
    if menu_info.starts_with("class") {
        return Some(SHORTDESC_TYPE_CLASS.to_string());
    }

    None
}

fn shortdesc_javascript(menu_info: Option<&str>, _kind: Option<&str>) -> Option<String> {
    let menu_info = menu_info?;

    if menu_info == "?" {
        return Some(SHORTDESC_UNKNOWN.to_string());
    }
    if menu_info.starts_with("fn") {
        return Some(SHORTDESC_FUNCTION.to_string());
    }
    if menu_info == "string" {
        return Some(SHORTDESC_TYPE_STRING.to_string());
    }
    if menu_info == "number" {
        return Some(SHORTDESC_TYPE_NUMBER.to_string());
    }

    None
}
