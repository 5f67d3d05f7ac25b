//! Response interpretation for an editor completion client.
//!
//! The completion backend replies with loosely structured JSON: candidate
//! completions, an optional list of diagnostics, and assorted
//! language-dependent metadata. This crate turns such a reply into a typed,
//! ordered, immutable model ([`CompletionResponse`]), classifies each
//! candidate into a short display category, and expands function-call menu
//! text into snippet placeholders.
//!
//! Parsing is deliberately forgiving at the top level: [`parse_response`]
//! never fails. A malformed half of the reply is downgraded to an absent
//! result and logged, so the caller can still use whatever half survived.

mod classify;
mod diagnostics;
mod model;
mod parse;

pub use classify::{
    SHORTDESC_ATTRIBUTE, SHORTDESC_DEFINITION, SHORTDESC_FUNCTION, SHORTDESC_IDENTIFIER,
    SHORTDESC_KEYWORD, SHORTDESC_MACRO, SHORTDESC_MODULE, SHORTDESC_TYPE_CLASS,
    SHORTDESC_TYPE_NUMBER, SHORTDESC_TYPE_STRING, SHORTDESC_UNKNOWN, SHORTDESC_VARIABLE,
};
pub use diagnostics::{DiagnosticError, Diagnostics, RUNTIME_ERROR, UNKNOWN_EXTRA_CONF};
pub use model::{CompletionOption, CompletionResponse, Completions, RequestContext};
pub use parse::{parse_completions, parse_diagnostics, parse_response, ParseError, RawResponse};
