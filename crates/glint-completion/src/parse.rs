//! Parsing of raw backend replies into the typed model.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::diagnostics::{DiagnosticError, Diagnostics};
use crate::model::{CompletionOption, CompletionResponse, Completions, RequestContext};

/// A raw server reply: JSON text, JSON bytes, or an already-decoded value.
///
/// An already-decoded value is copied before use; the caller's value is never
/// mutated. Anything that decodes to a non-object is rejected with
/// [`ParseError::NotAnObject`].
#[derive(Debug, Clone, Copy)]
pub enum RawResponse<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
    Json(&'a Value),
}

impl<'a> From<&'a str> for RawResponse<'a> {
    fn from(text: &'a str) -> Self {
        RawResponse::Text(text)
    }
}

impl<'a> From<&'a [u8]> for RawResponse<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        RawResponse::Bytes(bytes)
    }
}

impl<'a> From<&'a Value> for RawResponse<'a> {
    fn from(value: &'a Value) -> Self {
        RawResponse::Json(value)
    }
}

/// Errors from parsing one half of a completion reply.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The reply was not decodable as JSON at all.
    #[error("response is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    /// The reply decoded to something other than a JSON object.
    #[error("response must be a json object")]
    NotAnObject,

    /// A required field is absent or does not have the required shape.
    #[error("response is missing a well-formed `{field}` field")]
    MalformedField { field: &'static str },

    /// A diagnostic node does not carry an exception type; that shape is not
    /// implemented.
    #[error("unimplemented: diagnostic does not have an exception type")]
    UnsupportedDiagnostic,
}

/// Parses the completion candidates out of a reply.
///
/// Requires `completions` to be a list of objects and
/// `completion_start_column` to be an integer. The `errors` field is not
/// consulted here: some call sites request completions without needing
/// diagnostics, and a reply omitting them must not be rejected.
///
/// Candidates are built in server order, and each carries the caller's
/// file-type context.
pub fn parse_completions<'a>(
    raw: impl Into<RawResponse<'a>>,
    context: Option<&RequestContext>,
) -> Result<Completions, ParseError> {
    let response = decode(raw.into())?;
    validate(&response, false)?;

    // just pass the column through, no coercion
    let start_column = response
        .get("completion_start_column")
        .and_then(Value::as_i64)
        .ok_or(ParseError::MalformedField {
            field: "completion_start_column",
        })?;

    let file_types = context.map(RequestContext::file_types);

    // validated above: present, and an array of objects
    let nodes = response
        .get("completions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let options = nodes
        .iter()
        .filter_map(Value::as_object)
        .map(|node| completion_option(node, file_types))
        .collect();

    Ok(Completions::new(options, start_column))
}

/// Parses the diagnostics out of a reply.
///
/// Diagnostics are a secondary view of a still-well-formed completion reply,
/// so both the `errors` and `completions` shape checks apply. Returns
/// `Ok(None)` when the reply reports no diagnostics at all, which callers can
/// distinguish from a parsed batch that ended up empty.
///
/// A node without an exception type is skipped with a warning; it never
/// aborts the batch.
pub fn parse_diagnostics<'a>(
    raw: impl Into<RawResponse<'a>>,
    context: Option<&RequestContext>,
) -> Result<Option<Diagnostics>, ParseError> {
    let response = decode(raw.into())?;
    validate(&response, true)?;

    let nodes = response
        .get("errors")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if nodes.is_empty() {
        tracing::debug!("no errors or diagnostics to report");
        return Ok(None);
    }

    let file_types = context.map(RequestContext::file_types);

    let mut entries = Vec::new();
    for node in nodes.iter().filter_map(Value::as_object) {
        match diagnostic(node, file_types) {
            Ok(entry) => entries.push(entry),
            Err(err @ ParseError::UnsupportedDiagnostic) => {
                tracing::warn!(error = %err, "unhandled diagnostic format");
            }
            Err(err) => {
                tracing::error!(error = %err, "error while parsing diagnostic");
            }
        }
    }

    Ok(Some(Diagnostics::new(entries)))
}

/// Parses a full reply, salvaging whatever halves survive.
///
/// This never fails: each half is attempted independently, and a half that
/// cannot be parsed resolves to an absent result with a logged event. A
/// partially-broken reply still lets the caller use the half that parsed.
pub fn parse_response<'a>(
    raw: impl Into<RawResponse<'a>>,
    context: Option<&RequestContext>,
) -> CompletionResponse {
    let raw = raw.into();

    let completions = match parse_completions(raw, context) {
        Ok(completions) => Some(completions),
        Err(err) => {
            log_downgraded("completions", &err);
            None
        }
    };

    let diagnostics = match parse_diagnostics(raw, context) {
        Ok(diagnostics) => diagnostics,
        Err(err) => {
            log_downgraded("diagnostics", &err);
            None
        }
    };

    CompletionResponse::new(completions, diagnostics)
}

fn log_downgraded(section: &'static str, err: &ParseError) {
    match err {
        // wrong top-level type is a caller-side bug, not a flaky reply
        ParseError::NotAnObject => {
            tracing::error!(section, error = %err, "error while parsing response");
        }
        _ => {
            tracing::warn!(section, error = %err, "response has unexpected format");
        }
    }
}

fn decode(raw: RawResponse<'_>) -> Result<Map<String, Value>, ParseError> {
    let value: Value = match raw {
        RawResponse::Text(text) => serde_json::from_str(text)?,
        RawResponse::Bytes(bytes) => serde_json::from_slice(bytes)?,
        // defensive copy: the caller's value is never touched
        RawResponse::Json(value) => value.clone(),
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

fn is_object_list(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|items| items.iter().all(Value::is_object))
}

/// Shape-check a decoded reply. The `completions` check is always enforced;
/// the `errors` check only when the caller needs diagnostics.
fn validate(response: &Map<String, Value>, require_errors: bool) -> Result<(), ParseError> {
    if require_errors && !is_object_list(response.get("errors")) {
        return Err(ParseError::MalformedField { field: "errors" });
    }
    if !is_object_list(response.get("completions")) {
        return Err(ParseError::MalformedField {
            field: "completions",
        });
    }
    Ok(())
}

fn string_field(node: &Map<String, Value>, field: &str) -> Option<String> {
    node.get(field).and_then(Value::as_str).map(str::to_string)
}

fn completion_option(node: &Map<String, Value>, file_types: Option<&[String]>) -> CompletionOption {
    CompletionOption {
        menu_info: string_field(node, "extra_menu_info"),
        insertion_text: string_field(node, "insertion_text"),
        extra_data: node.get("extra_data").filter(|v| !v.is_null()).cloned(),
        detailed_info: string_field(node, "detailed_info"),
        menu_text: string_field(node, "menu_text"),
        kind: string_field(node, "kind"),
        file_types: file_types.map(<[String]>::to_vec),
    }
}

fn diagnostic(
    node: &Map<String, Value>,
    file_types: Option<&[String]>,
) -> Result<DiagnosticError, ParseError> {
    let exception_type = node
        .get("exception")
        .and_then(Value::as_object)
        .and_then(|exception| exception.get("TYPE"))
        .and_then(Value::as_str)
        .filter(|exception_type| !exception_type.is_empty())
        .ok_or(ParseError::UnsupportedDiagnostic)?;

    Ok(DiagnosticError {
        exception_type: exception_type.to_string(),
        message: string_field(node, "message"),
        traceback: string_field(node, "traceback"),
        file_types: file_types.map(<[String]>::to_vec),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn reply() -> Value {
        json!({
            "completions": [
                { "insertion_text": "foo", "extra_menu_info": "def foo", "menu_text": "foo(a, b)" },
                { "insertion_text": "bar", "kind": "Class" },
                { "extra_menu_info": "incomplete" },
            ],
            "completion_start_column": 7,
        })
    }

    #[test]
    fn completions_preserve_server_order() {
        let reply = reply();
        let completions = parse_completions(&reply, None).unwrap();

        assert_eq!(completions.len(), 3);
        assert_eq!(completions.start_column(), 7);
        let order: Vec<_> = completions
            .iter()
            .map(|option| option.insertion_text().unwrap_or(""))
            .collect();
        assert_eq!(order, ["foo", "bar", ""]);
    }

    #[test]
    fn an_option_without_insertion_text_is_a_placeholder_not_a_failure() {
        let reply = reply();
        let completions = parse_completions(&reply, None).unwrap();
        let placeholder = completions.get(2).unwrap();

        assert!(!placeholder.is_valid());
        assert_eq!(placeholder.text(), "");
    }

    #[test]
    fn text_and_byte_inputs_decode_before_parsing() {
        let encoded = serde_json::to_string(&reply()).unwrap();

        let from_text = parse_completions(encoded.as_str(), None).unwrap();
        let from_bytes = parse_completions(encoded.as_bytes(), None).unwrap();
        assert_eq!(from_text, from_bytes);
        assert_eq!(from_text.len(), 3);
    }

    #[test]
    fn undecodable_text_is_a_json_error() {
        let err = parse_completions("{ not json", None).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn non_object_replies_are_a_type_error() {
        let array = json!([1, 2, 3]);
        let err = parse_completions(&array, None).unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject));
    }

    #[test]
    fn missing_completions_is_a_malformed_field() {
        let reply = json!({ "completion_start_column": 1 });
        let err = parse_completions(&reply, None).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedField {
                field: "completions"
            }
        ));
    }

    #[test]
    fn non_object_completion_entries_are_a_malformed_field() {
        let reply = json!({ "completions": [1, 2], "completion_start_column": 1 });
        let err = parse_completions(&reply, None).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedField {
                field: "completions"
            }
        ));
    }

    #[test]
    fn missing_start_column_is_a_malformed_field() {
        let reply = json!({ "completions": [] });
        let err = parse_completions(&reply, None).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedField {
                field: "completion_start_column"
            }
        ));
    }

    #[test]
    fn options_carry_the_request_file_types() {
        let reply = reply();
        let context = RequestContext::new(["python"]);
        let completions = parse_completions(&reply, Some(&context)).unwrap();

        assert_eq!(
            completions.get(0).unwrap().file_types(),
            Some(["python".to_string()].as_slice())
        );
        // without a context the options stay untagged
        let untagged = parse_completions(&reply, None).unwrap();
        assert_eq!(untagged.get(0).unwrap().file_types(), None);
    }

    #[test]
    fn parsing_is_idempotent() {
        let reply = reply();
        let first = parse_response(&reply, None);
        let second = parse_response(&reply, None);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_errors_means_no_diagnostics_reported() {
        let reply = json!({
            "completions": [],
            "completion_start_column": 1,
            "errors": [],
        });
        assert_eq!(parse_diagnostics(&reply, None).unwrap(), None);
    }

    #[test]
    fn absent_errors_fails_the_diagnostics_shape_check() {
        let reply = json!({ "completions": [], "completion_start_column": 1 });
        let err = parse_diagnostics(&reply, None).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { field: "errors" }));
    }

    #[test]
    fn diagnostics_require_a_well_formed_completions_field_too() {
        let reply = json!({ "errors": [] });
        let err = parse_diagnostics(&reply, None).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedField {
                field: "completions"
            }
        ));
    }

    #[test]
    fn diagnostic_nodes_build_entries() {
        let reply = json!({
            "completions": [],
            "completion_start_column": 1,
            "errors": [
                {
                    "exception": { "TYPE": "RuntimeError" },
                    "message": "error: no compile flags",
                    "traceback": "...",
                },
            ],
        });

        let context = RequestContext::new(["cpp"]);
        let diagnostics = parse_diagnostics(&reply, Some(&context)).unwrap().unwrap();
        assert_eq!(diagnostics.len(), 1);

        let entry = diagnostics.get(0).unwrap();
        assert_eq!(entry.exception_type(), "RuntimeError");
        assert_eq!(entry.message(), Some("error: no compile flags"));
        assert_eq!(entry.traceback(), Some("..."));
        assert_eq!(entry.file_types(), Some(["cpp".to_string()].as_slice()));
        assert!(entry.is_runtime_error());
        assert!(entry.is_compile_flag_missing_error());
    }

    #[test]
    fn nodes_without_an_exception_type_are_skipped_not_fatal() {
        let reply = json!({
            "completions": [],
            "completion_start_column": 1,
            "errors": [
                { "message": "shapeless" },
                { "exception": {}, "message": "still shapeless" },
                { "exception": { "TYPE": "UnknownExtraConf" }, "message": "Found /tmp/.ycm_extra_conf.py. Load?" },
            ],
        });

        let diagnostics = parse_diagnostics(&reply, None).unwrap().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.get(0).unwrap().is_unknown_extra_conf());
    }

    #[test]
    fn parse_response_never_fails() {
        // missing completions: both halves downgrade to absent
        let broken = json!({ "something": "else" });
        let response = parse_response(&broken, None);
        assert_eq!(response.completions(), None);
        assert_eq!(response.diagnostics(), None);

        // wrong top-level type: same contract
        let wrong_type = json!(42);
        let response = parse_response(&wrong_type, None);
        assert_eq!(response.completions(), None);
        assert_eq!(response.diagnostics(), None);

        // undecodable text: same contract
        let response = parse_response("{ nope", None);
        assert_eq!(response.completions(), None);
        assert_eq!(response.diagnostics(), None);
    }

    #[test]
    fn parse_response_salvages_the_surviving_half() {
        // valid completions, omitted errors: diagnostics downgrade to absent
        let reply = reply();
        let response = parse_response(&reply, None);
        assert_eq!(response.completions().map(Completions::len), Some(3));
        assert_eq!(response.diagnostics(), None);

        // valid errors, malformed completions: completions downgrade instead
        let reply = json!({
            "completions": "not a list",
            "errors": [],
        });
        let response = parse_response(&reply, None);
        assert_eq!(response.completions(), None);
        // diagnostics still required the completions shape check
        assert_eq!(response.diagnostics(), None);
    }

    #[test]
    fn callers_value_is_defensively_copied() {
        let reply = reply();
        let before = reply.clone();
        let _ = parse_response(&reply, None);
        assert_eq!(reply, before);
    }
}
