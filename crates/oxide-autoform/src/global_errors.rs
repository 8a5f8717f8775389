//! Aggregation of errors that no visible field can display.

use std::collections::HashMap;

use crate::label::infer_label;

/// Builds the list of global error messages.
///
/// Explicit global errors come first, followed by the errors of every hidden
/// field (in `hidden_keys` order), each prefixed with `"<label>: "`. Labels
/// come from `labels` or are inferred from the key. Empty messages are
/// dropped.
///
/// Returns `None` rather than an empty list when there is nothing to show.
pub fn aggregate_global_errors(
    explicit: Option<&[String]>,
    hidden_keys: &[String],
    errors_by_field: &HashMap<String, Vec<String>>,
    labels: &HashMap<String, String>,
) -> Option<Vec<String>> {
    let hidden = hidden_keys.iter().flat_map(|key| {
        let label = labels.get(key).cloned().unwrap_or_else(|| infer_label(key));
        errors_by_field
            .get(key)
            .into_iter()
            .flatten()
            .filter(|message| !message.is_empty())
            .map(move |message| format!("{label}: {message}"))
    });

    let all: Vec<String> = explicit
        .unwrap_or_default()
        .iter()
        .filter(|message| !message.is_empty())
        .cloned()
        .chain(hidden)
        .collect();

    if all.is_empty() {
        None
    } else {
        Some(all)
    }
}
