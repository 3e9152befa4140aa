use crate::error::Result;
use crate::index::TripleIndex;
use crate::model::{Language, ResultMap};

/// Render a result map as one line per anchor: `<anchor id>: <label>, <label>`.
///
/// Anchors and values keep their sorted order. Lines are joined with `\n`
/// without a trailing newline.
pub fn format_answer<I: TripleIndex + ?Sized>(index: &I, results: &ResultMap, language: &Language) -> Result<String> {
    let mut lines = Vec::with_capacity(results.len());
    for (anchor, values) in results {
        let mut labels = Vec::new();
        for value in values {
            labels.extend(index.labels(value, language)?);
        }
        lines.push(format!("{}: {}", anchor.id(), labels.join(", ")));
    }
    Ok(lines.join("\n"))
}
