//! Splitting place files into a metadata block and a markdown body.
//!
//! A metadata block is delimited by lines containing only `---`, the first
//! of which must open the file. Files without a terminated block are treated
//! as body-only and fail later on their missing fields.

const FENCE: &str = "---";

/// A place file split into its two parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Document<'a> {
    /// Raw YAML between the fences, if the file has a metadata block.
    pub(crate) metadata: Option<&'a str>,
    /// Markdown following the closing fence.
    pub(crate) body: &'a str,
}

/// Split `source` into metadata and body.
pub(crate) fn split(source: &str) -> Document<'_> {
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);
    let body_only = Document {
        metadata: None,
        body: text,
    };
    let Some(rest) = after_opening_fence(text) else {
        return body_only;
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_fence(line) {
            let metadata = rest.get(..offset).unwrap_or_default();
            let body = rest.get(offset + line.len()..).unwrap_or_default();
            return Document {
                metadata: Some(metadata),
                body,
            };
        }
        offset += line.len();
    }
    body_only
}

fn after_opening_fence(text: &str) -> Option<&str> {
    let (first, rest) = text.split_once('\n')?;
    is_fence(first).then_some(rest)
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == FENCE
}
