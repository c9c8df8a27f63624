//! Markdown to sanitized HTML.
//!
//! Bodies pass through a fixed sequence: parse markdown with the GitHub
//! extensions (tables, strikethrough, task lists), render to HTML, then
//! sanitize. The sanitizer runs on every body without exception; rendered
//! markup is later injected into pages without further escaping.

use std::borrow::Cow;
use std::fmt;

use ammonia::Builder;
use pulldown_cmark::{Options, Parser, html};
use thiserror::Error;

/// Errors raised while rendering a markdown body.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// Writing rendered HTML into the output buffer failed.
    #[error("failed to render markdown to HTML")]
    Render(#[from] fmt::Error),
}

/// HTML that has been through the sanitizer.
///
/// The only way to obtain one is [`MarkupPipeline::render`], so holding a
/// value is proof the markup is safe to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    /// Borrow the markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the markup.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configured markdown renderer and sanitizer.
///
/// Build one per load and reuse it for every body in the batch.
///
/// # Examples
/// ```
/// use travelmap_content::MarkupPipeline;
///
/// # fn main() -> Result<(), travelmap_content::MarkupError> {
/// let pipeline = MarkupPipeline::new();
/// let html = pipeline.render("**hi**<script>alert(1)</script>")?;
/// assert!(html.as_str().contains("<strong>hi</strong>"));
/// assert!(!html.as_str().contains("<script"));
/// # Ok(())
/// # }
/// ```
pub struct MarkupPipeline {
    options: Options,
    sanitizer: Builder<'static>,
}

impl fmt::Debug for MarkupPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupPipeline")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for MarkupPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupPipeline {
    /// Build the pipeline with GitHub-flavoured extensions and the default
    /// sanitizer policy, extended to keep task-list checkboxes.
    #[must_use]
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut sanitizer = Builder::default();
        sanitizer
            .add_tags(["input"])
            .add_tag_attributes("input", ["type", "checked", "disabled"])
            .attribute_filter(keep_checkbox_inputs);

        Self { options, sanitizer }
    }

    /// Render `markdown` to sanitized HTML.
    ///
    /// # Errors
    /// Returns [`MarkupError::Render`] when the renderer fails to write its
    /// output. No partially rendered markup is returned.
    pub fn render(&self, markdown: &str) -> Result<SanitizedHtml, MarkupError> {
        let parser = Parser::new_ext(markdown, self.options);
        let mut rendered = String::with_capacity(markdown.len());
        html::write_html_fmt(&mut rendered, parser)?;
        Ok(SanitizedHtml(self.sanitizer.clean(&rendered).to_string()))
    }
}

fn keep_checkbox_inputs<'u>(
    element: &str,
    attribute: &str,
    value: &'u str,
) -> Option<Cow<'u, str>> {
    if element == "input" && attribute == "type" && value != "checkbox" {
        None
    } else {
        Some(Cow::Borrowed(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pipeline() -> MarkupPipeline {
        MarkupPipeline::new()
    }

    fn render(pipeline: &MarkupPipeline, markdown: &str) -> String {
        pipeline.render(markdown).expect("render").into_string()
    }

    #[rstest]
    #[case("<script>alert(1)</script>", "<script")]
    #[case("<img src=\"x.png\" onerror=\"alert(1)\">", "onerror")]
    #[case("[click](javascript:alert(1))", "javascript:")]
    #[case("<iframe src=\"https://example.com\"></iframe>", "<iframe")]
    #[case("<a href=\"#\" onclick=\"steal()\">x</a>", "onclick")]
    fn strips_script_capable_markup(
        pipeline: MarkupPipeline,
        #[case] markdown: &str,
        #[case] forbidden: &str,
    ) {
        let html = render(&pipeline, markdown);
        assert!(!html.contains(forbidden), "{html}");
    }

    #[rstest]
    fn preserves_benign_formatting(pipeline: MarkupPipeline) {
        let html = render(
            &pipeline,
            "**bold** and ~~gone~~\n\n- one\n- two\n\n| a | b |\n|---|---|\n| 1 | 2 |\n",
        );
        for needle in [
            "<strong>bold</strong>",
            "<del>gone</del>",
            "<li>one</li>",
            "<table>",
            "<td>2</td>",
        ] {
            assert!(html.contains(needle), "missing {needle} in {html}");
        }
    }

    #[rstest]
    fn keeps_task_list_checkboxes(pipeline: MarkupPipeline) {
        let html = render(&pipeline, "- [x] packed\n- [ ] booked\n");
        assert!(html.contains("type=\"checkbox\""), "{html}");
        assert!(html.contains("checked"), "{html}");
    }

    #[rstest]
    fn drops_non_checkbox_input_types(pipeline: MarkupPipeline) {
        let html = render(&pipeline, "<input type=\"password\">");
        assert!(!html.contains("password"), "{html}");
    }

    #[rstest]
    fn empty_body_renders_empty(pipeline: MarkupPipeline) {
        assert_eq!(render(&pipeline, ""), "");
    }
}
