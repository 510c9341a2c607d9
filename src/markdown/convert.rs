use crate::markdown::ExtractError;
use htmd::HtmlToMarkdown;
use scraper::{ElementRef, Html};

/// Elements that start a new block in plain-text output
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "ul", "ol", "li", "pre", "blockquote", "table", "tr", "dl", "dt", "dd", "hr", "br",
    "figure", "figcaption",
];

/// Elements whose text never belongs in the output
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Converts an HTML fragment to Markdown
///
/// Links and images stay inline, lines are never wrapped, and `script`,
/// `style` and `noscript` content is dropped. If the converter fails the
/// fragment is reduced to plain text with [`strip_html`] instead.
///
/// # Returns
///
/// * `Ok(String)` - Markdown (or plain-text fallback) for the fragment
/// * `Err(ExtractError::Conversion)` - Conversion failed and the fallback found no text
///
/// # Examples
///
/// ```
/// use sumi_scribe::markdown::html_to_markdown;
///
/// let markdown = html_to_markdown("<h1>Setup</h1><p>Run the <code>install</code> script.</p>").unwrap();
/// assert!(markdown.contains("# Setup"));
/// assert!(markdown.contains("`install`"));
/// ```
pub fn html_to_markdown(html: &str) -> Result<String, ExtractError> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();

    match converter.convert(html) {
        Ok(markdown) => Ok(markdown),
        Err(e) => {
            tracing::warn!(error = %e, "Markdown conversion failed, falling back to plain text");
            let text = strip_html(html);
            if text.trim().is_empty() {
                Err(ExtractError::Conversion(e.to_string()))
            } else {
                Ok(text)
            }
        }
    }
}

/// Reduces an HTML fragment to plain text
///
/// Block elements are separated by blank lines; runs of whitespace inside a
/// block collapse to one space.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut blocks = vec![String::new()];
    collect_text(fragment.root_element(), &mut blocks);

    blocks
        .iter()
        .map(|block| block.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn collect_text(element: ElementRef<'_>, blocks: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }

            let is_block = BLOCK_TAGS.contains(&name);
            if is_block {
                blocks.push(String::new());
            }
            collect_text(child_element, blocks);
            if is_block {
                blocks.push(String::new());
            }
        } else if let Some(text) = child.value().as_text() {
            if let Some(current) = blocks.last_mut() {
                current.push_str(text);
            }
        }
    }
}
