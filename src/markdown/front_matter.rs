use chrono::{DateTime, SecondsFormat, Utc};

/// Metadata extracted from a page and written as front matter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    /// The page URL
    pub url: String,
    /// Text of the `<title>` element
    pub title: String,
    /// Meta description (or its Open Graph equivalent)
    pub description: String,
    /// Meta keywords, split on commas
    pub keywords: Vec<String>,
    /// Meta author
    pub author: String,
    /// When the page was captured
    pub scraped_at: Option<DateTime<Utc>>,
}

/// Prepends a `---` delimited front matter block to `content`
///
/// Keys are written in a fixed order (`url`, `title`, `description`,
/// `keywords`, `author`, `scraped_at`) and empty values are left out. Scalars
/// are double-quoted; lists become indented `- item` lines.
///
/// # Examples
///
/// ```
/// use sumi_scribe::markdown::{add_front_matter, PageMetadata};
///
/// let metadata = PageMetadata {
///     title: "Intro".to_string(),
///     ..Default::default()
/// };
/// let page = add_front_matter("body text", &metadata);
/// assert_eq!(page, "---\ntitle: \"Intro\"\n---\nbody text");
/// ```
pub fn add_front_matter(content: &str, metadata: &PageMetadata) -> String {
    let mut block = String::from("---\n");

    push_scalar(&mut block, "url", &metadata.url);
    push_scalar(&mut block, "title", &metadata.title);
    push_scalar(&mut block, "description", &metadata.description);

    let keywords: Vec<&str> = metadata
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    if !keywords.is_empty() {
        block.push_str("keywords:\n");
        for keyword in keywords {
            block.push_str("  - ");
            block.push_str(&quote(keyword));
            block.push('\n');
        }
    }

    push_scalar(&mut block, "author", &metadata.author);
    if let Some(scraped_at) = metadata.scraped_at {
        push_scalar(
            &mut block,
            "scraped_at",
            &scraped_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }

    block.push_str("---\n");
    block.push_str(content);
    block
}

fn push_scalar(block: &mut String, key: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    block.push_str(key);
    block.push_str(": ");
    block.push_str(&quote(value));
    block.push('\n');
}

/// Double-quotes a value, escaping backslashes and quotes and folding newlines
fn quote(value: &str) -> String {
    let folded = value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("\"{}\"", folded.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Splits a page into its front matter block and body
///
/// The returned block includes both `---` delimiter lines. Content that does
/// not start with a complete block has no front matter.
///
/// # Examples
///
/// ```
/// use sumi_scribe::markdown::split_front_matter;
///
/// let (front, body) = split_front_matter("---\ntitle: \"A\"\n---\n# Body\n");
/// assert_eq!(front, Some("---\ntitle: \"A\"\n---\n"));
/// assert_eq!(body, "# Body\n");
/// ```
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---\n") else {
        return (None, content);
    };

    let mut offset = 4;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return (Some(&content[..offset]), &content[offset..]);
        }
    }

    (None, content)
}
