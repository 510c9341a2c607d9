use regex::Regex;
use std::sync::OnceLock;

static RE_HEADING: OnceLock<Regex> = OnceLock::new();
static RE_LONE_BULLET: OnceLock<Regex> = OnceLock::new();
static RE_BULLET_SPACING: OnceLock<Regex> = OnceLock::new();
static RE_DOT_BULLET: OnceLock<Regex> = OnceLock::new();
static RE_INLINE_CODE: OnceLock<Regex> = OnceLock::new();
static RE_LINK: OnceLock<Regex> = OnceLock::new();
static RE_EMPTY_CELLS: OnceLock<Regex> = OnceLock::new();
static RE_BLANK_RUN: OnceLock<Regex> = OnceLock::new();

/// Fixes common HTML-to-Markdown conversion artifacts
///
/// # Passes
///
/// 1. Normalize line endings and strip trailing whitespace
/// 2. Outside fenced code blocks, line by line:
///    - `•` bullets become `* `, lone bullet markers are dropped and
///      `-   item` becomes `- item`
///    - `#Title` and `#   Title` become `# Title`
///    - padding inside inline code and link syntax is trimmed
///    - runs of empty table cells collapse to `| |`
/// 3. Collapse four or more newlines to three and trim blank lines at both ends
///
/// Cleaning is idempotent: cleaning cleaned text changes nothing.
///
/// # Examples
///
/// ```
/// use sumi_scribe::markdown::clean_markdown;
///
/// let cleaned = clean_markdown("#Title\n\nSee [ the docs ]( https://example.com ).  \n");
/// assert_eq!(cleaned, "# Title\n\nSee [the docs](https://example.com).");
/// assert_eq!(clean_markdown(&cleaned), cleaned);
/// ```
pub fn clean_markdown(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    let normalized = content.replace("\r\n", "\n");

    let mut lines = Vec::new();
    let mut in_fence = false;

    for line in normalized.split('\n') {
        let line = line.trim_end_matches([' ', '\t']);

        if is_fence(line) {
            in_fence = !in_fence;
            lines.push(line.to_string());
            continue;
        }

        if in_fence {
            lines.push(line.to_string());
            continue;
        }

        if let Some(fixed) = clean_line(line) {
            lines.push(fixed);
        }
    }

    let joined = lines.join("\n");
    let blank_run = RE_BLANK_RUN.get_or_init(|| Regex::new(r"\n{4,}").expect("valid regex"));
    let collapsed = blank_run.replace_all(&joined, "\n\n\n");

    collapsed.trim_matches('\n').to_string()
}

/// Cleans one line outside code fences; `None` drops the line
fn clean_line(line: &str) -> Option<String> {
    let dot_bullet = RE_DOT_BULLET.get_or_init(|| Regex::new(r"^(\s*)•[ \t]*").expect("valid regex"));
    let line = dot_bullet.replace(line, "$1* ");
    let line = line.trim_end_matches([' ', '\t']);

    let lone_bullet =
        RE_LONE_BULLET.get_or_init(|| Regex::new(r"^\s*[*+-][ \t]*$").expect("valid regex"));
    if lone_bullet.is_match(line) {
        return None;
    }

    let bullet_spacing = RE_BULLET_SPACING
        .get_or_init(|| Regex::new(r"^(\s*)([*+-])[ \t]{2,}(\S)").expect("valid regex"));
    let line = bullet_spacing.replace(line, "$1$2 $3");

    let heading = RE_HEADING
        .get_or_init(|| Regex::new(r"^( {0,3})(#{1,6})[ \t]*([^#\s].*)$").expect("valid regex"));
    let line = heading.replace(&line, "$1$2 $3");

    let inline_code = RE_INLINE_CODE
        .get_or_init(|| Regex::new(r"`[ \t]*([^`\n]*?[^`\s])[ \t]*`").expect("valid regex"));
    let line = inline_code.replace_all(&line, "`$1`");

    let link = RE_LINK.get_or_init(|| {
        Regex::new(r"\[[ \t]*([^\[\]\n]*?)[ \t]*\][ \t]*\([ \t]*([^()\s]+)[ \t]*\)")
            .expect("valid regex")
    });
    let line = link.replace_all(&line, "[$1]($2)");

    let empty_cells =
        RE_EMPTY_CELLS.get_or_init(|| Regex::new(r"\|(?:[ \t]*\|){2,}").expect("valid regex"));
    let line = empty_cells.replace_all(&line, "| |");

    Some(line.into_owned())
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}
