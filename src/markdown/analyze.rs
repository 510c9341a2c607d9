use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static RE_PADDED_LINK: OnceLock<Regex> = OnceLock::new();
static RE_EMPTY_LINK: OnceLock<Regex> = OnceLock::new();
static RE_SPACED_TARGET: OnceLock<Regex> = OnceLock::new();
static RE_HEADING_NO_SPACE: OnceLock<Regex> = OnceLock::new();
static RE_HEADING_MULTI_SPACE: OnceLock<Regex> = OnceLock::new();

/// Kinds of formatting problems found in a Markdown file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueKind {
    PaddedLinkText,
    EmptyLink,
    SpaceInLinkTarget,
    HeadingWithoutSpace,
    HeadingWithExtraSpaces,
    ExcessiveBlankLines,
    TrailingWhitespace,
    MixedIndentation,
    BrokenTableRow,
    UnescapedHtmlCharacter,
}

impl IssueKind {
    pub fn description(&self) -> &'static str {
        match self {
            Self::PaddedLinkText => "link text padded with spaces",
            Self::EmptyLink => "empty link",
            Self::SpaceInLinkTarget => "link target contains spaces",
            Self::HeadingWithoutSpace => "heading without a space after #",
            Self::HeadingWithExtraSpaces => "heading with several spaces after #",
            Self::ExcessiveBlankLines => "three or more consecutive blank lines",
            Self::TrailingWhitespace => "trailing whitespace",
            Self::MixedIndentation => "tabs mixed with space indentation",
            Self::BrokenTableRow => "table row with a single pipe",
            Self::UnescapedHtmlCharacter => "unescaped <, > or &",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One formatting problem, located by its first occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownIssue {
    pub kind: IssueKind,
    /// 1-based line of the first occurrence
    pub line: usize,
}

impl fmt::Display for MarkdownIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// Reports formatting problems in a Markdown document
///
/// Each kind of problem is reported once, at its first line. Fenced code
/// blocks are not inspected except for whitespace problems.
///
/// # Examples
///
/// ```
/// use sumi_scribe::markdown::{analyze_markdown, IssueKind};
///
/// let issues = analyze_markdown("#Title\n\nSee [ here ](/a)\n");
/// let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
/// assert_eq!(kinds, vec![IssueKind::HeadingWithoutSpace, IssueKind::PaddedLinkText]);
/// ```
pub fn analyze_markdown(content: &str) -> Vec<MarkdownIssue> {
    let padded_link =
        RE_PADDED_LINK.get_or_init(|| Regex::new(r"\[\s+[^\]]+?\s*\]|\[[^\]]+?\s+\]").expect("valid regex"));
    let empty_link =
        RE_EMPTY_LINK.get_or_init(|| Regex::new(r"\[\s*\]\s*\(\s*\)").expect("valid regex"));
    let spaced_target = RE_SPACED_TARGET
        .get_or_init(|| Regex::new(r#"\]\(\s*[^)\s]+\s+[^)\s"'][^)]*\)"#).expect("valid regex"));
    let heading_no_space =
        RE_HEADING_NO_SPACE.get_or_init(|| Regex::new(r"^#{1,6}[^\s#]").expect("valid regex"));
    let heading_multi_space =
        RE_HEADING_MULTI_SPACE.get_or_init(|| Regex::new(r"^#{1,6}[ \t]{2,}").expect("valid regex"));

    let mut issues: Vec<MarkdownIssue> = Vec::new();
    let mut report = |kind: IssueKind, line: usize| {
        if !issues.iter().any(|issue| issue.kind == kind) {
            issues.push(MarkdownIssue { kind, line });
        }
    };

    let mut in_fence = false;
    let mut blank_run = 0;
    let mut tab_indent = false;
    let mut space_indent = false;

    for (index, line) in content.lines().enumerate() {
        let number = index + 1;

        if line.ends_with(' ') || line.ends_with('\t') {
            report(IssueKind::TrailingWhitespace, number);
        }

        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == 3 {
                report(IssueKind::ExcessiveBlankLines, number);
            }
        } else {
            blank_run = 0;
        }

        if line.starts_with('\t') {
            tab_indent = true;
        } else if line.starts_with("    ") {
            space_indent = true;
        }
        if tab_indent && space_indent {
            report(IssueKind::MixedIndentation, number);
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if padded_link.is_match(line) {
            report(IssueKind::PaddedLinkText, number);
        }
        if empty_link.is_match(line) {
            report(IssueKind::EmptyLink, number);
        }
        if spaced_target.is_match(line) {
            report(IssueKind::SpaceInLinkTarget, number);
        }
        if heading_no_space.is_match(line) {
            report(IssueKind::HeadingWithoutSpace, number);
        }
        if heading_multi_space.is_match(line) {
            report(IssueKind::HeadingWithExtraSpaces, number);
        }
        if line.matches('|').count() == 1 {
            report(IssueKind::BrokenTableRow, number);
        }
        if has_unescaped_html(line) {
            report(IssueKind::UnescapedHtmlCharacter, number);
        }
    }

    issues
}

/// Finds `<`, `>` or `&` that is not part of an entity, a blockquote marker or inline code
fn has_unescaped_html(line: &str) -> bool {
    let body = line.trim_start_matches(|c: char| c == '>' || c == ' ');
    let mut in_code = false;

    for (index, c) in body.char_indices() {
        match c {
            '`' => in_code = !in_code,
            _ if in_code => {}
            '<' | '>' => return true,
            '&' => {
                let rest = &body[index + 1..];
                let name_len = rest
                    .find(|c: char| !c.is_ascii_alphanumeric() && c != '#')
                    .unwrap_or(rest.len());
                if name_len == 0 || !rest[name_len..].starts_with(';') {
                    return true;
                }
            }
            _ => {}
        }
    }

    false
}
