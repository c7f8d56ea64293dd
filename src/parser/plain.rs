//! Heuristic formatter for raw extracted text.
//!
//! Text pulled out of PDFs without layout information still carries a few
//! usable signals: short ALL-CAPS lines are almost always section titles and
//! dash/star lines are list items. Everything else is kept as paragraphs.

/// Lines with this many words or more are never promoted to headings.
const MAX_HEADING_WORDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Heading,
    ListItem,
    Text,
}

/// Format raw text as Markdown.
///
/// The result always ends with a single newline, or is empty when the input
/// has no non-blank line.
pub fn format_plain_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    let mut prev: Option<LineKind> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let kind = classify(line);

        if let Some(prev) = prev {
            if prev == LineKind::ListItem && kind == LineKind::ListItem {
                out.push('\n');
            } else {
                out.push_str("\n\n");
            }
        }

        if kind == LineKind::Heading {
            out.push_str("## ");
        }
        out.push_str(line);
        prev = Some(kind);
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn classify(line: &str) -> LineKind {
    if line.starts_with("- ") || line.starts_with("* ") {
        LineKind::ListItem
    } else if is_heading_line(line) {
        LineKind::Heading
    } else {
        LineKind::Text
    }
}

/// An upper-case line: some cased letter, nothing lowercase, and short.
fn is_heading_line(line: &str) -> bool {
    let has_upper = line.chars().any(char::is_uppercase);
    let has_lower = line.chars().any(char::is_lowercase);
    has_upper && !has_lower && line.split_whitespace().count() < MAX_HEADING_WORDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_heading_and_list() {
        let input = "HELLO WORLD\n\nsome body text\n\n- item one\n- item two\n";
        assert_eq!(
            format_plain_text(input),
            "## HELLO WORLD\n\nsome body text\n\n- item one\n- item two\n"
        );
    }

    #[test]
    fn test_long_caps_line_is_not_heading() {
        let input = "ONE TWO THREE FOUR FIVE SIX SEVEN EIGHT NINE TEN";
        assert_eq!(format_plain_text(input), format!("{}\n", input));
    }

    #[test]
    fn test_digits_only_line_is_not_heading() {
        assert_eq!(format_plain_text("2024"), "2024\n");
    }

    #[test]
    fn test_caps_with_punctuation_is_heading() {
        assert_eq!(format_plain_text("PART 1: SETUP"), "## PART 1: SETUP\n");
    }

    #[test]
    fn test_blank_lines_dropped() {
        assert_eq!(format_plain_text("a\n\n\n\nb"), "a\n\nb\n");
        assert_eq!(format_plain_text("\n  \n"), "");
    }

    #[test]
    fn test_list_after_text_gets_blank_line() {
        assert_eq!(format_plain_text("intro\n* x\n* y"), "intro\n\n* x\n* y\n");
    }
}
