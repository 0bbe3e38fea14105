use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \x{00A0}]+").expect("regex"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("regex"));

/// Canonical whitespace cleanup applied to every extracted text, whatever
/// its source. Carriage returns and tabs become spaces, runs of spaces and
/// non-breaking spaces collapse to one, and three or more consecutive
/// newlines collapse to a paragraph break.
pub fn clean_text(input: &str) -> String {
    let replaced = input.replace(['\r', '\t'], " ");
    let collapsed = SPACE_RUNS.replace_all(&replaced, " ");
    let collapsed = BLANK_RUNS.replace_all(&collapsed, "\n\n");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_horizontal_whitespace() {
        assert_eq!(clean_text("a  \t b\u{00A0}\u{00A0}c"), "a b c");
    }

    #[test]
    fn collapses_blank_line_runs_to_one_break() {
        assert_eq!(clean_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn trims_and_normalizes_carriage_returns() {
        assert_eq!(clean_text("  line one\r\nline two  "), "line one \nline two");
    }
}
