use std::sync::LazyLock;

use regex::Regex;

static PAGE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[-\s]*(?:page|صفحة|الصفحة)?\s*[0-9٠-٩]+(?:\s*(?:/|of|من)\s*[0-9٠-٩]+)?[-\s]*$")
        .expect("valid regex")
});

static INLINE_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("valid regex"));

/// Clean raw PDF text before it reaches the criteria detector and analyzer.
///
/// Drops decorative separators and bare page numbers, re-joins Arabic words
/// that the encoder split into single letters, collapses whitespace runs and
/// keeps at most one blank line between paragraphs.
pub fn clean_extracted_text(raw: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for line in raw.lines() {
        let line = line.replace('\u{0}', "");
        let collapsed = INLINE_WS_RE.replace_all(line.trim(), " ");

        if collapsed.is_empty() {
            if !previous_blank {
                out.push(String::new());
                previous_blank = true;
            }
            continue;
        }
        if is_decorative_line(&collapsed) || PAGE_NUMBER_RE.is_match(&collapsed) {
            continue;
        }

        out.push(join_split_arabic_letters(&collapsed));
        previous_blank = false;
    }

    out.join("\n").trim().to_string()
}

/// A line made only of separator glyphs such as `-----`, `=====` or `• • •`.
fn is_decorative_line(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || matches!(c, '-' | '=' | '_' | '*' | '~' | '•' | '.' | '·' | '─' | '━'))
}

pub(crate) fn is_arabic_letter(c: char) -> bool {
    matches!(c, '\u{0621}'..='\u{064A}' | '\u{0671}'..='\u{06D3}')
}

/// Merge runs of two or more single-letter Arabic tokens: `ش ر ك ة` → `شركة`.
fn join_split_arabic_letters(line: &str) -> String {
    let tokens: Vec<&str> = line.split(' ').collect();
    let is_single_letter = |t: &str| {
        let mut chars = t.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if is_arabic_letter(c))
    };

    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let mut j = i;
        while j < tokens.len() && is_single_letter(tokens[j]) {
            j += 1;
        }
        if j - i >= 2 {
            out.push(tokens[i..j].concat());
            i = j;
        } else {
            out.push(tokens[i].to_string());
            i += 1;
        }
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_decorative_separators() {
        let raw = "Section 1\n-----------\n=====\n• • •\nBody text";
        assert_eq!(clean_extracted_text(raw), "Section 1\nBody text");
    }

    #[test]
    fn drops_page_number_lines() {
        let raw = "First page text\n3\n- 4 -\nPage 5\nصفحة ٦\n7 / 20\nNext page text";
        assert_eq!(clean_extracted_text(raw), "First page text\nNext page text");
    }

    #[test]
    fn keeps_numbers_inside_sentences() {
        let raw = "1. القيمة المالية 40%";
        assert_eq!(clean_extracted_text(raw), "1. القيمة المالية 40%");
    }

    #[test]
    fn collapses_inline_whitespace() {
        assert_eq!(clean_extracted_text("a  \t  b\u{00A0}\u{00A0}c"), "a b c");
    }

    #[test]
    fn collapses_blank_line_runs() {
        let raw = "\n\npara one\n\n\n\n  \npara two\n\n";
        assert_eq!(clean_extracted_text(raw), "para one\n\npara two");
    }

    #[test]
    fn joins_split_arabic_letters() {
        assert_eq!(clean_extracted_text("عرض ش ر ك ة النور"), "عرض شركة النور");
    }

    #[test]
    fn single_arabic_letter_word_is_kept() {
        // "و" as a standalone conjunction must not be glued to neighbours.
        assert_eq!(clean_extracted_text("الخبرة و الجودة"), "الخبرة و الجودة");
    }

    #[test]
    fn strips_null_bytes() {
        assert_eq!(clean_extracted_text("abc\u{0}def"), "abcdef");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_extracted_text(""), "");
        assert_eq!(clean_extracted_text("\n---\n12\n"), "");
    }
}
