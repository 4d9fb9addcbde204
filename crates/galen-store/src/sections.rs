//! Heading detection and section tree construction

use galen_domain::{Section, Span};
use regex::Regex;
use std::sync::LazyLock;

static MARKDOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*$").expect("Invalid regex"));
static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.(?:\d+\.?)*)\s+(.+)$").expect("Invalid regex"));

const ALL_CAPS_MIN_LETTERS: usize = 3;
const ALL_CAPS_MAX_LEN: usize = 80;
const PREAMBLE_TITLE: &str = "Preamble";

/// Classify a single line as a heading, returning `(level, title)`
///
/// Recognised forms, in priority order:
/// - markdown `#` to `######` (level = number of hashes)
/// - numbered `1.`, `2.3`, `4.1.2` followed by a title that starts with an
///   uppercase letter and does not end with a period (level = number
///   components); decimal values such as `2.5 mg once daily` stay body text
/// - ALL-CAPS lines of at least three letters and at most 80 characters
///   (level 1)
pub fn detect_heading(line: &str) -> Option<(u8, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(caps) = MARKDOWN_HEADING.captures(line) {
        let level = caps[1].len() as u8;
        return Some((level, caps[2].trim().to_string()));
    }

    if let Some(caps) = NUMBERED_HEADING.captures(line) {
        let title = caps[2].trim();
        let capitalised = title.chars().next().is_some_and(char::is_uppercase);
        if capitalised && !title.ends_with('.') {
            let level = caps[1]
                .trim_end_matches('.')
                .split('.')
                .filter(|c| !c.is_empty())
                .count()
                .clamp(1, u8::MAX as usize) as u8;
            return Some((level, title.to_string()));
        }
        return None;
    }

    if is_all_caps_heading(line) {
        return Some((1, line.to_string()));
    }

    None
}

fn is_all_caps_heading(line: &str) -> bool {
    if line.chars().count() > ALL_CAPS_MAX_LEN {
        return false;
    }
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    letters >= ALL_CAPS_MIN_LETTERS && !line.chars().any(char::is_lowercase)
}

struct HeadingLine {
    start: usize,
    body_start: usize,
    level: u8,
    title: String,
}

/// Split extracted text into an ordered section tree
///
/// Nesting follows a stack discipline: a heading of level L closes every open
/// section of level ≥ L and becomes a child of the nearest open section with
/// a lower level. Text before the first heading becomes a level-1 "Preamble"
/// section that never parents later headings. Text with no headings at all
/// becomes a single root section titled `fallback_title`. Blank text yields
/// no sections.
pub fn build_sections(text: &str, fallback_title: &str) -> Vec<Section> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let headings = scan_headings(text);
    if headings.is_empty() {
        return vec![Section {
            id: section_id(1),
            title: fallback_title.to_string(),
            level: 1,
            span: Span::new(0, text.len()),
            parent_id: None,
            children: Vec::new(),
            body_start: 0,
            content: text.trim().to_string(),
        }];
    }

    let mut sections: Vec<Section> = Vec::with_capacity(headings.len() + 1);

    let preamble = &text[..headings[0].start];
    if !preamble.trim().is_empty() {
        sections.push(Section {
            id: section_id(1),
            title: PREAMBLE_TITLE.to_string(),
            level: 1,
            span: Span::new(0, headings[0].start),
            parent_id: None,
            children: Vec::new(),
            body_start: 0,
            content: preamble.trim().to_string(),
        });
    }

    let mut stack: Vec<usize> = Vec::new();
    for (i, heading) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map_or(text.len(), |h| h.start);

        while let Some(&top) = stack.last() {
            if sections[top].level < heading.level {
                break;
            }
            sections[top].span.end = heading.start;
            stack.pop();
        }

        let index = sections.len();
        let id = section_id(index + 1);
        let parent_id = stack.last().map(|&p| {
            sections[p].children.push(id.clone());
            sections[p].id.clone()
        });

        sections.push(Section {
            id,
            title: heading.title.clone(),
            level: heading.level,
            span: Span::new(heading.start, text.len()),
            parent_id,
            children: Vec::new(),
            body_start: heading.body_start,
            content: text[heading.body_start..body_end].trim().to_string(),
        });
        stack.push(index);
    }

    sections
}

fn scan_headings(text: &str) -> Vec<HeadingLine> {
    let mut headings = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if let Some((level, title)) = detect_heading(line) {
            headings.push(HeadingLine {
                start: offset,
                body_start: offset + line.len(),
                level,
                title,
            });
        }
        offset += line.len();
    }
    headings
}

fn section_id(n: usize) -> String {
    format!("s{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detect_markdown_heading() {
        assert_eq!(detect_heading("## Monitoring ##"), Some((2, "Monitoring".to_string())));
        assert_eq!(detect_heading("#NoSpace"), None);
    }

    #[test]
    fn test_detect_numbered_heading() {
        assert_eq!(detect_heading("1. Introduction"), Some((1, "Introduction".to_string())));
        assert_eq!(detect_heading("2.3 Drug therapy"), Some((2, "Drug therapy".to_string())));
        assert_eq!(detect_heading("4.1.2. Dosing"), Some((3, "Dosing".to_string())));
        // Sentences and numeric values are body text
        assert_eq!(detect_heading("1. Start metformin at diagnosis."), None);
        assert_eq!(detect_heading("6.5% or above"), None);
        assert_eq!(detect_heading("3. 500 mg twice daily"), None);
        assert_eq!(detect_heading("2.5 mg once daily"), None);
        assert_eq!(detect_heading("1.5 times the upper limit of normal"), None);
    }

    #[test]
    fn test_dose_lines_stay_in_their_section() {
        let text = "# Hypertension\n## Step 1\nOffer ramipril.\n2.5 mg once daily\nThen review.\n";
        let sections = build_sections(text, "doc");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].title, "Step 1");
        assert_eq!(sections[1].content, "Offer ramipril.\n2.5 mg once daily\nThen review.");
    }

    #[test]
    fn test_body_start_follows_heading_line() {
        let text = "Intro.\n# Metformin\nMetformin first.\n";
        let sections = build_sections(text, "doc");
        assert_eq!(sections[0].body_start, 0);
        assert_eq!(sections[1].body_start, "Intro.\n# Metformin\n".len());
        assert!(text[sections[1].body_start..].starts_with(&sections[1].content));
    }

    #[test]
    fn test_detect_all_caps_heading() {
        assert_eq!(detect_heading("RECOMMENDATIONS"), Some((1, "RECOMMENDATIONS".to_string())));
        assert_eq!(detect_heading("HbA1c"), None);
        assert_eq!(detect_heading("BP"), None);
    }

    #[test]
    fn test_nesting_by_level() {
        let text = "# A\nalpha\n## B\nbeta\n### C\ngamma\n## D\ndelta\n# E\nepsilon\n";
        let sections = build_sections(text, "doc");

        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3", "s4", "s5"]);

        assert_eq!(sections[0].children, vec!["s2", "s4"]);
        assert_eq!(sections[1].parent_id.as_deref(), Some("s1"));
        assert_eq!(sections[2].parent_id.as_deref(), Some("s2"));
        assert_eq!(sections[3].parent_id.as_deref(), Some("s1"));
        assert_eq!(sections[4].parent_id, None);

        // A's span covers its whole subtree, its content only its own body
        assert_eq!(&text[sections[0].span.start..sections[0].span.end], "# A\nalpha\n## B\nbeta\n### C\ngamma\n## D\ndelta\n");
        assert_eq!(sections[0].content, "alpha");
        assert_eq!(sections[2].content, "gamma");
    }

    #[test]
    fn test_preamble_section() {
        let text = "Published by NICE.\n\n## Scope\nAdults only.";
        let sections = build_sections(text, "doc");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Preamble");
        assert_eq!(sections[0].content, "Published by NICE.");
        assert_eq!(sections[1].parent_id, None);
    }

    #[test]
    fn test_no_headings_single_root() {
        let text = "Metformin is commonly used to treat type 2 diabetes mellitus.";
        let sections = build_sections(text, "Diabetes");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Diabetes");
        assert_eq!(sections[0].span, Span::new(0, text.len()));
        assert_eq!(sections[0].content, text);
    }

    #[test]
    fn test_blank_text_has_no_sections() {
        assert!(build_sections("  \n\n ", "doc").is_empty());
    }

    proptest! {
        #[test]
        fn prop_sections_are_well_formed(lines in prop::collection::vec(
            prop_oneof![
                "[a-z ]{0,30}",
                "#{1,4} [A-Za-z]{1,10}",
                "[1-3]\\.[1-3]? [A-Z][a-z]{2,8}",
            ],
            0..25,
        )) {
            let text = lines.join("\n");
            let sections = build_sections(&text, "doc");

            for (i, section) in sections.iter().enumerate() {
                prop_assert_eq!(&section.id, &format!("s{}", i + 1));
                prop_assert!(section.span.start <= section.span.end);
                prop_assert!(section.span.end <= text.len());
                prop_assert!(section.span.start <= section.body_start);
                prop_assert!(section.body_start <= section.span.end);
                if let Some(parent_id) = &section.parent_id {
                    let parent = sections.iter().find(|s| &s.id == parent_id).unwrap();
                    prop_assert!(parent.level < section.level);
                    prop_assert!(parent.span.start <= section.span.start);
                    prop_assert!(parent.span.end >= section.span.end);
                    prop_assert!(parent.children.contains(&section.id));
                }
            }
        }
    }
}
