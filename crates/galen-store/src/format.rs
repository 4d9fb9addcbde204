//! Text extraction per document format
//!
//! Byte-level PDF/HTML decoding is out of scope; each extractor receives
//! already-decoded text and reduces it to clean prose with markdown-style
//! headings so a single heading parser can handle every format.

use galen_domain::DocumentFormat;
use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(?:script|style)\s*>").expect("Invalid regex")
});
static HTML_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>").expect("Invalid regex")
});
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:br\s*/?|/?(?:p|div|li|ul|ol|tr|table|section|article|blockquote|para)\b[^>]*)>")
        .expect("Invalid regex")
});
static XML_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("Invalid regex")
});
static XML_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<heading\b[^>]*>(.*?)</heading\s*>").expect("Invalid regex")
});
static XML_PROLOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<\?.*?\?>|<!--.*?-->|<!DOCTYPE[^>]*>").expect("Invalid regex")
});
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("Invalid regex"));
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("Invalid regex"));
static HYPHENATED_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])-\n([a-z])").expect("Invalid regex"));

/// Extract clean text from raw source text of the given format
pub fn extract_text(format: DocumentFormat, raw: &str) -> String {
    let raw = raw.replace("\r\n", "\n").replace('\r', "\n");
    match format {
        DocumentFormat::PlainText => raw.trim().to_string(),
        DocumentFormat::Html => extract_html(&raw),
        DocumentFormat::PdfText => clean_pdf_text(&raw),
        DocumentFormat::Xml => extract_xml(&raw),
    }
}

fn extract_html(raw: &str) -> String {
    let text = SCRIPT_STYLE.replace_all(raw, "");
    let text = HTML_HEADING.replace_all(&text, |caps: &regex::Captures| {
        let level: usize = caps[1].parse().unwrap_or(1);
        let title = collapse_inline(&ANY_TAG.replace_all(&caps[2], ""));
        format!("\n{} {}\n", "#".repeat(level), decode_entities(&title))
    });
    let text = BLOCK_BREAK.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    normalize_lines(&decode_entities(&text))
}

fn extract_xml(raw: &str) -> String {
    let text = XML_PROLOG.replace_all(raw, "");
    let text = XML_TITLE.replace_all(&text, |caps: &regex::Captures| {
        format!("\n# {}\n", collapse_inline(&ANY_TAG.replace_all(&caps[1], "")))
    });
    let text = XML_HEADING.replace_all(&text, |caps: &regex::Captures| {
        format!("\n## {}\n", collapse_inline(&ANY_TAG.replace_all(&caps[1], "")))
    });
    let text = BLOCK_BREAK.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "\n");
    normalize_lines(&decode_entities(&text))
}

/// Normalise extracted PDF text while keeping its line structure
///
/// Form feeds become line breaks, words split across a line break with a
/// hyphen are rejoined, and runs of spaces collapse to one.
fn clean_pdf_text(raw: &str) -> String {
    let text = raw.replace('\x0c', "\n");
    let text = HYPHENATED_BREAK.replace_all(&text, "$1$2");
    normalize_lines(&text)
}

/// Collapse intra-line whitespace, drop trailing spaces, and squeeze blank
/// line runs down to a single blank line
fn normalize_lines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let line = collapse_inline(line);
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(&line);
        result.push('\n');
    }

    result.trim().to_string()
}

fn collapse_inline(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    let text = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&ge;", "≥")
        .replace("&le;", "≤")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_headings_become_markdown() {
        let html = "<html><head><style>p{}</style></head><body>\
                    <h1>Diabetes</h1><p>Use <b>metformin</b> first.</p>\
                    <h2 class=\"x\">Monitoring</h2><p>HbA1c &ge; 7&#37; &amp; rising</p></body></html>";
        let text = extract_text(DocumentFormat::Html, html);
        assert!(text.starts_with("# Diabetes"));
        assert!(text.contains("Use metformin first."));
        assert!(text.contains("## Monitoring"));
        assert!(text.contains("HbA1c ≥ 7% & rising"));
        assert!(!text.contains("p{}"));
    }

    #[test]
    fn test_xml_title_and_heading() {
        let xml = "<?xml version=\"1.0\"?><guideline><title>Asthma</title>\
                   <heading>Treatment</heading><para>Inhaled corticosteroids.</para></guideline>";
        let text = extract_text(DocumentFormat::Xml, xml);
        assert!(text.starts_with("# Asthma"));
        assert!(text.contains("## Treatment"));
        assert!(text.contains("Inhaled corticosteroids."));
        assert!(!text.contains("<?xml"));
    }

    #[test]
    fn test_pdf_text_keeps_lines() {
        let pdf = "1. Introduction\n\nThis  guideline   covers\nhyper-\ntension.\x0c2. Scope";
        let text = extract_text(DocumentFormat::PdfText, pdf);
        assert_eq!(
            text,
            "1. Introduction\n\nThis guideline covers\nhypertension.\n2. Scope"
        );
    }

    #[test]
    fn test_plain_text_normalizes_line_endings() {
        let text = extract_text(DocumentFormat::PlainText, "a\r\nb\r\n");
        assert_eq!(text, "a\nb");
    }

    #[test]
    fn test_blank_html_extracts_nothing() {
        let text = extract_text(DocumentFormat::Html, "<html><body>  </body></html>");
        assert!(text.is_empty());
    }
}
