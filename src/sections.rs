use once_cell::sync::Lazy;
use regex::Regex;

use crate::textclass::word_count;

/// Section headings that close an abstract: keywords, introduction, or a
/// numbered first section. An arabic "1. Results" must follow whitespace so
/// "2.1. Methods" does not close the abstract; a roman "I. BACKGROUND" must
/// open a line so "type I. The" in running text does not either.
const SECTION_HEADING: &str =
    r"(?:\b(?:key\s*words?|introduction)|(?-i:(?:\A|\s)1\.\s+[A-Z]|(?m:^)[ \t]*I\.\s+[A-Z]))";

/// "Abstract" label, tolerating spaces or punctuation between its letters
/// ("A B S T R A C T", "Ab-stract"), then an optional colon or dash.
static EXPLICIT_ABSTRACT_RE: Lazy<Regex> = Lazy::new(|| {
    let sep = r"[\s\p{P}]*";
    let label = ["a", "b", "s", "t", "r", "a", "c", "t"].join(sep);
    Regex::new(&format!(
        r"(?is)\b{label}\b\s*[:\-\u{{2013}}\u{{2014}}]?\s*(.*?){SECTION_HEADING}"
    ))
    .unwrap()
});

/// Everything from the start of the text to the first section heading.
static IMPLICIT_ABSTRACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?is)\A(.*?){SECTION_HEADING}")).unwrap());

/// Leading segments of an implicit span assumed to be title and authors.
const METADATA_SEGMENTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    ExplicitLabel,
    ImplicitBoundary,
    LargestParagraph,
}

/// Abstract and body taken from the same boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSplit {
    pub abstract_text: String,
    pub full_text: String,
    pub strategy: SplitStrategy,
}

type StrategyFn = fn(&str, usize) -> Option<(String, String)>;

/// Tried in order; the first strategy that finds a boundary wins.
const STRATEGIES: [(SplitStrategy, StrategyFn); 3] = [
    (SplitStrategy::ExplicitLabel, split_explicit_label),
    (SplitStrategy::ImplicitBoundary, split_implicit_boundary),
    (SplitStrategy::LargestParagraph, split_largest_paragraph),
];

/// Split collapsed document text into abstract and full body.
///
/// `None` means no strategy located an abstract; the document is
/// unparseable for this purpose, which is not an error.
pub fn split_sections(text: &str, min_paragraph_words: usize) -> Option<SectionSplit> {
    STRATEGIES.iter().find_map(|&(strategy, split)| {
        let (abstract_text, full_text) = split(text, min_paragraph_words)?;
        Some(SectionSplit { abstract_text, full_text, strategy })
    })
}

fn split_explicit_label(text: &str, _min_words: usize) -> Option<(String, String)> {
    let caps = EXPLICIT_ABSTRACT_RE.captures(text)?;
    let body = caps.get(1)?;
    let abstract_text = body.as_str().trim();
    if abstract_text.is_empty() {
        return None;
    }
    Some((abstract_text.to_string(), text[body.end()..].trim().to_string()))
}

fn split_implicit_boundary(text: &str, _min_words: usize) -> Option<(String, String)> {
    let caps = IMPLICIT_ABSTRACT_RE.captures(text)?;
    let span = caps.get(1)?;
    let segments: Vec<&str> = span.as_str().split('\n').collect();
    if segments.len() <= METADATA_SEGMENTS {
        return None;
    }
    let abstract_text = segments[METADATA_SEGMENTS..].join("\n");
    let abstract_text = abstract_text.trim();
    if abstract_text.is_empty() {
        return None;
    }
    Some((abstract_text.to_string(), text[span.end()..].trim().to_string()))
}

fn split_largest_paragraph(text: &str, min_words: usize) -> Option<(String, String)> {
    let mut offset = 0;
    for paragraph in text.split('\n') {
        let end = offset + paragraph.len();
        if word_count(paragraph) > min_words {
            return Some((paragraph.trim().to_string(), text[end..].trim().to_string()));
        }
        offset = end + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_paragraph(words: usize) -> String {
        (0..words).map(|i| format!("token{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn explicit_label_stops_at_keywords() {
        let text = "Palladium complexes\nAbstract: The rational design of palladium cations \
                    was evaluated in HepG2.\nKeywords: palladium; cytotoxicity\n1. Introduction\nMetals";
        let split = split_sections(text, 100).unwrap();
        assert_eq!(split.strategy, SplitStrategy::ExplicitLabel);
        assert_eq!(
            split.abstract_text,
            "The rational design of palladium cations was evaluated in HepG2."
        );
        assert!(split.full_text.starts_with("Keywords: palladium"));
        assert!(split.full_text.ends_with("Metals"));
    }

    #[test]
    fn explicit_label_tolerates_spaced_letters_and_dash() {
        let text = "A B S T R A C T - Thioacetamide injures the liver. Introduction Rats were dosed.";
        let split = split_sections(text, 100).unwrap();
        assert_eq!(split.abstract_text, "Thioacetamide injures the liver.");
        assert_eq!(split.full_text, "Introduction Rats were dosed.");
    }

    #[test]
    fn explicit_label_stops_at_numbered_section() {
        let text = "ABSTRACT CCl4 causes fibrosis. 1. Background and aims follow.";
        let split = split_sections(text, 100).unwrap();
        assert_eq!(split.abstract_text, "CCl4 causes fibrosis.");
        assert_eq!(split.full_text, "1. Background and aims follow.");
    }

    #[test]
    fn subsection_numbers_and_inline_roman_numerals_do_not_close_the_abstract() {
        let text = "Abstract: Collagen type I. The 2.1. Methods were standard. \
                    1. Background follows.";
        let split = split_sections(text, 100).unwrap();
        assert_eq!(
            split.abstract_text,
            "Collagen type I. The 2.1. Methods were standard."
        );
        assert_eq!(split.full_text, "1. Background follows.");
    }

    #[test]
    fn roman_section_at_line_start_closes_the_abstract() {
        let text = "Abstract: Fibrosis was scored.\nI. BACKGROUND\nRats.";
        let split = split_sections(text, 100).unwrap();
        assert_eq!(split.abstract_text, "Fibrosis was scored.");
        assert_eq!(split.full_text, "I. BACKGROUND\nRats.");
    }

    #[test]
    fn label_inside_a_longer_word_is_ignored() {
        let text = "Title\nAuthors\nAbstraction of data is hard.\nIntroduction\nBody.";
        let split = split_sections(text, 100).unwrap();
        assert_eq!(split.strategy, SplitStrategy::ImplicitBoundary);
        assert_eq!(split.abstract_text, "Abstraction of data is hard.");
    }

    #[test]
    fn implicit_boundary_drops_title_and_authors() {
        let text = "Hepatotoxicity of TAA\nJ. Smith, A. Jones\nThioacetamide causes liver injury.\n\
                    It is widely used.\nIntroduction\nLiver disease is common.";
        let split = split_sections(text, 100).unwrap();
        assert_eq!(split.strategy, SplitStrategy::ImplicitBoundary);
        assert_eq!(
            split.abstract_text,
            "Thioacetamide causes liver injury.\nIt is widely used."
        );
        assert_eq!(split.full_text, "Introduction\nLiver disease is common.");
    }

    #[test]
    fn implicit_boundary_needs_content_after_metadata() {
        let text = "Short title\nAuthors only\nIntroduction\nBody text.";
        assert_eq!(split_implicit_boundary(text, 100), None);
        assert_eq!(split_sections(text, 100), None);
    }

    #[test]
    fn largest_paragraph_fallback() {
        let paragraph = long_paragraph(150);
        let text = format!("A short title\nSome authors\n{paragraph}\nShort tail line.\nMore.");
        let split = split_sections(&text, 100).unwrap();
        assert_eq!(split.strategy, SplitStrategy::LargestParagraph);
        assert_eq!(split.abstract_text, paragraph);
        assert_eq!(split.full_text, "Short tail line.\nMore.");
    }

    #[test]
    fn fallback_paragraph_at_end_leaves_empty_body() {
        let paragraph = long_paragraph(120);
        let text = format!("title\n{paragraph}");
        let split = split_sections(&text, 100).unwrap();
        assert_eq!(split.full_text, "");
    }

    #[test]
    fn paragraph_of_exactly_threshold_words_does_not_qualify() {
        let text = format!("title\n{}", long_paragraph(100));
        assert_eq!(split_sections(&text, 100), None);
    }

    #[test]
    fn unparseable_text_yields_none() {
        assert_eq!(split_sections("", 100), None);
        assert_eq!(split_sections("Just a title\nand a line.", 100), None);
    }

    #[test]
    fn split_keeps_boundary_region() {
        let text = "Head\nAbstract: Alpha beta gamma.\nKeywords: delta\nEpsilon.";
        let split = split_sections(text, 100).unwrap();
        let a = text.find(&split.abstract_text).unwrap();
        let f = text.rfind(&split.full_text).unwrap();
        assert!(a + split.abstract_text.len() <= f);
        assert_eq!(&text[f..], split.full_text);
        let gap = &text[a + split.abstract_text.len()..f];
        assert!(gap.trim().is_empty());
    }

    #[test]
    fn splitting_is_idempotent() {
        let text = "Abstract: Stable result.\nIntroduction\nBody.";
        assert_eq!(split_sections(text, 100), split_sections(text, 100));
    }
}
