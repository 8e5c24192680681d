use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{BlockKind, LayoutBlock, TextBlock};

/// "Figure 2.", "Fig. 3:", "Table 1", "Scheme 4" at the start of a block.
static CAPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:fig(?:ure)?\.?|table|scheme)\s*[A-Z]?\d+\b").unwrap()
});

/// Numeric table cell: "12", "3.5", "-0.04", "12.1%", "±2.3".
static NUMERIC_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[±+\-−]?\d+(?:[.,]\d+)?%?$").unwrap());

/// Tag every layout block on a page and turn it into a `TextBlock`.
pub fn tag_page(blocks: &[LayoutBlock], page_idx: usize, page_height: f32) -> Vec<TextBlock> {
    blocks
        .iter()
        .map(|block| TextBlock::new(block.text(), classify_block(block, page_height), page_idx))
        .collect()
}

fn classify_block(block: &LayoutBlock, page_height: f32) -> BlockKind {
    let text = block.text();
    let relative_y = block.y / page_height;
    let block_bottom = (block.y - block.height) / page_height;

    // Header: top ~5%
    if relative_y > 0.95 {
        return BlockKind::Header;
    }

    // Page number: bottom ~3%, only digits
    if block_bottom < 0.03 && is_page_number(&text) {
        return BlockKind::PageNumber;
    }

    if is_caption_text(&text) {
        return BlockKind::Caption;
    }
    if is_table_like(&text) {
        return BlockKind::Table;
    }
    BlockKind::Text
}

fn is_page_number(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit() || c == '-')
}

pub fn is_caption_text(text: &str) -> bool {
    CAPTION_RE.is_match(text)
}

/// Three or more lines where at least half of the cells are numbers.
fn is_table_like(text: &str) -> bool {
    if text.lines().count() < 3 {
        return false;
    }
    let cells: Vec<&str> = text.split_whitespace().collect();
    let numeric = cells.iter().filter(|c| NUMERIC_CELL_RE.is_match(c)).count();
    numeric * 2 >= cells.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Line, Word};

    fn block_at(lines: &[&str], y: f32) -> LayoutBlock {
        let lines: Vec<Line> = lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let y = y - i as f32 * 12.0;
                let words = text
                    .split_whitespace()
                    .enumerate()
                    .map(|(j, w)| Word {
                        text: w.to_string(),
                        x: 72.0 + j as f32 * 30.0,
                        y,
                        width: 25.0,
                        font_size: 10.0,
                    })
                    .collect();
                Line { words, y, x_start: 72.0, x_end: 500.0, font_size: 10.0 }
            })
            .collect();
        let height = lines.len() as f32 * 12.0;
        LayoutBlock { lines, x: 72.0, y, width: 428.0, height, font_size: 10.0 }
    }

    #[test]
    fn running_header_and_folio() {
        let header = block_at(&["Toxicology Letters 312 (2019) 1-10"], 770.0);
        assert_eq!(classify_block(&header, 792.0), BlockKind::Header);
        let folio = block_at(&["7"], 20.0);
        assert_eq!(classify_block(&folio, 792.0), BlockKind::PageNumber);
    }

    #[test]
    fn caption_and_body() {
        let caption = block_at(&["Fig. 3. Hepatic necrosis", "after TAA exposure."], 400.0);
        assert_eq!(classify_block(&caption, 792.0), BlockKind::Caption);
        let body = block_at(&["The liver was excised", "and weighed."], 400.0);
        assert_eq!(classify_block(&body, 792.0), BlockKind::Text);
    }

    #[test]
    fn numeric_grid_is_a_table() {
        let table = block_at(&["Dose ALT AST", "0 35.2 41.0", "50 88.1 120.4", "100 140.9 ±12.3"], 300.0);
        assert_eq!(classify_block(&table, 792.0), BlockKind::Table);
    }

    #[test]
    fn tag_page_keeps_line_breaks() {
        let blocks = vec![block_at(&["first line", "second line"], 400.0)];
        let tagged = tag_page(&blocks, 2, 792.0);
        assert_eq!(tagged[0].text, "first line\nsecond line");
        assert_eq!(tagged[0].page_idx, 2);
    }

    #[test]
    fn caption_prefixes() {
        assert!(is_caption_text("Figure 1. Overview"));
        assert!(is_caption_text("TABLE 2 Serum markers"));
        assert!(is_caption_text("Figure S4 Supplementary"));
        assert!(!is_caption_text("The figure shows"));
    }
}
