use crate::types::{NormalizedDocument, TextBlock};

/// Build both text views of a document from its page-ordered blocks.
///
/// Blocks whose trimmed text is empty, and header/folio blocks, are skipped.
/// In the collapsed view each block is whitespace-collapsed, blocks on a page
/// are joined by `\n` and pages are concatenated as-is. In the preserved view
/// blocks are only stripped of control characters and concatenated directly.
/// `block_lines` holds the collapsed blocks separated by `\n` across page
/// breaks too, so a block opening a page still starts a line.
pub fn normalize(pages: &[Vec<TextBlock>]) -> NormalizedDocument {
    let mut collapsed_text = String::new();
    let mut raw_preserved_text = String::new();
    let mut block_lines: Vec<String> = Vec::new();

    for blocks in pages {
        let page_blocks: Vec<&TextBlock> = blocks
            .iter()
            .filter(|b| b.kind.is_reading_text() && !b.text.trim().is_empty())
            .collect();

        let collapsed_blocks: Vec<String> =
            page_blocks.iter().map(|b| collapse_whitespace(&b.text)).collect();
        collapsed_text.push_str(&collapsed_blocks.join("\n"));
        block_lines.extend(collapsed_blocks);

        for block in &page_blocks {
            raw_preserved_text.push_str(&strip_control_chars(&block.text));
        }
    }

    NormalizedDocument {
        collapsed_text,
        raw_preserved_text,
        block_lines: block_lines.join("\n"),
    }
}

/// Replace every whitespace run with a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop C0 and C1 control characters, keeping tab and newline.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\t' || c == '\n' || !is_control_char(c))
        .collect()
}

fn is_control_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockKind;

    fn block(text: &str, page: usize) -> TextBlock {
        TextBlock::new(text, BlockKind::Text, page)
    }

    #[test]
    fn collapses_whitespace_and_joins_blocks_per_page() {
        let pages = vec![
            vec![block("Hello   \t world\n", 0), block("  second\n\nblock ", 0)],
            vec![block("next page", 1)],
        ];
        let doc = normalize(&pages);
        assert_eq!(doc.collapsed_text, "Hello world\nsecond blocknext page");
        assert_eq!(doc.block_lines, "Hello world\nsecond block\nnext page");
    }

    #[test]
    fn skips_empty_and_header_blocks() {
        let pages = vec![vec![
            block("   \n ", 0),
            TextBlock::new("Journal of Tox 12", BlockKind::Header, 0),
            block("body", 0),
            TextBlock::new("7", BlockKind::PageNumber, 0),
        ]];
        let doc = normalize(&pages);
        assert_eq!(doc.collapsed_text, "body");
        assert_eq!(doc.raw_preserved_text, "body");
    }

    #[test]
    fn preserved_view_keeps_newlines_and_drops_controls() {
        let pages = vec![vec![
            block("ALT\nalanine\u{0}aminotransferase\n", 0),
            block("AST\u{8}\u{85}\naspartate\taminotransferase\r\n", 0),
        ]];
        let doc = normalize(&pages);
        assert_eq!(
            doc.raw_preserved_text,
            "ALT\nalanineaminotransferase\nAST\naspartate\taminotransferase\n"
        );
    }

    #[test]
    fn normalization_is_deterministic() {
        let pages = vec![vec![block("a  b", 0), block("c\u{1}d", 0)]];
        assert_eq!(normalize(&pages), normalize(&pages));
    }
}
