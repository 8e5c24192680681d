use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A character extracted from a PDF page with position and font size.
#[derive(Debug, Clone)]
pub struct PdfChar {
    pub ch: char,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
}

/// All characters on a single PDF page.
#[derive(Debug)]
pub struct PageChars {
    pub page_idx: usize,
    pub width: f32,
    pub height: f32,
    pub chars: Vec<PdfChar>,
}

/// A word: run of characters without a gap.
#[derive(Debug, Clone)]
pub struct Word {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
}

/// Words sharing a baseline, in left-to-right order.
#[derive(Debug, Clone)]
pub struct Line {
    pub words: Vec<Word>,
    pub y: f32,
    pub x_start: f32,
    pub x_end: f32,
    pub font_size: f32,
}

impl Line {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Consecutive lines forming one layout block (paragraph, caption, ...).
#[derive(Debug, Clone)]
pub struct LayoutBlock {
    pub lines: Vec<Line>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
}

impl LayoutBlock {
    /// Block text with the original line breaks kept.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Type tag of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Text,
    Caption,
    Table,
    Header,
    PageNumber,
}

impl BlockKind {
    /// Running headers and folios are not part of the reading stream.
    pub fn is_reading_text(self) -> bool {
        !matches!(self, BlockKind::Header | BlockKind::PageNumber)
    }
}

/// One unit of extracted page text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub kind: BlockKind,
    pub page_idx: usize,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, kind: BlockKind, page_idx: usize) -> Self {
        Self { text: text.into(), kind, page_idx }
    }
}

/// An image object embedded in a page, already decoded to file bytes.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub bytes: Vec<u8>,
    /// File extension matching `bytes` ("png", "jpeg", ...).
    pub ext: String,
}

/// The two canonical text views of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    /// Whitespace runs collapsed to one space; blocks joined by newlines.
    pub collapsed_text: String,
    /// Control characters stripped, original line breaks kept.
    pub raw_preserved_text: String,
    /// Collapsed blocks one per line, pages included, for line-anchored scans.
    pub block_lines: String,
}

/// Abbreviation as written → lowercase expansion, in discovery order.
pub type AbbreviationMap = IndexMap<String, String>;

/// Everything extracted from one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub id: String,
    pub abstract_text: Option<String>,
    pub full_text: Option<String>,
    pub abbreviations: AbbreviationMap,
    pub figures: Vec<PathBuf>,
    pub captions: Vec<String>,
    /// Table extraction is not implemented; always empty.
    pub tables: Vec<String>,
    pub corrupted: bool,
}
