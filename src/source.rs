use crate::error::Result;
use crate::types::{BlockKind, EmbeddedImage, TextBlock};
use crate::zones;

/// Page-ordered text blocks of a document.
pub trait TextBlockSource {
    fn text_pages(&self) -> Result<Vec<Vec<TextBlock>>>;
}

/// Page-ordered embedded images of a document.
pub trait ImageSource {
    fn image_pages(&self) -> Result<Vec<Vec<EmbeddedImage>>>;
}

/// A document held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticDocument {
    pub text_pages: Vec<Vec<TextBlock>>,
    pub image_pages: Vec<Vec<EmbeddedImage>>,
}

impl StaticDocument {
    /// One page, one text block.
    #[cfg(test)]
    pub fn from_text(text: &str) -> Self {
        Self {
            text_pages: vec![vec![TextBlock::new(text, BlockKind::Text, 0)]],
            image_pages: Vec::new(),
        }
    }

    /// One page whose blocks are the blank-line separated paragraphs of `text`.
    pub fn from_plain_text(text: &str) -> Self {
        let mut blocks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                flush_paragraph(&mut current, &mut blocks);
            } else {
                current.push(line);
            }
        }
        flush_paragraph(&mut current, &mut blocks);
        Self { text_pages: vec![blocks], image_pages: Vec::new() }
    }

    #[cfg(test)]
    pub fn with_images(mut self, image_pages: Vec<Vec<EmbeddedImage>>) -> Self {
        self.image_pages = image_pages;
        self
    }
}

fn flush_paragraph(current: &mut Vec<&str>, blocks: &mut Vec<TextBlock>) {
    if current.is_empty() {
        return;
    }
    // Trailing newline keeps paragraphs apart in the preserved stream.
    let mut text = current.join("\n");
    text.push('\n');
    let kind = if zones::is_caption_text(&text) {
        BlockKind::Caption
    } else {
        BlockKind::Text
    };
    blocks.push(TextBlock::new(text, kind, 0));
    current.clear();
}

impl TextBlockSource for StaticDocument {
    fn text_pages(&self) -> Result<Vec<Vec<TextBlock>>> {
        Ok(self.text_pages.clone())
    }
}

impl ImageSource for StaticDocument {
    fn image_pages(&self) -> Result<Vec<Vec<EmbeddedImage>>> {
        Ok(self.image_pages.clone())
    }
}
