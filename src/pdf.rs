use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;
use log::{debug, warn};
use pdfium_render::prelude::*;

use crate::error::{ExtractError, Result};
use crate::layout;
use crate::source::{ImageSource, TextBlockSource};
use crate::types::{EmbeddedImage, PageChars, PdfChar, TextBlock};
use crate::zones;

/// A PDF opened through pdfium, exposing its text blocks and images.
pub struct PdfSource<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfSource<'a> {
    pub fn open(pdfium: &'a Pdfium, path: &Path) -> Result<Self> {
        // Report a missing or unreadable file as I/O, not as a parse failure.
        std::fs::metadata(path).map_err(|e| ExtractError::io(path, e))?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| ExtractError::Pdf(format!("failed to load {}: {e}", path.display())))?;
        Ok(Self { document })
    }

    fn page_chars(&self) -> Result<Vec<PageChars>> {
        self.document
            .pages()
            .iter()
            .enumerate()
            .map(|(idx, page)| extract_page_chars(idx, &page))
            .collect()
    }
}

impl TextBlockSource for PdfSource<'_> {
    fn text_pages(&self) -> Result<Vec<Vec<TextBlock>>> {
        let pages = self.page_chars()?;
        Ok(pages
            .iter()
            .map(|pc| zones::tag_page(&layout::group_page(pc), pc.page_idx, pc.height))
            .collect())
    }
}

impl ImageSource for PdfSource<'_> {
    fn image_pages(&self) -> Result<Vec<Vec<EmbeddedImage>>> {
        self.document
            .pages()
            .iter()
            .enumerate()
            .map(|(idx, page)| extract_page_images(idx, &page))
            .collect()
    }
}

fn extract_page_chars(page_idx: usize, page: &PdfPage) -> Result<PageChars> {
    let text_page = page.text().map_err(|e| {
        ExtractError::Pdf(format!("failed to load text for page {}: {e}", page_idx + 1))
    })?;

    let chars: Vec<PdfChar> = text_page
        .chars()
        .iter()
        .filter_map(|ch| convert_text_char(&ch))
        .collect();

    Ok(PageChars {
        page_idx,
        width: page.width().value,
        height: page.height().value,
        chars,
    })
}

fn convert_text_char(ch: &PdfPageTextChar) -> Option<PdfChar> {
    let unicode = ch.unicode_char()?;
    if unicode.is_control() && unicode != ' ' {
        return None;
    }

    // Zero-size glyphs are watermarks or hidden text.
    let font_size = ch.scaled_font_size().value;
    if font_size < 0.5 {
        return None;
    }

    let rect = ch.loose_bounds().or_else(|_| ch.tight_bounds()).ok()?;
    Some(PdfChar {
        ch: unicode,
        x: rect.left().value,
        y: rect.bottom().value,
        width: (rect.right().value - rect.left().value).abs(),
        font_size,
    })
}

fn extract_page_images(page_idx: usize, page: &PdfPage) -> Result<Vec<EmbeddedImage>> {
    let mut images = Vec::new();
    for object in page.objects().iter() {
        let Some(image_object) = object.as_image_object() else {
            continue;
        };
        let decoded = match image_object.get_raw_image() {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("undecodable image on page {}: {e}", page_idx + 1);
                continue;
            }
        };
        images.push(EmbeddedImage { bytes: encode_png(&decoded)?, ext: "png".to_string() });
    }
    debug!("page {}: {} embedded images", page_idx + 1, images.len());
    Ok(images)
}

fn encode_png(image: &image::DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ExtractError::Image(format!("failed to encode figure as PNG: {e}")))?;
    Ok(buf.into_inner())
}
