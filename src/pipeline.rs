use std::path::Path;

use log::{debug, info, warn};

use crate::abbrev;
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::figures;
use crate::normalize;
use crate::sections;
use crate::source::{ImageSource, TextBlockSource};
use crate::textclass;
use crate::types::Publication;

/// Identifier of a source document: its file stem.
pub fn publication_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run every extraction engine over one document.
///
/// Sections that are not found come back as `None`/empty; only failures of
/// the underlying sources or of figure storage are errors.
pub fn extract_publication(
    id: &str,
    text_source: &impl TextBlockSource,
    image_source: &impl ImageSource,
    config: &ExtractConfig,
) -> Result<Publication> {
    let pages = text_source.text_pages()?;
    let doc = normalize::normalize(&pages);

    let corrupted = textclass::is_corrupted(&doc.raw_preserved_text, config.corruption_threshold);
    if corrupted {
        warn!("{id}: text looks corrupted, results are low confidence");
    }

    let split = sections::split_sections(&doc.collapsed_text, config.min_paragraph_words);
    let (abstract_text, full_text) = match split {
        Some(s) => {
            debug!("{id}: abstract located by {:?}", s.strategy);
            (Some(s.abstract_text), Some(s.full_text))
        }
        None => (None, None),
    };
    if let Some(text) = &abstract_text
        && !textclass::ends_sentence(text)
    {
        debug!("{id}: abstract does not end a sentence, it may be truncated");
    }
    let abbreviations = abbrev::resolve_abbreviations(&doc);
    let captions = figures::extract_captions(&doc.block_lines);

    let figures = if config.extract_figures {
        let image_pages = image_source.image_pages()?;
        figures::extract_figures(id, &image_pages, &config.output_dir, config.min_figure_bytes)?
    } else {
        Vec::new()
    };

    info!(
        "{id}: abstract={} abbreviations={} figures={} captions={}",
        abstract_text.is_some(),
        abbreviations.len(),
        figures.len(),
        captions.len()
    );

    Ok(Publication {
        id: id.to_string(),
        abstract_text,
        full_text,
        abbreviations,
        figures,
        captions,
        tables: Vec::new(),
        corrupted,
    })
}
