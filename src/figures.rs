use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ExtractError, Result};
use crate::types::EmbeddedImage;

/// A line starting with "Figure <n>", captured to the end of the line.
static CAPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*(figure[ \t]+\d+[^\n]*)").unwrap());

/// Write every image larger than `min_bytes` to
/// `{output_dir}/{doc_id}/figure{n}.{ext}`, numbering from 1 across the
/// whole document, and return the sorted listing of that folder.
///
/// The listing is sorted by file name, so `figure10` comes before `figure2`.
pub fn extract_figures(
    doc_id: &str,
    image_pages: &[Vec<EmbeddedImage>],
    output_dir: &Path,
    min_bytes: usize,
) -> Result<Vec<PathBuf>> {
    let doc_dir = output_dir.join(doc_id);
    let mut counter = 0;

    for (page_idx, images) in image_pages.iter().enumerate() {
        for image in images {
            if image.bytes.len() <= min_bytes {
                debug!(
                    "skipping {}-byte image on page {} of {doc_id}",
                    image.bytes.len(),
                    page_idx + 1
                );
                continue;
            }
            if counter == 0 {
                fs::create_dir_all(&doc_dir).map_err(|e| ExtractError::io(&doc_dir, e))?;
            }
            counter += 1;
            let path = doc_dir.join(format!("figure{counter}.{}", image.ext));
            fs::write(&path, &image.bytes).map_err(|e| ExtractError::io(&path, e))?;
        }
    }

    if counter == 0 {
        return Ok(Vec::new());
    }
    list_figure_dir(&doc_dir)
}

fn list_figure_dir(doc_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(doc_dir).map_err(|e| ExtractError::io(doc_dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ExtractError::io(doc_dir, e))?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Figure captions in document order.
pub fn extract_captions(text: &str) -> Vec<String> {
    CAPTION_RE
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}
