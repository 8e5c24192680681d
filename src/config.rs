use std::path::PathBuf;

/// Tunables for one extraction run, passed explicitly into the pipeline.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Figures go to `{output_dir}/{document_id}/figure{n}.{ext}`.
    pub output_dir: PathBuf,
    /// Images must be strictly larger than this to be kept.
    pub min_figure_bytes: usize,
    /// Fallback abstract paragraphs must have strictly more words than this.
    pub min_paragraph_words: usize,
    pub corruption_threshold: f32,
    pub extract_figures: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("figures"),
            min_figure_bytes: 10 * 1024,
            min_paragraph_words: 100,
            corruption_threshold: 0.1,
            extract_figures: true,
        }
    }
}
