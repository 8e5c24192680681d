mod abbrev;
mod cache;
mod config;
mod error;
mod figures;
mod layout;
mod normalize;
mod pdf;
mod pipeline;
mod sections;
mod source;
mod textclass;
mod types;
mod zones;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use log::{debug, error, warn};
use pdfium_render::prelude::*;

use cache::PublicationCache;
use config::ExtractConfig;
use error::ExtractError;
use pdf::PdfSource;
use source::{StaticDocument, TextBlockSource};
use types::{Publication, TextBlock};

#[derive(Parser)]
#[command(
    name = "pubextract",
    about = "Extract abstract, body, abbreviations and figures from biomedical articles"
)]
struct Cli {
    /// PDF or plain-text (.txt) files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory receiving one figure folder per document
    #[arg(long, env = "PUBEXTRACT_OUTPUT_DIR", default_value = "figures")]
    out_dir: PathBuf,

    /// Do not extract embedded figures
    #[arg(long)]
    no_figures: bool,

    /// Keep only images larger than this many bytes
    #[arg(long, default_value_t = 10 * 1024)]
    min_figure_bytes: usize,

    /// Fallback abstract paragraphs need more words than this
    #[arg(long, default_value_t = 100)]
    min_paragraph_words: usize,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Show the tagged text blocks per page (debug)
    #[arg(long)]
    debug_layout: bool,

    /// Reuse results of unchanged files from the user cache
    #[arg(long)]
    cache: bool,

    /// Override pdfium library path
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_path: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let needs_pdfium = cli.files.iter().any(|f| !is_plain_text(f));
    let pdfium = if needs_pdfium {
        Some(bind_pdfium(&cli.pdfium_path)?)
    } else {
        None
    };

    if cli.debug_layout {
        for file in &cli.files {
            print_debug_layout(file, pdfium.as_ref())?;
        }
        return Ok(());
    }

    let config = build_config(&cli);
    let cache = if cli.cache { open_cache() } else { None };

    let mut publications = Vec::new();
    let mut failures = 0;
    for file in &cli.files {
        match process_file(file, pdfium.as_ref(), &config, cache.as_ref()) {
            Ok(publication) => publications.push(publication),
            Err(e) => {
                error!("{}: {e:#}", file.display());
                failures += 1;
            }
        }
    }

    print_output(&publications, cli.pretty)?;
    if failures > 0 {
        bail!("{failures} of {} documents failed", cli.files.len());
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn bind_pdfium(pdfium_path: &Option<String>) -> Result<Pdfium> {
    let bindings = if let Some(path) = pdfium_path {
        Pdfium::bind_to_library(path)
            .with_context(|| format!("Failed to load pdfium from: {path}"))?
    } else {
        Pdfium::bind_to_system_library()
            .context("Failed to find pdfium. Install pdfium-binaries or use --pdfium-path")?
    };
    Ok(Pdfium::new(bindings))
}

fn build_config(cli: &Cli) -> ExtractConfig {
    ExtractConfig {
        output_dir: cli.out_dir.clone(),
        min_figure_bytes: cli.min_figure_bytes,
        min_paragraph_words: cli.min_paragraph_words,
        extract_figures: !cli.no_figures,
        ..ExtractConfig::default()
    }
}

fn open_cache() -> Option<PublicationCache> {
    match PublicationCache::open() {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!("result cache disabled: {e}");
            None
        }
    }
}

fn is_plain_text(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

fn read_plain_text(path: &Path) -> Result<StaticDocument, ExtractError> {
    let text = fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
    Ok(StaticDocument::from_plain_text(&text))
}

fn process_file(
    path: &Path,
    pdfium: Option<&Pdfium>,
    config: &ExtractConfig,
    cache: Option<&PublicationCache>,
) -> Result<Publication> {
    if let Some(cache) = cache {
        match cache.get(path) {
            Ok(Some(publication)) => {
                debug!("{}: using cached result", path.display());
                return Ok(publication);
            }
            Ok(None) => {}
            Err(e) => warn!("{}: cache lookup failed: {e}", path.display()),
        }
    }

    let id = pipeline::publication_id(path);
    let publication = if is_plain_text(path) {
        let doc = read_plain_text(path)?;
        pipeline::extract_publication(&id, &doc, &doc, config)?
    } else {
        let pdfium = pdfium.context("pdfium is not loaded")?;
        let doc = PdfSource::open(pdfium, path)?;
        pipeline::extract_publication(&id, &doc, &doc, config)?
    };

    if let Some(cache) = cache
        && let Err(e) = cache.put(path, &publication)
    {
        warn!("{}: cache store failed: {e}", path.display());
    }
    Ok(publication)
}

fn print_output(publications: &[Publication], pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(publications)?
    } else {
        serde_json::to_string(publications)?
    };
    println!("{json}");
    Ok(())
}

fn print_debug_layout(path: &Path, pdfium: Option<&Pdfium>) -> Result<()> {
    let pages = if is_plain_text(path) {
        read_plain_text(path)?.text_pages()?
    } else {
        let pdfium = pdfium.context("pdfium is not loaded")?;
        PdfSource::open(pdfium, path)?.text_pages()?
    };
    println!("== {}", path.display());
    for block in pages.iter().flatten() {
        print_block(block);
    }
    Ok(())
}

fn print_block(block: &TextBlock) {
    let kind = format!("{:?}", block.kind);
    let preview: String = block.text.replace('\n', " ").chars().take(80).collect();
    println!("p{} [{:<10}] | {}", block.page_idx + 1, kind, preview);
}
