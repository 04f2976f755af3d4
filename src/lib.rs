mod block;
mod config;
mod error;
mod game;
mod inline;
mod opening;
mod parser;
mod typst;

pub use block::{Block, TextRun, blocks_to_plain_text, runs_to_markup, runs_to_text};
pub use config::{Config, DocumentConfig, FontConfig, LinksConfig, PageConfig};
pub use error::{Error, Result};
pub use game::{
    ArchiveMonth, Game, GameCard, GameHistory, Outcome, Record, Side, TimeClassFilter, UNKNOWN_OPENING,
};
pub use inline::format_runs;
pub use opening::{OpeningLabel, parse_opening};
pub use typst::blocks_to_typst;

use tracing::{debug, info};
use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

/// Parse analysis text into a vector of blocks, recognizing links.
pub fn format_blocks(analysis: &str) -> Vec<Block> {
    parser::parse(analysis)
}

/// Parse analysis text into a vector of blocks. With `links` off, link syntax
/// stays literal text.
pub fn format_blocks_with(analysis: &str, links: bool) -> Vec<Block> {
    parser::parse_with(analysis, links)
}

/// Convert analysis text to Typst markup using default config.
pub fn analysis_to_typst(analysis: &str) -> String {
    analysis_to_typst_with_config(analysis, &Config::compiled_default())
}

/// Convert analysis text to Typst markup with custom config.
pub fn analysis_to_typst_with_config(analysis: &str, config: &Config) -> String {
    let blocks = format_blocks(analysis);
    blocks_to_typst(&blocks, config)
}

/// Convert analysis text to PDF bytes using default config.
pub fn analysis_to_pdf(analysis: &str) -> Result<Vec<u8>> {
    analysis_to_pdf_with_config(analysis, &Config::compiled_default())
}

/// Convert analysis text to PDF bytes with custom config.
pub fn analysis_to_pdf_with_config(analysis: &str, config: &Config) -> Result<Vec<u8>> {
    blocks_to_pdf(&format_blocks(analysis), config)
}

/// Render already formatted blocks to PDF bytes.
pub fn blocks_to_pdf(blocks: &[Block], config: &Config) -> Result<Vec<u8>> {
    let typst_content = blocks_to_typst(blocks, config);
    debug!(bytes = typst_content.len(), "compiling typst document");

    // A custom family has to come from the system; the embedded set is fixed.
    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(config.font.family.is_some());

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| Error::Typst(format!("{e:?}")))?;

    let pdf = typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| Error::Pdf(format!("{e:?}")))?;
    info!(pages = doc.pages.len(), bytes = pdf.len(), "rendered pdf");
    Ok(pdf)
}
