use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::block::{Block, TextRun};
use crate::inline::format_runs;

/// A whole line wrapped in `**`.
static HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*\*.*\*\*$").expect("valid regex"));

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*•]\s+").expect("valid regex"));

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s+").expect("valid regex"));

/// Parse analysis text into a list of blocks, with links enabled.
pub fn parse(document: &str) -> Vec<Block> {
    parse_with(document, true)
}

/// Parse analysis text into a list of blocks
pub fn parse_with(document: &str, links: bool) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut state = ParseState::default();

    let mut lines = 0usize;
    for line in document.split('\n') {
        lines += 1;
        process_line(trim_line(line), links, &mut state, &mut blocks);
    }
    state.flush_list(&mut blocks);

    debug!(lines, blocks = blocks.len(), "parsed analysis");
    blocks
}

#[derive(Default)]
struct ParseState {
    // List items seen since the last non-list line
    list_items: Vec<Vec<TextRun>>,
}

impl ParseState {
    fn flush_list(&mut self, blocks: &mut Vec<Block>) {
        if !self.list_items.is_empty() {
            blocks.push(Block::List(std::mem::take(&mut self.list_items)));
        }
    }
}

fn process_line(line: &str, links: bool, state: &mut ParseState, blocks: &mut Vec<Block>) {
    if line.is_empty() {
        state.flush_list(blocks);
        return;
    }

    if HEADER.is_match(line) {
        state.flush_list(blocks);
        blocks.push(Block::Header(strip_header_markers(line).to_string()));
        return;
    }

    if let Some(item) = strip_list_marker(line) {
        state.list_items.push(format_runs(item, links));
        return;
    }

    state.flush_list(blocks);
    blocks.push(Block::Paragraph(format_runs(line, links)));
}

/// Trim whitespace and byte order marks from both ends.
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Remove one leading and then one trailing `**`.
fn strip_header_markers(line: &str) -> &str {
    let inner = line.strip_prefix("**").unwrap_or(line);
    inner.strip_suffix("**").unwrap_or(inner)
}

/// The item text after a single bullet or numeric marker, if the line has one.
fn strip_list_marker(line: &str) -> Option<&str> {
    BULLET
        .find(line)
        .or_else(|| NUMBERED.find(line))
        .map(|marker| &line[marker.end()..])
}
