use serde::Serialize;

/// Inline text runs with formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum TextRun {
    Text(String),
    Bold(String),
    Link { label: String, url: String },
}

impl TextRun {
    /// The visible text of the run, markup stripped.
    pub fn text(&self) -> &str {
        match self {
            TextRun::Text(text) | TextRun::Bold(text) => text,
            TextRun::Link { label, .. } => label,
        }
    }

    /// Re-insert the inline markup this run was parsed from.
    pub fn to_markup(&self) -> String {
        match self {
            TextRun::Text(text) => text.clone(),
            TextRun::Bold(text) => format!("**{text}**"),
            TextRun::Link { label, url } => format!("[{label}]({url})"),
        }
    }
}

/// Concatenate the visible text of a line's runs.
pub fn runs_to_text(runs: &[TextRun]) -> String {
    runs.iter().map(TextRun::text).collect()
}

/// Rebuild the marked-up line a sequence of runs came from.
pub fn runs_to_markup(runs: &[TextRun]) -> String {
    runs.iter().map(TextRun::to_markup).collect()
}

/// Block-level elements parsed from analysis text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Block {
    /// Header text is kept verbatim, without inline formatting.
    Header(String),
    Paragraph(Vec<TextRun>),
    /// Never empty.
    List(Vec<Vec<TextRun>>),
}

/// Markup-free rendering of a document, one line per header, paragraph or
/// list item. Headers lose their `**` and come back as paragraphs.
pub fn blocks_to_plain_text(blocks: &[Block]) -> String {
    let mut sections = Vec::with_capacity(blocks.len());

    for block in blocks {
        let section = match block {
            Block::Header(text) => text.clone(),
            Block::Paragraph(runs) => runs_to_text(runs),
            Block::List(items) => items
                .iter()
                .map(|item| format!("- {}", runs_to_text(item)))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        sections.push(section);
    }

    sections.join("\n\n")
}
