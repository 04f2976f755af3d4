use crate::block::{Block, TextRun};
use crate::config::Config;

/// Lists up to this many items are kept on one page.
const SMALL_LIST: usize = 5;

/// Convert blocks to Typst markup
pub fn blocks_to_typst(blocks: &[Block], config: &Config) -> String {
    let mut out = String::new();

    emit_preamble(config, &mut out);
    emit_title(config, &mut out);

    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];

        match block {
            Block::Header(_) => {
                // Keep a header on the same page as the content it introduces
                out.push_str("#block(breakable: false)[\n");
                emit_block(block, &mut out);

                if i + 1 < blocks.len() && !matches!(blocks[i + 1], Block::Header(_)) {
                    i += 1;
                    emit_block(&blocks[i], &mut out);
                }
                out.push_str("]\n\n");
            }
            _ => {
                emit_block(block, &mut out);
            }
        }

        i += 1;
    }

    out
}

fn emit_preamble(config: &Config, out: &mut String) {
    out.push_str("#set par(linebreaks: \"optimized\")\n");

    if config.page.numbers {
        out.push_str("#set page(numbering: \"1\")\n");
    }
    if let Some(family) = &config.font.family {
        out.push_str("#set text(font: ");
        push_string_literal(family, out);
        out.push_str(")\n");
    }

    out.push_str("#show link: set text(fill: rgb(");
    push_string_literal(&config.links.color, out);
    out.push_str("))\n");
    if config.links.underline {
        out.push_str("#show link: underline\n");
    }

    out.push('\n');
}

fn emit_title(config: &Config, out: &mut String) {
    let document = &config.document;
    if document.title.is_none() && document.subtitle.is_none() {
        return;
    }

    out.push_str("#align(center)[\n");
    if let Some(title) = &document.title {
        out.push_str("#text(size: 20pt, weight: \"bold\")[");
        escape_line_start(title, out);
        out.push_str("]\n\n");
    }
    if let Some(subtitle) = &document.subtitle {
        out.push_str("#text(fill: gray)[");
        escape_line_start(subtitle, out);
        out.push_str("]\n");
    }
    out.push_str("]\n\n");
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Header(text) => {
            out.push_str("== ");
            escape_line_start(text, out);
            out.push_str("\n\n");
        }
        Block::Paragraph(runs) => {
            runs_to_typst(runs, out);
            out.push_str("\n\n");
        }
        Block::List(items) => {
            if items.len() <= SMALL_LIST {
                out.push_str("#block(breakable: false)[\n");
                list_to_typst(items, out);
                out.push_str("]\n\n");
            } else {
                list_to_typst(items, out);
                out.push('\n');
            }
        }
    }
}

fn list_to_typst(items: &[Vec<TextRun>], out: &mut String) {
    for item in items {
        out.push_str("- ");
        runs_to_typst(item, out);
        out.push('\n');
    }
}

fn runs_to_typst(runs: &[TextRun], out: &mut String) {
    // Set after `#strong[..]` or `#link(..)[..]`, whose call syntax the next
    // character could extend.
    let mut after_call = false;

    for (i, run) in runs.iter().enumerate() {
        match run {
            TextRun::Text(text) if i == 0 => escape_line_start(text, out),
            TextRun::Text(text) if after_call => escape_after_call(text, out),
            TextRun::Text(text) => escape_text(text, out),
            TextRun::Bold(text) => {
                out.push_str("#strong[");
                escape_line_start(text, out);
                out.push(']');
            }
            TextRun::Link { label, url } => {
                out.push_str("#link(");
                push_string_literal(url, out);
                out.push_str(")[");
                escape_line_start(label, out);
                out.push(']');
            }
        }
        after_call = !matches!(run, TextRun::Text(_));
    }
}

/// Escape text that opens a line or content block, where `12.` would start a
/// numbered list.
fn escape_line_start(text: &str, out: &mut String) {
    let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    match text[digits..].strip_prefix('.') {
        Some(rest) if digits > 0 => {
            out.push_str(&text[..digits]);
            out.push_str("\\.");
            escape_text(rest, out);
        }
        _ => escape_text(text, out),
    }
}

fn escape_after_call(text: &str, out: &mut String) {
    if text.starts_with(['(', '.']) {
        out.push('\\');
    }
    escape_text(text, out);
}

/// Escape characters that carry meaning in Typst markup.
fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '/' | '~' | '='
            | '-' | '+' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

fn push_string_literal(value: &str, out: &mut String) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use crate::block::{Block, TextRun};
    use crate::config::{Config, DocumentConfig};
    use crate::typst::blocks_to_typst;
    use crate::{analysis_to_typst_with_config, format_blocks};

    const PREAMBLE: &str = "#set par(linebreaks: \"optimized\")\n#show link: set text(fill: rgb(\"#1a4f8b\"))\n#show link: underline\n\n";

    fn typst(analysis: &str) -> String {
        analysis_to_typst_with_config(analysis, &Config::default())
    }

    #[test]
    fn header() {
        assert_eq!(
            typst("**Key Mistakes**"),
            format!("{PREAMBLE}#block(breakable: false)[\n== Key Mistakes\n\n]\n\n")
        );
    }

    #[test]
    fn header_with_following_content() {
        let result = typst("**Summary**\nYou play well.");
        assert!(result.contains("#block(breakable: false)[\n== Summary\n\nYou play well.\n\n]\n\n"));
    }

    #[test]
    fn consecutive_headers_are_not_merged() {
        let result = blocks_to_typst(
            &[Block::Header("A".into()), Block::Header("B".into())],
            &Config::default(),
        );
        assert_eq!(
            result,
            format!(
                "{PREAMBLE}#block(breakable: false)[\n== A\n\n]\n\n#block(breakable: false)[\n== B\n\n]\n\n"
            )
        );
    }

    #[test]
    fn paragraph() {
        assert_eq!(typst("Hello world"), format!("{PREAMBLE}Hello world\n\n"));
    }

    #[test]
    fn bold() {
        assert_eq!(
            typst("Avoid **early queen** moves"),
            format!("{PREAMBLE}Avoid #strong[early queen] moves\n\n")
        );
    }

    #[test]
    fn bold_inside_a_word() {
        assert_eq!(
            typst("Play e4**Nf3**x"),
            format!("{PREAMBLE}Play e4#strong[Nf3]x\n\n")
        );
    }

    #[test]
    fn text_after_bold_cannot_extend_the_call() {
        assert_eq!(
            typst("Play **Nf3**. Then (maybe) [c4](u)(again)"),
            format!(
                "{PREAMBLE}Play #strong[Nf3]\\. Then (maybe) #link(\"u\")[c4]\\(again)\n\n"
            )
        );
    }

    #[test]
    fn leading_move_numbers_are_not_lists() {
        assert_eq!(
            typst("- 1. e4 e5\n- 12.Nf3"),
            format!("{PREAMBLE}#block(breakable: false)[\n- 1\\. e4 e5\n- 12\\.Nf3\n]\n\n")
        );
        assert_eq!(
            blocks_to_typst(&[Block::Header("1. Opening".into())], &Config::default()),
            format!("{PREAMBLE}#block(breakable: false)[\n== 1\\. Opening\n\n]\n\n")
        );
        assert_eq!(
            typst("- **2. Bxf7** was the blunder"),
            format!("{PREAMBLE}#block(breakable: false)[\n- #strong[2\\. Bxf7] was the blunder\n]\n\n")
        );
        assert_eq!(typst("Move 1. e4"), format!("{PREAMBLE}Move 1. e4\n\n"));
    }

    #[test]
    fn link() {
        assert_eq!(
            typst("See [Game 1](https://www.chess.com/game/live/1)"),
            format!("{PREAMBLE}See #link(\"https://www.chess.com/game/live/1\")[Game 1]\n\n")
        );
    }

    #[test]
    fn small_list() {
        assert_eq!(
            typst("- one\n2. two"),
            format!("{PREAMBLE}#block(breakable: false)[\n- one\n- two\n]\n\n")
        );
    }

    #[test]
    fn large_list_may_break() {
        let result = typst("- a\n- b\n- c\n- d\n- e\n- f");
        assert_eq!(result, format!("{PREAMBLE}- a\n- b\n- c\n- d\n- e\n- f\n\n"));
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(typst("a # b"), format!("{PREAMBLE}a \\# b\n\n"));
        assert_eq!(typst("a_b"), format!("{PREAMBLE}a\\_b\n\n"));
        assert_eq!(typst("= not a heading"), format!("{PREAMBLE}\\= not a heading\n\n"));
        assert_eq!(typst("+ not a list"), format!("{PREAMBLE}\\+ not a list\n\n"));
        assert_eq!(typst("a // b"), format!("{PREAMBLE}a \\/\\/ b\n\n"));
        assert_eq!(
            blocks_to_typst(&[Block::Header("Qxf7**".into())], &Config::default()),
            format!("{PREAMBLE}#block(breakable: false)[\n== Qxf7\\*\\*\n\n]\n\n")
        );
    }

    #[test]
    fn escapes_link_url() {
        let blocks = [Block::Paragraph(vec![TextRun::Link {
            label: "x".into(),
            url: "a\"b".into(),
        }])];
        assert_eq!(
            blocks_to_typst(&blocks, &Config::default()),
            format!("{PREAMBLE}#link(\"a\\\"b\")[x]\n\n")
        );
    }

    #[test]
    fn preamble_follows_config() {
        let mut config = Config::default();
        config.page.numbers = true;
        config.font.family = Some("Inter".into());
        config.links.color = "#ff0000".into();
        config.links.underline = false;

        assert_eq!(
            blocks_to_typst(&[], &config),
            "#set par(linebreaks: \"optimized\")\n#set page(numbering: \"1\")\n#set text(font: \"Inter\")\n#show link: set text(fill: rgb(\"#ff0000\"))\n\n"
        );
    }

    #[test]
    fn title_block() {
        let config = Config {
            document: DocumentConfig {
                title: Some("Game #3 Analysis".into()),
                subtitle: Some("AI Coach Review".into()),
            },
            ..Config::default()
        };

        assert_eq!(
            blocks_to_typst(&format_blocks("ok"), &config),
            format!(
                "{PREAMBLE}#align(center)[\n#text(size: 20pt, weight: \"bold\")[Game \\#3 Analysis]\n\n#text(fill: gray)[AI Coach Review]\n]\n\nok\n\n"
            )
        );
    }
}
