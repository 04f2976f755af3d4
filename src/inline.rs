use std::sync::LazyLock;

use regex::Regex;

use crate::block::TextRun;

/// Links `[label](url)` or bold `**text**`, whichever starts first.
static LINK_OR_BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)|\*\*([^*]+)\*\*").expect("valid regex")
});

static BOLD_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));

/// Split one line into plain, bold and link runs.
///
/// With `links` off only bold markers are recognized and link syntax is kept as
/// literal text. Markers that do not pair up are left in place. Non-empty input
/// always yields at least one run.
pub fn format_runs(line: &str, links: bool) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut cursor = 0;

    if links {
        for caps in LINK_OR_BOLD.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            push_text(&mut runs, &line[cursor..whole.start()]);

            if let (Some(label), Some(url)) = (caps.get(1), caps.get(2)) {
                runs.push(TextRun::Link {
                    label: label.as_str().to_string(),
                    url: url.as_str().to_string(),
                });
            } else if let Some(bold) = caps.get(3) {
                runs.push(TextRun::Bold(bold.as_str().to_string()));
            }

            cursor = whole.end();
        }
    } else {
        for caps in BOLD_ONLY.captures_iter(line) {
            let (Some(whole), Some(bold)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_text(&mut runs, &line[cursor..whole.start()]);
            runs.push(TextRun::Bold(bold.as_str().to_string()));
            cursor = whole.end();
        }
    }

    push_text(&mut runs, &line[cursor..]);
    runs
}

fn push_text(runs: &mut Vec<TextRun>, text: &str) {
    if !text.is_empty() {
        runs.push(TextRun::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> TextRun {
        TextRun::Text(s.to_string())
    }

    fn bold(s: &str) -> TextRun {
        TextRun::Bold(s.to_string())
    }

    fn link(label: &str, url: &str) -> TextRun {
        TextRun::Link {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn plain_line_is_one_run() {
        for line in ["Hello world", "1. e4 e5 2. Nf3", "a * b", "x"] {
            assert_eq!(format_runs(line, true), vec![text(line)]);
        }
    }

    #[test]
    fn empty_line_has_no_runs() {
        assert!(format_runs("", true).is_empty());
        assert!(format_runs("", false).is_empty());
    }

    #[test]
    fn bold_runs() {
        assert_eq!(
            format_runs("You missed **Nxe5** twice", true),
            vec![text("You missed "), bold("Nxe5"), text(" twice")]
        );
        assert_eq!(format_runs("**all bold**", true), vec![bold("all bold")]);
    }

    #[test]
    fn link_runs() {
        assert_eq!(
            format_runs("See [Game #3](https://www.chess.com/game/live/1) here", true),
            vec![
                text("See "),
                link("Game #3", "https://www.chess.com/game/live/1"),
                text(" here"),
            ]
        );
    }

    #[test]
    fn earliest_match_wins() {
        assert_eq!(
            format_runs("**b** then [l](u) then **c**", true),
            vec![
                bold("b"),
                text(" then "),
                link("l", "u"),
                text(" then "),
                bold("c"),
            ]
        );
    }

    #[test]
    fn no_nesting() {
        assert_eq!(
            format_runs("[**x**](u)", true),
            vec![link("**x**", "u")]
        );
        assert_eq!(
            format_runs("**[a](b)**", true),
            vec![bold("[a](b)")]
        );
    }

    #[test]
    fn unbalanced_markers_stay_literal() {
        assert_eq!(format_runs("a lone ** here", true), vec![text("a lone ** here")]);
        assert_eq!(format_runs("****", true), vec![text("****")]);
        assert_eq!(format_runs("[]()", true), vec![text("[]()")]);
        assert_eq!(
            format_runs("**open **closed**", true),
            vec![bold("open "), text("closed**")]
        );
    }

    #[test]
    fn links_can_be_turned_off() {
        assert_eq!(
            format_runs("See [Game](u) and **this**", false),
            vec![text("See [Game](u) and "), bold("this")]
        );
    }
}
