use serde::Serialize;

/// Words that mark the start of a variation name in an opening slug.
const VARIATION_KEYWORDS: [&str; 8] = [
    "Variation",
    "Defense",
    "Attack",
    "Gambit",
    "System",
    "Line",
    "Accepted",
    "Declined",
];

const OPENINGS_SEGMENT: &str = "/openings/";

/// Opening name split into its main line and an optional variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningLabel {
    pub main: String,
    pub variation: Option<String>,
}

impl std::fmt::Display for OpeningLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.variation, self.main.is_empty()) {
            (Some(variation), true) => write!(f, "{variation}"),
            (Some(variation), false) => write!(f, "{}: {variation}", self.main),
            (None, _) => write!(f, "{}", self.main),
        }
    }
}

fn is_keyword(word: &str) -> bool {
    VARIATION_KEYWORDS.contains(&word)
}

/// Split a Chess.com ECO opening URL into a label.
///
/// Returns `None` when the URL is missing, empty, or has no `/openings/`
/// segment. When the first keyword is also the first word, `main` is empty.
pub fn parse_opening(eco_url: Option<&str>) -> Option<OpeningLabel> {
    let url = eco_url.filter(|url| !url.is_empty())?;
    let (_, slug) = url.split_once(OPENINGS_SEGMENT)?;

    let phrase = slug.replace('-', " ");
    let words: Vec<&str> = phrase.split_whitespace().collect();

    let Some(hit) = words.iter().position(|word| is_keyword(word)) else {
        return Some(OpeningLabel {
            main: words.join(" "),
            variation: None,
        });
    };

    let mut start = hit;
    while start > 0 && is_keyword(words[start - 1]) {
        start -= 1;
    }

    Some(OpeningLabel {
        main: words[..start].join(" "),
        variation: Some(words[start..].join(" ")),
    })
}
