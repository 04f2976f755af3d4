use std::sync::LazyLock;

use chrono::{DateTime, Month};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::opening::{OpeningLabel, parse_opening};

/// Result codes counted as a loss in a player's record. Codes that are neither
/// this nor `win` count as draws.
const LOSS_RESULTS: [&str; 5] = ["checkmated", "resigned", "timeout", "abandoned", "lose"];

/// Shown when a game has no usable opening URL.
pub const UNKNOWN_OPENING: &str = "Unknown";

/// How many trailing moves a card keeps.
const FINAL_MOVES: usize = 5;

static MOVE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\.").expect("valid regex"));

static PGN_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("valid regex"));

static PGN_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));

/// A move number with the one or two moves after it, e.g. `12. Nf3 Nc6`.
static NUMBERED_MOVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\.\s*\S+(?:\s+\S+)?").expect("valid regex"));

/// A single game as returned by the analyzer backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Game {
    pub url: String,
    pub pgn: String,
    pub time_control: String,
    /// Unix seconds.
    pub end_time: i64,
    pub rated: bool,
    /// bullet, blitz, rapid, daily
    pub time_class: String,
    pub rules: String,
    pub white_username: String,
    pub white_rating: u32,
    pub white_result: String,
    pub black_username: String,
    pub black_rating: u32,
    pub black_result: String,
    /// Opening URL, e.g. `https://www.chess.com/openings/Italian-Game`
    pub eco: Option<String>,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            url: String::new(),
            pgn: String::new(),
            time_control: String::new(),
            end_time: 0,
            rated: false,
            time_class: String::new(),
            rules: "chess".to_string(),
            white_username: String::new(),
            white_rating: 0,
            white_result: String::new(),
            black_username: String::new(),
            black_rating: 0,
            black_result: String::new(),
            eco: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Map a Chess.com result code (`win`, `checkmated`, `agreed`, ...) for one
    /// player to an outcome. Unknown codes count as a loss.
    pub fn from_result(result: &str) -> Self {
        if result == "win" {
            Outcome::Win
        } else if result.contains("draw") || result == "stalemate" {
            Outcome::Draw
        } else {
            Outcome::Loss
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Outcome::Win => "Win",
            Outcome::Draw => "Draw",
            Outcome::Loss => "Loss",
        })
    }
}

impl Game {
    /// The side `username` played. Anyone who is not white is taken to be black.
    pub fn side_of(&self, username: &str) -> Side {
        if self.white_username.to_lowercase() == username.to_lowercase() {
            Side::White
        } else {
            Side::Black
        }
    }

    pub fn username(&self, side: Side) -> &str {
        match side {
            Side::White => &self.white_username,
            Side::Black => &self.black_username,
        }
    }

    pub fn rating(&self, side: Side) -> u32 {
        match side {
            Side::White => self.white_rating,
            Side::Black => self.black_rating,
        }
    }

    pub fn result(&self, side: Side) -> &str {
        match side {
            Side::White => &self.white_result,
            Side::Black => &self.black_result,
        }
    }

    pub fn opening(&self) -> Option<OpeningLabel> {
        parse_opening(self.eco.as_deref())
    }

    /// The opening as one display string, or `Unknown`.
    pub fn opening_name(&self) -> String {
        opening_name(self.opening().as_ref())
    }

    pub fn is_win(&self, username: &str) -> bool {
        self.result(self.side_of(username)) == "win"
    }

    pub fn is_loss(&self, username: &str) -> bool {
        LOSS_RESULTS.contains(&self.result(self.side_of(username)))
    }

    /// The last move number in the PGN movetext, 0 without moves.
    pub fn move_count(&self) -> u32 {
        let movetext = movetext(&self.pgn);
        MOVE_NUMBER
            .captures_iter(&movetext)
            .last()
            .and_then(|caps| caps.get(1))
            .and_then(|number| number.as_str().parse().ok())
            .unwrap_or(0)
    }

    /// The last `n` numbered moves of the PGN, joined by spaces.
    pub fn last_moves(&self, n: usize) -> String {
        let movetext = movetext(&self.pgn);
        let moves: Vec<&str> = NUMBERED_MOVE
            .find_iter(&movetext)
            .map(|m| m.as_str())
            .collect();
        moves[moves.len().saturating_sub(n)..].join(" ")
    }
}

fn opening_name(label: Option<&OpeningLabel>) -> String {
    label
        .map(ToString::to_string)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_OPENING.to_string())
}

/// PGN without tag pairs and `{...}` comments such as clock annotations.
fn movetext(pgn: &str) -> String {
    let without_comments = PGN_COMMENT.replace_all(pgn, "");
    PGN_TAG.replace_all(&without_comments, "").into_owned()
}

/// What the game grid shows for one game, seen from the searched player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameCard {
    pub side: Side,
    pub outcome: Outcome,
    pub player_rating: u32,
    pub opponent: String,
    pub opponent_rating: u32,
    pub time_class: String,
    /// e.g. `Oct 31, 2023`; empty when the timestamp is out of range
    pub date: String,
    pub opening: Option<OpeningLabel>,
    pub moves: u32,
    /// The last few numbered moves, e.g. `41. Kg2 Qe2+ 42. Kg1 Qe1+`
    pub final_moves: String,
    pub url: String,
}

impl GameCard {
    pub fn new(game: &Game, username: &str) -> Self {
        let side = game.side_of(username);
        let opponent = side.opposite();

        Self {
            side,
            outcome: Outcome::from_result(game.result(side)),
            player_rating: game.rating(side),
            opponent: game.username(opponent).to_string(),
            opponent_rating: game.rating(opponent),
            time_class: game.time_class.clone(),
            date: format_date(game.end_time),
            opening: game.opening(),
            moves: game.move_count(),
            final_moves: game.last_moves(FINAL_MOVES),
            url: game.url.clone(),
        }
    }

    pub fn opening_name(&self) -> String {
        opening_name(self.opening.as_ref())
    }
}

fn format_date(end_time: i64) -> String {
    DateTime::from_timestamp(end_time, 0)
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Which games of a history to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimeClassFilter {
    #[default]
    All,
    Only(String),
}

impl TimeClassFilter {
    pub fn matches(&self, game: &Game) -> bool {
        match self {
            TimeClassFilter::All => true,
            TimeClassFilter::Only(class) => &game.time_class == class,
        }
    }
}

impl From<Option<String>> for TimeClassFilter {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(class) if class != "all" => TimeClassFilter::Only(class),
            _ => TimeClassFilter::All,
        }
    }
}

/// One month of games for a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistory {
    pub username: String,
    pub total_games: usize,
    pub games: Vec<Game>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryJson {
    History(GameHistory),
    Games(Vec<Game>),
}

impl GameHistory {
    pub fn new(username: impl Into<String>, games: Vec<Game>) -> Self {
        Self {
            username: username.into(),
            total_games: games.len(),
            games,
        }
    }

    /// Read a history response, or a bare array of games with no username.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(match serde_json::from_str(json)? {
            HistoryJson::History(history) => history,
            HistoryJson::Games(games) => Self::new(String::new(), games),
        })
    }

    /// Distinct time classes in the order they first appear.
    pub fn time_classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = Vec::new();
        for game in &self.games {
            if !classes.contains(&game.time_class.as_str()) {
                classes.push(&game.time_class);
            }
        }
        classes
    }

    pub fn filter<'a>(&'a self, filter: &'a TimeClassFilter) -> impl Iterator<Item = &'a Game> {
        self.games.iter().filter(move |game| filter.matches(game))
    }

    /// The searched player's record over every game in the history.
    pub fn record(&self) -> Record {
        Record::tally(&self.games, &self.username)
    }

    pub fn cards(&self, filter: &TimeClassFilter) -> Vec<GameCard> {
        self.filter(filter)
            .map(|game| GameCard::new(game, &self.username))
            .collect()
    }
}

/// Wins, losses and draws over a set of games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Record {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub total: usize,
}

impl Record {
    pub fn tally<'a>(games: impl IntoIterator<Item = &'a Game>, username: &str) -> Self {
        let mut record = Record::default();
        for game in games {
            record.total += 1;
            if game.is_win(username) {
                record.wins += 1;
            } else if game.is_loss(username) {
                record.losses += 1;
            }
        }
        record.draws = record.total - record.wins - record.losses;
        record
    }

    /// `count` as a percentage of all games; 0 for an empty record.
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn win_percent(&self) -> f64 {
        self.percent(self.wins)
    }

    pub fn loss_percent(&self) -> f64 {
        self.percent(self.losses)
    }

    pub fn draw_percent(&self) -> f64 {
        self.percent(self.draws)
    }
}

/// A monthly archive, as listed by `/games/archives`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ArchiveMonth {
    pub year: i32,
    pub month: u32,
}

impl ArchiveMonth {
    /// Parse `https://api.chess.com/pub/player/{user}/games/{YYYY}/{MM}`.
    pub fn from_url(url: &str) -> Option<Self> {
        let mut segments = url.trim_end_matches('/').rsplit('/');
        let month: u32 = segments.next()?.parse().ok()?;
        let year: i32 = segments.next()?.parse().ok()?;

        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// `YYYY/MM`, as used in the games endpoint.
    pub fn path(&self) -> String {
        format!("{}/{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for ArchiveMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("?");
        write!(f, "{name} {}", self.year)
    }
}
