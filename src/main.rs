use std::fs;
use std::path::{Path, PathBuf};

use chesslens::{Config, Error, GameHistory, Record, TimeClassFilter};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "chesslens")]
#[command(about = "Format AI chess analysis and Chess.com game history")]
struct Cli {
    #[command(flatten)]
    logging: LoggingOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
#[clap(group = ArgGroup::new("logging"))]
struct LoggingOpts {
    /// A level of verbosity, and can be used multiple times
    #[arg(short, long, action = clap::ArgAction::Count, global(true), group = "logging")]
    debug: u8,

    /// Enable warn logging
    #[arg(short, long, global(true), group = "logging")]
    warn: bool,

    /// Disable everything but error logging
    #[arg(short, long, global(true), group = "logging")]
    error: bool,
}

impl LoggingOpts {
    fn to_level_filter(&self) -> LevelFilter {
        if self.error {
            LevelFilter::ERROR
        } else if self.warn {
            LevelFilter::WARN
        } else {
            match self.debug {
                0 => LevelFilter::INFO,
                1 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            }
        }
    }

    fn configure_logging(&self) {
        tracing_subscriber::fmt()
            .with_max_level(self.to_level_filter())
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

#[derive(Subcommand)]
enum Command {
    /// Render analysis text to PDF
    Render {
        /// Input analysis text file
        input: PathBuf,

        /// Output PDF file (defaults to input name with .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print Typst markup to stdout instead of writing a PDF
        #[arg(long, conflicts_with = "json")]
        typst: bool,

        /// Print the parsed blocks as JSON instead of writing a PDF
        #[arg(long)]
        json: bool,

        /// Keep `[label](url)` as literal text
        #[arg(long)]
        no_links: bool,

        /// Title printed above the analysis
        #[arg(long)]
        title: Option<String>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Split an opening URL into main line and variation
    Opening {
        /// ECO URL, e.g. https://www.chess.com/openings/Italian-Game
        eco_url: String,
    },
    /// List games from a game history JSON file
    Games {
        /// Game history JSON file
        input: PathBuf,

        /// Player to view the games as (defaults to the history's username)
        #[arg(short, long)]
        username: Option<String>,

        /// Only show one time class (bullet, blitz, rapid, daily)
        #[arg(short, long)]
        time_class: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    cli.logging.configure_logging();

    let result = match cli.command {
        Command::Render {
            input,
            output,
            typst,
            json,
            no_links,
            title,
            config,
        } => render(RenderArgs {
            input,
            output,
            typst,
            json,
            no_links,
            title,
            config,
        }),
        Command::Opening { eco_url } => {
            opening(&eco_url);
            Ok(())
        }
        Command::Games {
            input,
            username,
            time_class,
        } => games(&input, username, time_class),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

struct RenderArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    typst: bool,
    json: bool,
    no_links: bool,
    title: Option<String>,
    config: Option<PathBuf>,
}

fn render(args: RenderArgs) -> chesslens::Result<()> {
    let analysis = read(&args.input)?;
    let blocks = chesslens::format_blocks_with(&analysis, !args.no_links);
    debug!(blocks = blocks.len(), "formatted analysis");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::compiled_default(),
    };
    if args.title.is_some() {
        config.document.title = args.title;
    }

    if args.typst {
        print!("{}", chesslens::blocks_to_typst(&blocks, &config));
        return Ok(());
    }

    let pdf_bytes = chesslens::blocks_to_pdf(&blocks, &config)?;
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("pdf"));

    fs::write(&output, pdf_bytes).map_err(|e| Error::file(&output, e))?;
    info!("Created {}", output.display());
    Ok(())
}

fn opening(eco_url: &str) {
    match chesslens::parse_opening(Some(eco_url)) {
        Some(label) => {
            println!("main:      {}", label.main);
            println!("variation: {}", label.variation.as_deref().unwrap_or("-"));
        }
        None => warn!("No opening name in {eco_url}"),
    }
}

fn games(input: &Path, username: Option<String>, time_class: Option<String>) -> chesslens::Result<()> {
    let mut history = GameHistory::from_json(&read(input)?)?;
    if let Some(username) = username {
        history.username = username;
    }
    if history.username.is_empty() {
        warn!("No username given; every game is shown from black's side");
    }

    let filter = TimeClassFilter::from(time_class);
    let cards = history.cards(&filter);

    for (n, card) in cards.iter().enumerate() {
        println!(
            "{:>3}. {:<4} {:<5} {:>4} vs {} ({})  {:<6} {:<12} {:>3} moves  {}",
            n + 1,
            card.outcome.to_string(),
            format!("{:?}", card.side),
            card.player_rating,
            card.opponent,
            card.opponent_rating,
            card.time_class,
            card.date,
            card.moves,
            card.opening_name(),
        );
        if !card.final_moves.is_empty() {
            println!("     final moves: {}", card.final_moves);
        }
    }

    let record = Record::tally(history.filter(&filter), &history.username);

    println!();
    println!("Username:      {}", history.username);
    println!("Total games:   {}", history.total_games);
    println!("Filtered:      {}", cards.len());
    println!("Time classes:  {}", history.time_classes().join(", "));
    println!("Wins:          {} ({:.1}%)", record.wins, record.win_percent());
    println!("Losses:        {} ({:.1}%)", record.losses, record.loss_percent());
    println!("Draws:         {} ({:.1}%)", record.draws, record.draw_percent());
    Ok(())
}

fn read(path: &Path) -> chesslens::Result<String> {
    let content = fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}
