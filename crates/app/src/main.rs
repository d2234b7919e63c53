use std::fmt;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use fakefinder_core::model::{QuizSettingsDraft, Side};
use services::{
    AnswerFeedback, CatalogHandle, FinalReport, QuizIntent, QuizService, QuizUpdate,
    RestartTarget, RoundView, SessionError, SessionProgress, SessionState,
};
use storage::JsonFileCatalog;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCatalog { raw: String },
    InvalidRounds { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCatalog { raw } => write!(f, "invalid --catalog value: {raw:?}"),
            ArgsError::InvalidRounds { raw } => write!(f, "invalid --rounds value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone)]
struct Args {
    catalog: PathBuf,
    rounds: Option<u32>,
    seed: Option<u64>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--catalog <path>] [--rounds <n>] [--seed <u64>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --catalog image_mapping.json");
    eprintln!("  --rounds 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FAKEFINDER_CATALOG, FAKEFINDER_ROUNDS, FAKEFINDER_SEED, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut catalog = std::env::var("FAKEFINDER_CATALOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("image_mapping.json"), PathBuf::from);
        let mut rounds = std::env::var("FAKEFINDER_ROUNDS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok());
        let mut seed = std::env::var("FAKEFINDER_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => {
                    let value = require_value(args, "--catalog")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidCatalog { raw: value });
                    }
                    catalog = PathBuf::from(value);
                }
                "--rounds" => {
                    let value = require_value(args, "--rounds")?;
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidRounds { raw: value.clone() })?;
                    rounds = Some(parsed);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            catalog,
            rounds,
            seed,
        })
    }
}

fn init_tracing() {
    // Logs go to stderr and stay quiet by default so they do not interleave with the quiz.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Intent(QuizIntent),
    Help,
    Quit,
}

/// Map one line of input to a command. An empty line does the obvious next thing.
fn parse_command(line: &str, state: SessionState) -> Option<Command> {
    let command = match line.trim().to_ascii_lowercase().as_str() {
        "a" | "1" | "left" => Command::Intent(QuizIntent::Select(Side::Left)),
        "b" | "2" | "right" => Command::Intent(QuizIntent::Select(Side::Right)),
        "s" | "start" => Command::Intent(QuizIntent::Start),
        "n" | "next" => Command::Intent(QuizIntent::Advance),
        "p" | "again" => Command::Intent(QuizIntent::Restart(RestartTarget::Play)),
        "r" | "restart" => Command::Intent(QuizIntent::Restart(RestartTarget::Welcome)),
        "h" | "home" => Command::Intent(QuizIntent::GoHome),
        "?" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "" => match state {
            SessionState::Welcome => Command::Intent(QuizIntent::Start),
            SessionState::RoundAnswered => Command::Intent(QuizIntent::Advance),
            SessionState::Finished => Command::Intent(QuizIntent::Restart(RestartTarget::Play)),
            SessionState::InProgress => return None,
        },
        _ => return None,
    };
    Some(command)
}

//
// ─── OUTPUT ────────────────────────────────────────────────────────────────────
//

fn print_help() {
    println!("  a / b    pick image A (left) or image B (right) as the deepfake");
    println!("  n        next round");
    println!("  p        play again with new rounds");
    println!("  r        restart to the welcome screen");
    println!("  h        back to the welcome screen");
    println!("  q        quit");
    println!("  <enter>  start, continue, or play again");
}

fn render_welcome(total_rounds: u32) {
    println!();
    println!("FakeFinder: spot the AI-generated image.");
    println!("Each round shows two images. One is real, one is a deepfake.");
    println!("{total_rounds} rounds. Press enter to start, ? for help.");
}

fn render_round(view: &RoundView) {
    println!();
    println!(
        "Round {}/{}    score {} ({}%)",
        view.round_number, view.total_rounds, view.score, view.percentage
    );
    println!("  A: {}", view.left_image);
    println!("  B: {}", view.right_image);
    println!("Which one is the deepfake? [a/b]");
}

fn render_feedback(feedback: &AnswerFeedback) {
    let mark = if feedback.correct { "+" } else { "x" };
    println!(
        "[{mark}] {}  (deepfake: Image {})",
        feedback.message,
        feedback.synthetic_side.label()
    );
    println!("Score {} ({}%)", feedback.score, feedback.percentage);
    if feedback.is_last_round {
        println!("Press enter to see your results.");
    } else {
        println!("Press enter for the next round.");
    }
}

fn render_report(report: &FinalReport) {
    println!();
    println!("Quiz complete!");
    println!(
        "You spotted {} of {} deepfakes ({}%).",
        report.score, report.total_rounds, report.percentage
    );
    println!("{}", report.message);
    println!("Press enter to play again, h for home, q to quit.");
}

fn render_abandoned(progress: SessionProgress) {
    if progress.answered > 0 && !progress.is_complete {
        println!(
            "Left the quiz after {} of {} rounds.",
            progress.answered, progress.total
        );
    }
}

fn render(update: &QuizUpdate, total_rounds: u32) {
    match update {
        QuizUpdate::Round(view) => render_round(view),
        QuizUpdate::Answered(feedback) => render_feedback(feedback),
        QuizUpdate::Finished(report) => render_report(report),
        QuizUpdate::Home => render_welcome(total_rounds),
    }
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

//
// ─── LOOP ──────────────────────────────────────────────────────────────────────
//

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut draft = QuizSettingsDraft::new();
    if let Some(rounds) = args.rounds {
        draft = draft.with_total_rounds(rounds);
    }
    let settings = draft.validate()?;
    let total_rounds = settings.total_rounds();

    tracing::info!(catalog = %args.catalog.display(), "loading catalog");
    let catalog = CatalogHandle::spawn(Arc::new(JsonFileCatalog::new(&args.catalog)));
    let mut service = match args.seed {
        Some(seed) => QuizService::seeded(settings, catalog, seed),
        None => QuizService::new(settings, catalog),
    };

    render_welcome(total_rounds);
    let mut notice_shown = false;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = parse_command(&line, service.session().state()) else {
            println!("Unrecognized input. Type ? for help.");
            continue;
        };

        let intent = match command {
            Command::Quit => break,
            Command::Help => {
                print_help();
                continue;
            }
            Command::Intent(intent) => intent,
        };

        let before = service.session().progress();
        let result = match service.apply(intent) {
            Err(SessionError::NotReady) => {
                println!("Loading images...");
                service.start_when_ready().await.map(QuizUpdate::Round)
            }
            other => other,
        };

        if !notice_shown && let Some(notice) = service.catalog_notice() {
            println!("Note: {notice}");
            notice_shown = true;
        }

        match result {
            Ok(update) => {
                if intent == QuizIntent::GoHome {
                    render_abandoned(before);
                }
                render(&update, total_rounds);
            }
            // A second pick in the same round is ignored.
            Err(SessionError::DuplicateSelection) => {}
            Err(err) => println!("{err}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
