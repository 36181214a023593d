use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vocabdrill::app::{ActiveRound, Trainer};
use vocabdrill::config::Config;
use vocabdrill::dictionary::{Entry, Language, VocabularyView};
use vocabdrill::event::{AppEvent, EventHandler};
use vocabdrill::session::outcome::{Choice, Verdict};
use vocabdrill::session::quiz::QuizPhase;
use vocabdrill::session::DrillKind;
use vocabdrill::store::{JsonStore, PracticeStore};

#[derive(Parser)]
#[command(name = "vocabdrill", version, about = "Vocabulary trainer with mistake-weighted drills")]
struct Cli {
    #[arg(long, global = true, help = "Directory holding dictionary and progress files")]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Language to practice (telugu, konkani)")]
    language: Option<Language>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Multiple-choice translation quiz on the terminal
    Quiz,
    /// Entries missed most often
    Mistakes {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Fuzzy search across English and both translations
    Search { query: String },
    /// Dictionary size, high score and ledger totals
    Stats,
    /// Load a JSON array of entries into the dictionary
    Seed { file: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(language) = cli.language {
        config.learning_language = language;
    }
    let data_dir = cli.data_dir.or_else(|| config.data_path());
    let store = match data_dir {
        Some(dir) => JsonStore::with_base_dir(dir)?,
        None => JsonStore::new()?,
    };

    match cli.command {
        Command::Quiz => run_quiz(config, store),
        Command::Mistakes { top } => {
            let ledger = store.load_ledger()?;
            if ledger.is_empty() {
                println!("No mistakes recorded yet.");
            }
            for (identity, count) in ledger.most_missed(top) {
                println!("{count:>4}  {identity}");
            }
            Ok(())
        }
        Command::Search { query } => {
            let view = VocabularyView::new(store.load_entries()?);
            let language = config.learning_language;
            for entry in view.search(&query) {
                println!("{}  ->  {}", entry.english, entry.translation(language));
            }
            Ok(())
        }
        Command::Stats => {
            let view = VocabularyView::new(store.load_entries()?);
            let ledger = store.load_ledger()?;
            println!("words:        {}", view.words().len());
            println!("phrases:      {}", view.phrases().len());
            println!("high score:   {}", store.load_high_score()?);
            println!("missed items: {} ({} misses)", ledger.len(), ledger.total());
            Ok(())
        }
        Command::Seed { file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let entries: Vec<Entry> = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", file.display()))?;
            let kept = VocabularyView::new(entries);
            if kept.is_empty() {
                bail!("{} holds no entries", file.display());
            }
            store.save_entries(kept.all())?;
            println!("Stored {} entries.", kept.len());
            Ok(())
        }
    }
}

fn run_quiz(config: Config, store: JsonStore) -> Result<()> {
    let language = config.learning_language;
    let mut trainer = Trainer::new(config, Box::new(store));
    let handle = trainer.start_round(DrillKind::Quiz)?;
    let events = EventHandler::new(Duration::from_millis(50));

    println!("Translate into {language}. Answer with 1-4, q to quit.");
    let mut shown: Option<u32> = None;

    loop {
        if let Some(ActiveRound::Quiz(quiz)) = trainer.active()
            && quiz.phase() == QuizPhase::AwaitingAnswer
            && shown != Some(quiz.asked())
        {
            shown = Some(quiz.asked());
            let question = quiz.question();
            println!();
            println!("{}", question.prompt());
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}. {option}", i + 1);
            }
        }

        match events.next()? {
            AppEvent::Tick(elapsed) => {
                trainer.tick(handle, elapsed);
            }
            AppEvent::Line(line) => {
                let line = line.trim();
                if line.eq_ignore_ascii_case("q") {
                    break;
                }
                let Some(pick) = line.parse::<usize>().ok().filter(|n| *n >= 1) else {
                    println!("Enter a number between 1 and 4.");
                    continue;
                };
                let outcome = trainer.submit_answer(handle, Choice::Answer(pick - 1))?;
                match outcome.verdict {
                    Verdict::Correct => {
                        println!("Correct!");
                        // Nothing left to animate on a terminal.
                        trainer.submit_answer(handle, Choice::Continue)?;
                    }
                    Verdict::Incorrect => {
                        if let Some(ActiveRound::Quiz(quiz)) = trainer.active() {
                            println!("Wrong: the answer was {}.", quiz.question().answer());
                        }
                    }
                    Verdict::Accepted | Verdict::Ignored => {}
                }
            }
            AppEvent::Eof => break,
        }
    }

    if let Some(ActiveRound::Quiz(quiz)) = trainer.active() {
        let (correct, asked) = quiz.tally();
        println!("Score: {correct}/{asked}");
    }
    trainer.teardown(handle);
    Ok(())
}
