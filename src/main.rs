use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use smart_quiz::config::{self, Settings, StoreLocation};
use smart_quiz::library::{self, Library};
use smart_quiz::logging::{self, LogTarget};
use smart_quiz::protocol::DEFAULT_PORT;
use smart_quiz::{App, NewQuiz, Parser as QuestionParser, Question, QuizCollection, QuizStore, data};
use uuid::Uuid;

const DEFAULT_DATA_FILE: &str = "quizzes.json";
const CLI_LOG_DIRECTIVE: &str = "smart_quiz=info";
const UI_LOG_DIRECTIVE: &str = "smart_quiz=debug";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file overriding question prefixes, option letters and markers
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the quiz collection server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// JSON file the collection is kept in
        #[arg(short, long, default_value = DEFAULT_DATA_FILE)]
        data: PathBuf,
    },
    /// Parse a text or JSON question file and print the questions as JSON
    Parse {
        /// Question file, or `-` to read text from stdin
        file: PathBuf,
    },
    /// Parse a file and save it to the collection
    Import {
        /// Question file, or `-` to read text from stdin
        file: PathBuf,

        /// Quiz name, defaults to "Quiz <today>"
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        store: StoreArgs,
    },
    /// List stored quizzes, newest first
    List {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Delete a stored quiz
    Delete {
        id: Uuid,

        #[command(flatten)]
        store: StoreArgs,
    },
    /// Take quizzes in the terminal
    Play {
        /// Question file loaded as the draft
        file: Option<PathBuf>,

        /// Time limit in minutes
        #[arg(short, long, default_value_t = config::DEFAULT_TIME_LIMIT_MINUTES)]
        time_limit: u32,

        /// Shuffle question order
        #[arg(short, long)]
        shuffle: bool,

        /// Write logs to this file while the quiz is running
        #[arg(long)]
        log_file: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Collection server address (host:port or ws:// URL)
    #[arg(long, conflicts_with = "data")]
    server: Option<String>,

    /// Local collection file, used when no server is given
    #[arg(long)]
    data: Option<PathBuf>,
}

impl StoreArgs {
    fn location(&self) -> StoreLocation {
        match (&self.server, &self.data) {
            (Some(addr), _) => StoreLocation::Remote(addr.clone()),
            (None, Some(path)) => StoreLocation::File(path.clone()),
            (None, None) => StoreLocation::File(PathBuf::from(DEFAULT_DATA_FILE)),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_target = match &cli.command {
        Command::Play { log_file: Some(path), .. } => LogTarget::File(path.clone()),
        Command::Play { log_file: None, .. } => LogTarget::Off,
        _ => LogTarget::Stderr,
    };
    let directive = match log_target {
        LogTarget::File(_) => UI_LOG_DIRECTIVE,
        _ => CLI_LOG_DIRECTIVE,
    };
    if let Err(e) = logging::init(log_target, directive) {
        eprintln!("Error opening log file: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let parser = config::load_parser(cli.rules.as_deref())?;

    match cli.command {
        Command::Serve { port, data } => {
            let collection = QuizCollection::open(&data)?;
            println!(
                "Serving {} quizzes from {} on port {}",
                collection.len(),
                data.display(),
                port
            );
            smart_quiz::server::run(port, collection).await?;
        }
        Command::Parse { file } => {
            let questions = read_questions(&file, &parser)?;
            println!("{}", serde_json::to_string_pretty(&questions)?);
        }
        Command::Import { file, name, store } => {
            let questions = read_questions(&file, &parser)?;
            let name = name.unwrap_or_else(library::default_quiz_name);

            let mut store = store.location().open()?;
            let document = store.create(NewQuiz::new(name, questions)).await?;
            println!("Saved \"{}\" ({} questions) as {}", document.name, document.count, document.id);
        }
        Command::List { store } => {
            let mut store = store.location().open()?;
            let quizzes = store.list().await?;
            if quizzes.is_empty() {
                println!("No quizzes stored");
            }
            for quiz in quizzes {
                println!(
                    "{}  {:>4} questions  {}  {}",
                    quiz.id,
                    quiz.count,
                    quiz.created_at.format("%d/%m/%Y %H:%M"),
                    quiz.name
                );
            }
        }
        Command::Delete { id, store } => {
            let mut store = store.location().open()?;
            store.delete(id).await?;
            println!("Deleted {}", id);
        }
        Command::Play {
            file,
            time_limit,
            shuffle,
            store,
            ..
        } => {
            let mut library = Library::new();
            if let Some(path) = file {
                library.upload(&path, &parser)?;
            }

            let mut store = store.location().open()?;
            let mut app = App::new(library, Settings::new(time_limit, shuffle), parser);
            smart_quiz::app::run(&mut app, &mut store).await?;
        }
    }

    Ok(())
}

/// Load questions from `file`, or parse stdin when `file` is `-`.
fn read_questions(file: &Path, parser: &QuestionParser) -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    if file == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(data::ingest_text(&text, parser)?);
    }
    Ok(data::load_questions_from_path(file, parser)?)
}
