//! `timewise`: parse a timetable photo, track attendance, and ask the
//! schedule assistant questions from the terminal.

mod display;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use timewise_ai::config::{DEFAULT_MODELS, DEFAULT_VERSIONS, candidates};
use timewise_ai::{AiSettings, ApiVersion, ChatContext, ScheduleAssistant};
use timewise_core::{CalendarEvent, DEFAULT_TARGET_PERCENT, EventKind};
use timewise_store::{JsonFileBackend, Mark, STORAGE_FILE, StateBackend, Store};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timewise", version, about = "Timetable parsing and attendance tracking")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// State file
    #[arg(long, global = true, env = "TIMEWISE_STORE", default_value = STORAGE_FILE)]
    store: PathBuf,

    /// Model to try, in order (repeatable; defaults to the built-in chain)
    #[arg(long = "model", global = true)]
    models: Vec<String>,

    /// API version to try for each model: v1beta or v1 (repeatable)
    #[arg(long = "api-version", global = true)]
    api_versions: Vec<ApiVersion>,

    /// Sampling temperature for every request
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Output token cap for every request
    #[arg(long, global = true)]
    max_output_tokens: Option<u32>,

    /// Minimum attendance percentage
    #[arg(long, global = true, default_value_t = DEFAULT_TARGET_PERCENT,
          value_parser = clap::value_parser!(u32).range(1..=100))]
    target: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a timetable image and replace the stored timetable
    Parse {
        image: PathBuf,
        /// MIME type; inferred from the file extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// Show the stored timetable
    Timetable,
    /// Move a subject's classes from one day to another
    Reschedule {
        subject: String,
        from: String,
        to: String,
    },
    /// Ask the schedule assistant
    Chat { query: String },
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    #[command(subcommand)]
    Events(EventsCommand),
}

#[derive(Subcommand)]
enum AttendanceCommand {
    /// Attendance per subject against the target
    List,
    /// Record one class
    Mark {
        subject: String,
        #[arg(value_enum)]
        mark: MarkArg,
    },
    /// Overwrite the counts for a subject
    Edit {
        subject: String,
        attended: u32,
        missed: u32,
    },
    /// Forget a subject's record
    Reset { subject: String },
    /// Add empty records for every timetable subject
    Sync,
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List events, optionally only those on one date
    List {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    Add {
        title: String,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long, value_enum, default_value = "other")]
        kind: KindArg,
        #[arg(long)]
        description: Option<String>,
    },
    Remove { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum MarkArg {
    Present,
    Absent,
}

impl From<MarkArg> for Mark {
    fn from(m: MarkArg) -> Self {
        match m {
            MarkArg::Present => Mark::Present,
            MarkArg::Absent => Mark::Absent,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Holiday,
    Duty,
    Absence,
    Exam,
    Other,
}

impl From<KindArg> for EventKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Holiday => EventKind::Holiday,
            KindArg::Duty => EventKind::Duty,
            KindArg::Absence => EventKind::Absence,
            KindArg::Exam => EventKind::Exam,
            KindArg::Other => EventKind::Other,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("timewise v{}", env!("CARGO_PKG_VERSION"));
    let mut store = Store::open(JsonFileBackend::new(&cli.store))
        .with_context(|| format!("opening {}", cli.store.display()))?;

    match &cli.command {
        Command::Parse { image, mime } => {
            let mime = match mime {
                Some(m) => m.clone(),
                None => match mime_for_path(image) {
                    Some(m) => m.to_string(),
                    None => bail!("cannot infer image type of {}; pass --mime", image.display()),
                },
            };
            let bytes = tokio::fs::read(image)
                .await
                .with_context(|| format!("reading {}", image.display()))?;

            let assistant = ScheduleAssistant::new(ai_settings(&cli));
            let parsed = assistant.parse_schedule(&bytes, &mime).await?;
            for failure in &parsed.failures {
                tracing::warn!(candidate = %failure.candidate, error = %failure.error, "skipped");
            }
            store.set_timetable(parsed.timetable)?;
            store.sync_attendance()?;
            display::print_timetable(&store.state().timetable);
            println!("\nParsed with {}.", parsed.candidate);
        }
        Command::Timetable => display::print_timetable(&store.state().timetable),
        Command::Reschedule { subject, from, to } => {
            let change = timewise_core::Reschedule {
                subject: subject.clone(),
                from_day: from.clone(),
                to_day: to.clone(),
            };
            if store.reschedule_class(&change)? {
                println!("Moved {subject} from {from} to {to}.");
            } else {
                println!("No {subject} class found on {from}.");
            }
        }
        Command::Chat { query } => {
            let assistant = ScheduleAssistant::new(ai_settings(&cli));
            let state = store.snapshot();
            let context = ChatContext::from_state(&state.timetable, &state.attendance);
            let reply = assistant.chat(query, &context).await?;

            if !reply.reply.is_empty() {
                println!("{}", reply.reply);
            }
            for invocation in &reply.tool_invocations {
                let Some(change) = invocation.as_reschedule() else {
                    tracing::warn!(tool = %invocation.name, args = %invocation.args, "ignoring tool call");
                    continue;
                };
                if store.reschedule_class(&change)? {
                    println!(
                        "I've moved your {} class from {} to {} as requested.",
                        change.subject, change.from_day, change.to_day
                    );
                } else {
                    println!("I couldn't find {} on {}.", change.subject, change.from_day);
                }
            }
        }
        Command::Attendance(cmd) => run_attendance(&mut store, cmd, cli.target)?,
        Command::Events(cmd) => run_events(&mut store, cmd)?,
    }
    Ok(())
}

fn run_attendance(
    store: &mut Store<JsonFileBackend>,
    cmd: &AttendanceCommand,
    target: u32,
) -> anyhow::Result<()> {
    match cmd {
        AttendanceCommand::List => {}
        AttendanceCommand::Mark { subject, mark } => {
            store.mark_attendance(subject, (*mark).into())?;
        }
        AttendanceCommand::Edit {
            subject,
            attended,
            missed,
        } => {
            store.edit_attendance(subject, *attended, *missed)?;
        }
        AttendanceCommand::Reset { subject } => {
            store.reset_attendance(subject)?;
        }
        AttendanceCommand::Sync => {
            store.sync_attendance()?;
        }
    }
    display::print_attendance(&store.state().attendance, target);
    Ok(())
}

fn run_events(store: &mut Store<JsonFileBackend>, cmd: &EventsCommand) -> anyhow::Result<()> {
    match cmd {
        EventsCommand::List { date } => {
            let day = date.map(|d| d.format("%Y-%m-%d").to_string());
            let mut events: Vec<&CalendarEvent> = store
                .state()
                .events
                .iter()
                .filter(|e| day.as_deref().is_none_or(|d| e.date.starts_with(d)))
                .collect();
            events.sort_by(|a, b| a.date.cmp(&b.date));
            display::print_events(&events);
        }
        EventsCommand::Add {
            title,
            date,
            kind,
            description,
        } => {
            let id = record_event(store, title, *date, (*kind).into(), description.clone())?;
            println!("Added {id}");
        }
        EventsCommand::Remove { id } => {
            let before = store.state().events.len();
            if store.remove_event(id)?.events.len() == before {
                bail!("no event with id {id}");
            }
            println!("Removed {id}");
        }
    }
    Ok(())
}

/// Save a new event and return its id once the save has succeeded.
fn record_event<B: StateBackend>(
    store: &mut Store<B>,
    title: &str,
    date: NaiveDate,
    kind: EventKind,
    description: Option<String>,
) -> anyhow::Result<String> {
    let id = uuid::Uuid::new_v4().to_string();
    store.add_event(CalendarEvent {
        id: id.clone(),
        title: title.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        kind,
        description,
    })?;
    Ok(id)
}

/// Gemini accepts these image types inline.
fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

fn ai_settings(cli: &Cli) -> AiSettings {
    let mut settings = AiSettings::from_env();
    tracing::info!(key_len = settings.api_key.len(), "loaded AI settings");

    if !cli.models.is_empty() || !cli.api_versions.is_empty() {
        let models: Vec<&str> = if cli.models.is_empty() {
            DEFAULT_MODELS.to_vec()
        } else {
            cli.models.iter().map(String::as_str).collect()
        };
        let versions = if cli.api_versions.is_empty() {
            DEFAULT_VERSIONS
        } else {
            cli.api_versions.as_slice()
        };
        settings.candidates = candidates(&models, versions);
    }
    for generation in [&mut settings.parse_generation, &mut settings.chat_generation] {
        if let Some(t) = cli.temperature {
            generation.temperature = t;
        }
        if let Some(n) = cli.max_output_tokens {
            generation.max_output_tokens = n;
        }
    }
    settings
}
