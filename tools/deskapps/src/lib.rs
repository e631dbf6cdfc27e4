pub mod atm;
pub mod codec;
pub mod commands;
pub mod config;
pub mod contacts;
pub mod errors;
pub mod file_sync;
pub mod guess;
pub mod log_retention;
pub mod logging;
pub mod record_store;
pub mod runtime;
pub mod shell;
pub mod students;
pub mod types;
pub mod words;

use atm::{Atm, BankAccount};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use config::{absolutize_path, data_file_for, load_config, AppConfig, CliOverrides};
use contacts::ContactDesk;
use errors::DeskError;
use guess::{GuessGame, GuessRules};
use logging::{JsonlLogger, SessionLog};
use runtime::ProductionRuntime;
use shell::{run_session, Desk};
use students::StudentDesk;
use types::{AppKind, RuntimeScope};
use words::WordCounter;

#[derive(Debug, Clone, Parser)]
#[command(name = "deskapps")]
#[command(about = "Guessing game, word counter, student records, ATM and address book")]
pub struct Cli {
    #[arg(value_enum)]
    pub app: CliApp,
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    #[arg(long)]
    pub working_dir: Option<std::path::PathBuf>,
    /// Backing file for `students` or `contacts`.
    #[arg(long)]
    pub data_file: Option<std::path::PathBuf>,
    /// Seed for the guessing game's number generator.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliApp {
    Guess,
    Words,
    Students,
    Atm,
    Contacts,
}

impl From<CliApp> for AppKind {
    fn from(value: CliApp) -> Self {
        match value {
            CliApp::Guess => AppKind::Guess,
            CliApp::Words => AppKind::Words,
            CliApp::Students => AppKind::Students,
            CliApp::Atm => AppKind::Atm,
            CliApp::Contacts => AppKind::Contacts,
        }
    }
}

pub fn run() -> Result<i32, DeskError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| DeskError::Io(e.to_string()))?;
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
    runtime: &ProductionRuntime,
) -> Result<i32, DeskError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(DeskError::Cli(clap_message(&error))),
        },
    };

    let app = AppKind::from(cli.app);
    if cli.data_file.is_some() && !app.persists_records() {
        return Err(DeskError::Cli(format!(
            "--data-file only applies to students and contacts, not {}",
            app.as_str()
        )));
    }

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        working_dir: cli.working_dir.clone(),
        data_file: cli.data_file.clone(),
        seed: cli.seed,
        app: Some(app),
    };
    let (cfg, scope) = load_config(&overrides, cwd, runtime.file_system.as_ref())?;

    let mut desk = build_desk(app, &cfg, &scope, runtime)?;
    let log = session_log(app, &cfg, &scope);
    run_session(desk.as_mut(), runtime.terminal.as_ref(), &log)?;
    Ok(0)
}

pub fn build_desk(
    app: AppKind,
    cfg: &AppConfig,
    scope: &RuntimeScope,
    runtime: &ProductionRuntime,
) -> Result<Box<dyn Desk>, DeskError> {
    let desk: Box<dyn Desk> = match app {
        AppKind::Guess => {
            let rules = GuessRules {
                min: cfg.guess.min,
                max: cfg.guess.max,
                max_attempts: cfg.guess.max_attempts,
            };
            let seed = cfg.guess.seed.unwrap_or_else(|| clock_seed(runtime));
            Box::new(GuessGame::new(rules, seed)?)
        }
        AppKind::Words => Box::new(WordCounter::new(
            &cfg.words.stop_words,
            cfg.words.ignore_common,
        )?),
        AppKind::Atm => Box::new(Atm::new(BankAccount::with_balance(
            cfg.atm.initial_balance,
        ))),
        AppKind::Students | AppKind::Contacts => {
            let path = data_file_for(cfg, scope, app).ok_or_else(|| {
                DeskError::InvalidConfig(format!("no data file for {}", app.as_str()))
            })?;
            let fs = runtime.file_system.clone();
            if app == AppKind::Students {
                Box::new(StudentDesk::new(fs, path))
            } else {
                Box::new(ContactDesk::new(fs, path))
            }
        }
    };
    Ok(desk)
}

fn session_log(app: AppKind, cfg: &AppConfig, scope: &RuntimeScope) -> SessionLog {
    if !cfg.logging.enabled {
        return SessionLog::disabled();
    }
    let dir = absolutize_path(&scope.working_dir, &cfg.logging.dir);
    let mut logger = JsonlLogger::for_app(dir, app);
    logger.max_payload_bytes = cfg.logging.max_payload_bytes;
    logger.budget_bytes = cfg.logging.budget_bytes;
    SessionLog::new(logger)
}

fn clock_seed(runtime: &ProductionRuntime) -> u64 {
    runtime
        .clock
        .now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// Clap renders its own `error: ` prefix; `DeskError::Cli` adds one already.
fn clap_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    rendered
        .strip_prefix("error: ")
        .unwrap_or(&rendered)
        .trim_end()
        .to_string()
}

pub fn render_help() -> String {
    let mut cmd = Cli::command();
    let mut buffer = Vec::new();
    if cmd.write_long_help(&mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
