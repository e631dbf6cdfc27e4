use crate::errors::DeskError;
use crate::logging::{DEFAULT_DISK_BUDGET_BYTES, DEFAULT_MAX_PAYLOAD_BYTES};
use crate::runtime::FileSystem;
use crate::types::{AppKind, RuntimeScope};
use crate::words::DEFAULT_STOP_WORDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub app: Option<AppKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub scope: ScopeConfig,
    pub storage: StorageConfig,
    pub guess: GuessConfig,
    pub words: WordsConfig,
    pub atm: AtmConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeConfig {
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub students_file: PathBuf,
    pub contacts_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessConfig {
    pub min: i32,
    pub max: i32,
    pub max_attempts: u32,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordsConfig {
    pub ignore_common: bool,
    pub stop_words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtmConfig {
    pub initial_balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scope: ScopeConfig { working_dir: None },
            storage: StorageConfig {
                students_file: PathBuf::from("students.txt"),
                contacts_file: PathBuf::from("contacts.txt"),
            },
            guess: GuessConfig {
                min: 1,
                max: 100,
                max_attempts: 7,
                seed: None,
            },
            words: WordsConfig {
                ignore_common: true,
                stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            },
            atm: AtmConfig { initial_balance: 0 },
            logging: LoggingConfig {
                enabled: true,
                dir: PathBuf::from(".deskapps/logs"),
                max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
                budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialAppConfig {
    scope: Option<PartialScopeConfig>,
    storage: Option<PartialStorageConfig>,
    guess: Option<PartialGuessConfig>,
    words: Option<PartialWordsConfig>,
    atm: Option<PartialAtmConfig>,
    logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialScopeConfig {
    working_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialStorageConfig {
    students_file: Option<PathBuf>,
    contacts_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialGuessConfig {
    min: Option<i32>,
    max: Option<i32>,
    max_attempts: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialWordsConfig {
    ignore_common: Option<bool>,
    stop_words: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAtmConfig {
    initial_balance: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialLoggingConfig {
    enabled: Option<bool>,
    dir: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
    budget_bytes: Option<u64>,
}

pub fn load_config(
    overrides: &CliOverrides,
    process_cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<(AppConfig, RuntimeScope), DeskError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| DeskError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);

    let scope = resolve_scope(process_cwd, &cfg, overrides);
    validate_config(&cfg)?;
    Ok((cfg, scope))
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(scope) = partial.scope {
        cfg.scope.working_dir = scope.working_dir;
    }

    if let Some(storage) = partial.storage {
        if let Some(value) = storage.students_file {
            cfg.storage.students_file = value;
        }
        if let Some(value) = storage.contacts_file {
            cfg.storage.contacts_file = value;
        }
    }

    if let Some(guess) = partial.guess {
        if let Some(value) = guess.min {
            cfg.guess.min = value;
        }
        if let Some(value) = guess.max {
            cfg.guess.max = value;
        }
        if let Some(value) = guess.max_attempts {
            cfg.guess.max_attempts = value;
        }
        if let Some(value) = guess.seed {
            cfg.guess.seed = Some(value);
        }
    }

    if let Some(words) = partial.words {
        if let Some(value) = words.ignore_common {
            cfg.words.ignore_common = value;
        }
        if let Some(value) = words.stop_words {
            cfg.words.stop_words = value;
        }
    }

    if let Some(atm) = partial.atm {
        if let Some(value) = atm.initial_balance {
            cfg.atm.initial_balance = value;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(value) = logging.enabled {
            cfg.logging.enabled = value;
        }
        if let Some(value) = logging.dir {
            cfg.logging.dir = value;
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
        if let Some(value) = logging.budget_bytes {
            cfg.logging.budget_bytes = value;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(seed) = overrides.seed {
        cfg.guess.seed = Some(seed);
    }
    if let (Some(data_file), Some(app)) = (&overrides.data_file, overrides.app) {
        match app {
            AppKind::Students => cfg.storage.students_file = data_file.clone(),
            AppKind::Contacts => cfg.storage.contacts_file = data_file.clone(),
            AppKind::Guess | AppKind::Words | AppKind::Atm => {}
        }
    }
}

pub fn resolve_scope(process_cwd: &Path, cfg: &AppConfig, overrides: &CliOverrides) -> RuntimeScope {
    let working_dir = if let Some(path) = &overrides.working_dir {
        absolutize_path(process_cwd, path)
    } else if let Some(path) = &cfg.scope.working_dir {
        absolutize_path(process_cwd, path)
    } else {
        process_cwd.to_path_buf()
    };

    RuntimeScope { working_dir }
}

pub fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

/// Backing file for a record-keeping app, resolved against the working dir.
pub fn data_file_for(cfg: &AppConfig, scope: &RuntimeScope, app: AppKind) -> Option<PathBuf> {
    let file = match app {
        AppKind::Students => &cfg.storage.students_file,
        AppKind::Contacts => &cfg.storage.contacts_file,
        AppKind::Guess | AppKind::Words | AppKind::Atm => return None,
    };
    Some(absolutize_path(&scope.working_dir, file))
}

fn validate_config(cfg: &AppConfig) -> Result<(), DeskError> {
    if cfg.guess.min >= cfg.guess.max {
        return Err(DeskError::InvalidConfig(
            "guess.min must be less than guess.max".to_string(),
        ));
    }

    if cfg.guess.max_attempts == 0 {
        return Err(DeskError::InvalidConfig(
            "guess.max_attempts must be greater than zero".to_string(),
        ));
    }

    if cfg.storage.students_file.as_os_str().is_empty()
        || cfg.storage.contacts_file.as_os_str().is_empty()
    {
        return Err(DeskError::InvalidConfig(
            "storage file names must not be empty".to_string(),
        ));
    }

    if cfg.atm.initial_balance < 0 {
        return Err(DeskError::InvalidConfig(
            "atm.initial_balance must not be negative".to_string(),
        ));
    }

    if cfg.logging.enabled && cfg.logging.dir.as_os_str().is_empty() {
        return Err(DeskError::InvalidConfig(
            "logging.dir is required when logging is enabled".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{data_file_for, load_config, AppConfig, CliOverrides};
    use crate::errors::DeskError;
    use crate::runtime::FakeFileSystem;
    use crate::types::AppKind;
    use std::path::{Path, PathBuf};

    fn overrides_for(config: &str) -> CliOverrides {
        CliOverrides {
            config_path: Some(PathBuf::from(config)),
            ..CliOverrides::default()
        }
    }

    #[test]
    fn defaults_apply_without_config_file() {
        let fs = FakeFileSystem::default();
        let (cfg, scope) =
            load_config(&CliOverrides::default(), Path::new("/home/u"), &fs).expect("config");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(scope.working_dir, PathBuf::from("/home/u"));
        assert_eq!(
            data_file_for(&cfg, &scope, AppKind::Students),
            Some(PathBuf::from("/home/u/students.txt"))
        );
        assert_eq!(data_file_for(&cfg, &scope, AppKind::Atm), None);
    }

    #[test]
    fn partial_sections_merge_over_defaults() {
        let fs = FakeFileSystem::with_file(
            "/cfg.toml",
            r#"
[guess]
max = 10
seed = 99
[words]
stop_words = ["foo"]
"#,
        );
        let (cfg, _) = load_config(&overrides_for("/cfg.toml"), Path::new("/"), &fs).expect("config");
        assert_eq!(cfg.guess.min, 1);
        assert_eq!(cfg.guess.max, 10);
        assert_eq!(cfg.guess.max_attempts, 7);
        assert_eq!(cfg.guess.seed, Some(99));
        assert_eq!(cfg.words.stop_words, vec!["foo".to_string()]);
        assert!(cfg.words.ignore_common);
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let fs = FakeFileSystem::with_file(
            "/cfg.toml",
            "[scope]\nworking_dir = \"data\"\n[guess]\nseed = 1\n",
        );
        let overrides = CliOverrides {
            seed: Some(2),
            data_file: Some(PathBuf::from("roster.txt")),
            app: Some(AppKind::Students),
            ..overrides_for("/cfg.toml")
        };
        let (cfg, scope) = load_config(&overrides, Path::new("/srv"), &fs).expect("config");
        assert_eq!(cfg.guess.seed, Some(2));
        assert_eq!(scope.working_dir, PathBuf::from("/srv/data"));
        assert_eq!(
            data_file_for(&cfg, &scope, AppKind::Students),
            Some(PathBuf::from("/srv/data/roster.txt"))
        );
        assert_eq!(cfg.storage.contacts_file, PathBuf::from("contacts.txt"));
    }

    #[test]
    fn invalid_range_is_rejected() {
        let fs = FakeFileSystem::with_file("/cfg.toml", "[guess]\nmin = 5\nmax = 5\n");
        let err = load_config(&overrides_for("/cfg.toml"), Path::new("/"), &fs).expect_err("range");
        assert!(matches!(err, DeskError::InvalidConfig(_)));
    }

    #[test]
    fn unknown_section_is_a_parse_error() {
        let fs = FakeFileSystem::with_file("/cfg.toml", "[orchestrator]\nparallelism = 3\n");
        let err = load_config(&overrides_for("/cfg.toml"), Path::new("/"), &fs).expect_err("parse");
        assert!(matches!(err, DeskError::ConfigParse(_)));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let fs = FakeFileSystem::default();
        let err = load_config(&overrides_for("/nope.toml"), Path::new("/"), &fs).expect_err("io");
        assert!(matches!(err, DeskError::Io(_)));
    }
}
