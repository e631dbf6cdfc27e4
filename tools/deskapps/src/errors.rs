use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
}

impl DeskError {
    /// Input and lookup failures are reported back to the user and the
    /// session keeps going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NotFound(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::ConfigParse(_) => "config_parse",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Cli(_) => "cli",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
        }
    }
}
