use nhl_api::client::ApiError;
use std::fmt;

pub type SkedResult<T> = Result<T, SkedError>;

/// Everything that can stop a difficulty run, tagged with where it happened.
#[derive(Debug)]
pub enum SkedError {
    /// Source page unreachable or answered with a non-success status.
    Fetch { stage: &'static str, source: ApiError },
    /// A data row that doesn't have the expected shape.
    Parse { stage: &'static str, message: String },
    /// A team present in one source but missing from the other.
    DataConsistency { team: String, missing_from: &'static str },
    /// A team found in zero or several divisions of its conference.
    DivisionLookup { team: String, matches: usize },
    /// Relative delta or ratio against a zero baseline.
    Arithmetic { team: String, message: String },
    /// Invalid configuration value.
    Config { key: String, message: String },
}

impl SkedError {
    pub fn parse(stage: &'static str, message: impl Into<String>) -> Self {
        SkedError::Parse { stage, message: message.into() }
    }

    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        SkedError::Config { key: key.into(), message: message.into() }
    }

    /// Name of the pipeline stage the error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            SkedError::Fetch { stage, .. } | SkedError::Parse { stage, .. } => stage,
            SkedError::DataConsistency { .. } => "difficulty",
            SkedError::DivisionLookup { .. } => "balanced schedule",
            SkedError::Arithmetic { .. } => "delta",
            SkedError::Config { .. } => "config",
        }
    }
}

impl fmt::Display for SkedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkedError::Fetch { stage, source } => write!(f, "[{stage}] fetch failed: {source}"),
            SkedError::Parse { stage, message } => write!(f, "[{stage}] parse failed: {message}"),
            SkedError::DataConsistency { team, missing_from } => {
                write!(f, "team '{team}' is missing from the {missing_from}")
            }
            SkedError::DivisionLookup { team, matches } => {
                write!(f, "team '{team}' belongs to {matches} divisions, expected exactly one")
            }
            SkedError::Arithmetic { team, message } => write!(f, "team '{team}': {message}"),
            SkedError::Config { key, message } => write!(f, "invalid {key}: {message}"),
        }
    }
}

impl std::error::Error for SkedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SkedError::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}
