//! Error types for patmos-core

use std::fmt::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Remediation command for resolving an error
#[derive(Debug, Clone)]
pub struct RemediationCommand {
    /// Short label describing the command purpose
    pub label: String,
    /// Command to run
    pub command: String,
}

/// Actionable remediation guidance for an error
#[derive(Debug, Clone)]
pub struct Remediation {
    /// One-line summary of how to fix the issue
    pub summary: String,
    /// Suggested commands to resolve or diagnose the issue
    pub commands: Vec<RemediationCommand>,
    /// Additional alternative guidance
    pub alternatives: Vec<String>,
}

impl Remediation {
    /// Create a new remediation with a summary
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            commands: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Add a suggested command
    #[must_use]
    pub fn command(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.commands.push(RemediationCommand {
            label: label.into(),
            command: command.into(),
        });
        self
    }

    /// Add an alternative suggestion
    #[must_use]
    pub fn alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// Render remediation text for human-readable output
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "To fix:");
        let _ = writeln!(output, "  {}", self.summary);

        if !self.commands.is_empty() {
            let _ = writeln!(output, "  Commands:");
            for cmd in &self.commands {
                let _ = writeln!(output, "    - {}: {}", cmd.label, cmd.command);
            }
        }

        if !self.alternatives.is_empty() {
            let _ = writeln!(output, "  Alternatives:");
            for alt in &self.alternatives {
                let _ = writeln!(output, "    - {alt}");
            }
        }

        output
    }
}

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for patmos-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Storage errors
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// I/O errors on the output stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Return remediation guidance when available.
    #[must_use]
    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            Self::Config(err) => Some(err.remediation()),
            Self::Storage(err) => Some(err.remediation()),
            Self::Io(_) => Some(
                Remediation::new("Writing coefficients failed. Check the output destination.")
                    .alternative("If stdout is piped, make sure the reader is still running."),
            ),
            Self::Json(_) => None,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// None of the location variables is set
    #[error("The environment variable {} is not set.", .vars.first().map_or("DB_DIR", String::as_str))]
    Missing { vars: Vec<String> },

    /// Config file could not be read or parsed
    #[error("Invalid config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::Missing { vars } => Remediation::new(
                "Point the reader at the directory that holds avhrr.sqlite.",
            )
            .command("Set location", "export DB_DIR=/path/to/coefficients")
            .command("One-off run", "patmos --db-dir /path/to/coefficients dump")
            .alternative(format!("Any of these variables is accepted: {}", vars.join(", "))),
            Self::Parse { path, .. } => {
                Remediation::new("Fix the TOML syntax in the config file or drop --config.")
                    .command("Inspect", format!("cat \"{}\"", path.display()))
            }
        }
    }
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("The file {} does not exist.", .0.display())]
    StoreNotFound(PathBuf),

    #[error("Database error: {0}")]
    Database(String),

    #[error("No coefficients for satellite '{id}' in view \"{view}\"")]
    RecordNotFound { view: String, id: String },

    #[error("Column {column} is empty for satellite '{id}' in view \"{view}\"")]
    IncompleteRecord {
        view: String,
        id: String,
        column: String,
    },
}

impl StorageError {
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::StoreNotFound(path) => Remediation::new(format!(
                "Copy avhrr.sqlite into {} or point DB_DIR elsewhere.",
                path.parent().map_or_else(|| ".".into(), |p| p.display().to_string())
            ))
            .command("Check file", format!("ls -l \"{}\"", path.display())),
            Self::Database(_) => Remediation::new(
                "The coefficient store could not be queried. Check that the file is a valid SQLite database.",
            )
            .command("List views", "sqlite3 \"$DB_DIR/avhrr.sqlite\" .tables")
            .alternative("Verify the view name matches a table such as patmos.2013."),
            Self::RecordNotFound { view, .. } => {
                Remediation::new("Use a satellite identifier present in the view.")
                    .command("List identifiers", format!("patmos ids --view {view}"))
            }
            Self::IncompleteRecord { view, .. } => Remediation::new(
                "The store row has an unpopulated coefficient. Repair the store; no default is substituted.",
            )
            .command("List columns", format!("patmos columns --view {view}")),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.into())
    }
}
