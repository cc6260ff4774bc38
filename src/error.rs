//! Error types for team-setup.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Workspace directory errors.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("No workspace credentials found for user {user_id}")]
    NotFound { user_id: i64 },

    #[error("Stored workspace credential {credential_id} is malformed: {reason}")]
    MalformedCredential { credential_id: i64, reason: String },

    #[error("Token exchange failed: {0}")]
    Token(String),

    #[error("Directory API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Transport failures from the HTTP client, passed through untouched.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Team creation wizard errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Unknown wizard step: {0}")]
    UnknownStep(String),

    #[error("Submission for {submitted} cannot be applied to step {step}")]
    SubmissionMismatch { step: String, submitted: String },

    #[error("Invalid team draft: {0}")]
    InvalidDraft(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status for this error when returned from a route.
    pub fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            Self::Config(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Directory(DirectoryError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Directory(DirectoryError::MalformedCredential { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Directory(_) => StatusCode::BAD_GATEWAY,
            Self::Wizard(WizardError::UnknownStep(_)) => StatusCode::NOT_FOUND,
            Self::Wizard(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, status = %status, "Request failed");
        }
        (
            status,
            axum::Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
