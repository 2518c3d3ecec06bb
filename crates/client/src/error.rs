use std::fmt;

use tokio_tungstenite::tungstenite;

/// Classification of a Hasura error by its `extensions.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationFailed,
    ConstraintViolation,
    PermissionDenied,
    AccessDenied,
    InvalidJwt,
    NotFound,
    DataException,
    ParseFailed,
    Unexpected,
    Other,
}

impl ErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "validation-failed" => Self::ValidationFailed,
            "constraint-violation" | "constraint-error" => Self::ConstraintViolation,
            "permission-error" | "permission-denied" => Self::PermissionDenied,
            "access-denied" => Self::AccessDenied,
            "invalid-jwt" | "jwt-invalid-claims" | "invalid-headers" => Self::InvalidJwt,
            "not-found" => Self::NotFound,
            "data-exception" => Self::DataException,
            "parse-failed" | "invalid-json" => Self::ParseFailed,
            "unexpected" => Self::Unexpected,
            _ => Self::Other,
        }
    }

    /// Errors where resending the same request cannot succeed.
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, Self::Unexpected | Self::Other)
    }
}

/// The `errors` array of a GraphQL response. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLErrors(pub Vec<graphql_client::Error>);

impl GraphQLErrors {
    /// `extensions.code` of every error that carries one.
    pub fn codes(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|error| error.extensions.as_ref()?.get("code")?.as_str())
            .collect()
    }

    /// Kind of the first error; Hasura reports the root cause first.
    pub fn kind(&self) -> ErrorKind {
        self.codes()
            .first()
            .map_or(ErrorKind::Other, |code| ErrorKind::from_code(code))
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|error| error.message.as_str())
    }

    pub fn first_message(&self) -> &str {
        self.0.first().map_or("", |error| error.message.as_str())
    }
}

impl fmt::Display for GraphQLErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.messages().collect::<Vec<_>>().join("; ");
        match self.codes().first() {
            Some(code) => write!(f, "{joined} ({code})"),
            None => f.write_str(&joined),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("graphql error: {0}")]
    GraphQL(GraphQLErrors),

    #[error("response carried neither data nor errors")]
    MissingData,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("websocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    #[error("subscription protocol error: {0}")]
    Protocol(String),

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid document: {0}")]
    Document(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tungstenite::Error> for Error {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

impl Error {
    /// Hasura error kind, for `GraphQL` errors only.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::GraphQL(errors) => Some(errors.kind()),
            _ => None,
        }
    }

    pub fn graphql_errors(&self) -> Option<&GraphQLErrors> {
        match self {
            Self::GraphQL(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
