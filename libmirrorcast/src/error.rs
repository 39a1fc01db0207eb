//! Error types for Mirrorcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirrorcastError>;

#[derive(Error, Debug)]
pub enum MirrorcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl MirrorcastError {
    /// Returns the appropriate exit code for this error
    ///
    /// Configuration errors abort before any account is processed and get
    /// a distinct code so cron wrappers can tell them apart from run
    /// failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            MirrorcastError::Config(_) => 2,
            MirrorcastError::Fetch(_) => 1,
            MirrorcastError::Extraction(_) => 1,
            MirrorcastError::Publish(_) => 1,
            MirrorcastError::State(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Transport-level failure while fetching a profile page
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP status {code} ({})", describe_status(.code))]
    HttpStatus { code: u16 },

    #[error("Fetch failed: {0}")]
    Other(String),
}

fn describe_status(code: &u16) -> &'static str {
    match *code {
        404 => "account not found",
        429 => "rate limited",
        500..=599 => "server error",
        _ => "unexpected status",
    }
}

/// Neither structural nor heuristic extraction produced a complete post
#[derive(Error, Debug)]
#[error("Could not extract post from page (post_id {}, text {})", found_or_not(.post_id_found), found_or_not(.text_found))]
pub struct ExtractionError {
    /// Whether any strategy recovered a post id
    pub post_id_found: bool,
    /// Whether any strategy recovered the post text
    pub text_found: bool,
}

fn found_or_not(found: &bool) -> &'static str {
    if *found {
        "found"
    } else {
        "not found"
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Note exceeds {max} character limit (got {len} characters)")]
    NoteTooLong { len: usize, max: usize },

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("No relays configured")]
    NoRelaysConfigured,

    #[error("No valid relay endpoints remain after filtering")]
    NoValidRelays,

    #[error("Failed to connect to relays: {0}")]
    ConnectFailed(String),

    #[error("Failed to send note: {0}")]
    SendFailed(String),
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read state file: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write state file: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to serialize state: {0}")]
    SerializeError(#[from] serde_json::Error),
}
