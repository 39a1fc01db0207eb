//! Mirrorcast - mirror X posts to Nostr
//!
//! This library watches X (Twitter) accounts through a Nitter-style
//! mirror front-end and republishes new posts as Nostr text notes,
//! keeping per-account last-seen state so nothing is published twice.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod mock;
pub mod note;
pub mod processor;
pub mod publish;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use error::{MirrorcastError, Result};
pub use extract::{ExtractedPost, PostExtractor};
pub use fetch::{HttpFetcher, ProfileFetcher};
pub use note::format_note;
pub use processor::{AccountProcessor, RunSummary};
pub use publish::{NotePublisher, RelayPublisher};
pub use state::StateStore;
