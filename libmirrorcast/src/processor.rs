//! Account processing orchestration
//!
//! Drives the per-account pipeline: fetch the profile page, extract the
//! newest post, compare against stored state, format, publish, record.
//! Accounts run sequentially in configured order; one account's failure
//! never prevents the rest from being processed.

use tracing::{debug, info, warn};

use crate::error::{ExtractionError, Result};
use crate::extract::PostExtractor;
use crate::fetch::{normalize_handle, ProfileFetcher};
use crate::note::format_note;
use crate::publish::NotePublisher;
use crate::state::StateStore;

/// Outcome of one account's pass
#[derive(Debug, Clone, PartialEq)]
pub enum AccountOutcome {
    /// A new post was found and broadcast
    Published { post_id: String, event_id: String },
    /// The newest post was already seen
    NoChange,
}

/// Tally for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub published: usize,
    pub unchanged: usize,
    pub errors: usize,
}

impl RunSummary {
    /// Process exit status: zero only when every account succeeded
    pub fn exit_code(&self) -> i32 {
        if self.errors > 0 {
            1
        } else {
            0
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "published {}, unchanged {}, errors {}",
            self.published, self.unchanged, self.errors
        )
    }
}

pub struct AccountProcessor {
    fetcher: Box<dyn ProfileFetcher>,
    extractor: PostExtractor,
    publisher: Box<dyn NotePublisher>,
    state: StateStore,
}

impl AccountProcessor {
    pub fn new(
        fetcher: Box<dyn ProfileFetcher>,
        publisher: Box<dyn NotePublisher>,
        state: StateStore,
    ) -> Self {
        Self {
            fetcher,
            extractor: PostExtractor::new(),
            publisher,
            state,
        }
    }

    /// Run one pass over the configured accounts, in listed order
    pub async fn run(&mut self, accounts: &[String]) -> RunSummary {
        let mut summary = RunSummary::default();

        for account in accounts {
            match self.process_account(account).await {
                Ok(AccountOutcome::Published { post_id, event_id }) => {
                    info!(
                        "Published post {} from {} as {}",
                        post_id, account, event_id
                    );
                    summary.published += 1;
                }
                Ok(AccountOutcome::NoChange) => {
                    info!("No new post for {}", account);
                    summary.unchanged += 1;
                }
                Err(e) => {
                    warn!("Account {} failed: {}", account, e);
                    summary.errors += 1;
                }
            }
        }

        summary
    }

    async fn process_account(&mut self, account: &str) -> Result<AccountOutcome> {
        let last_seen = self.state.last_post_id(account).map(str::to_string);
        debug!(
            "Checking {} (last seen: {})",
            account,
            last_seen.as_deref().unwrap_or("none, first run")
        );

        let markup = self.fetcher.fetch_profile(account).await?;

        let extracted = self.extractor.extract(&markup, account);
        let (post_id, text) = match (extracted.post_id, extracted.text) {
            (Some(post_id), Some(text)) => (post_id, text),
            (post_id, text) => {
                return Err(ExtractionError {
                    post_id_found: post_id.is_some(),
                    text_found: text.is_some(),
                }
                .into())
            }
        };

        debug!(
            "Found post {} for {}: {}",
            post_id,
            account,
            text.chars().take(100).collect::<String>()
        );

        if last_seen.as_deref() == Some(post_id.as_str()) {
            return Ok(AccountOutcome::NoChange);
        }

        let note = format_note(normalize_handle(account), &text, &post_id);
        let event_id = self.publisher.publish(&note).await?;

        // The publish already happened; a state save failure must not
        // roll it back or fail the account.
        if let Err(e) = self.state.record_published(account, &post_id) {
            warn!("Published {} but could not save state: {}", post_id, e);
        }

        Ok(AccountOutcome::Published { post_id, event_id })
    }
}
