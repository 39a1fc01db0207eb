//! Mock fetcher and publisher for testing
//!
//! Configurable stand-ins for the network-facing seams so the account
//! processor can be exercised without a mirror instance or relay access.
//! Available in all builds to support integration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{FetchError, PublishError, Result};
use crate::fetch::ProfileFetcher;
use crate::publish::NotePublisher;

/// Canned response for one account
#[derive(Debug, Clone)]
pub enum MockPage {
    Markup(String),
    Timeout,
    ConnectionFailed,
    HttpStatus(u16),
}

/// Fetcher returning canned pages per account
///
/// Cloning shares the call log, so tests can keep a handle after moving
/// the fetcher into the processor.
#[derive(Default, Clone)]
pub struct MockFetcher {
    pages: HashMap<String, MockPage>,
    fetch_calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, account: &str, page: MockPage) -> Self {
        self.pages.insert(account.to_string(), page);
        self
    }

    /// Convenience: a minimal well-formed profile page
    pub fn with_post(self, account: &str, post_id: &str, text: &str) -> Self {
        let markup = format!(
            r#"<div class="timeline-item" data-id="{}"><div class="tweet-content">{}</div></div>"#,
            post_id, text
        );
        self.with_page(account, MockPage::Markup(markup))
    }

    /// Accounts fetched, in order
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileFetcher for MockFetcher {
    async fn fetch_profile(&self, account: &str) -> Result<String> {
        self.fetch_calls.lock().unwrap().push(account.to_string());

        match self.pages.get(account) {
            Some(MockPage::Markup(markup)) => Ok(markup.clone()),
            Some(MockPage::Timeout) => Err(FetchError::Timeout.into()),
            Some(MockPage::ConnectionFailed) => {
                Err(FetchError::ConnectionFailed("mock connection refused".to_string()).into())
            }
            Some(MockPage::HttpStatus(code)) => Err(FetchError::HttpStatus { code: *code }.into()),
            None => Err(FetchError::HttpStatus { code: 404 }.into()),
        }
    }
}

/// Publisher that records notes instead of broadcasting them
///
/// Cloning shares the published-note log.
#[derive(Default, Clone)]
pub struct MockPublisher {
    fail_with: Option<String>,
    published: Arc<Mutex<Vec<String>>>,
}

impl MockPublisher {
    /// A publisher that always succeeds
    pub fn success() -> Self {
        Self::default()
    }

    /// A publisher whose sends always fail
    pub fn failure(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Notes published so far, in order
    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl NotePublisher for MockPublisher {
    async fn publish(&self, note: &str) -> Result<String> {
        if let Some(reason) = &self.fail_with {
            return Err(PublishError::SendFailed(reason.clone()).into());
        }

        let mut published = self.published.lock().unwrap();
        published.push(note.to_string());
        Ok(format!("note1mock{}", published.len()))
    }
}
