//! Note publishing to Nostr relays

use async_trait::async_trait;
use nostr_sdk::{Client, Keys, ToBech32};
use tracing::{debug, warn};

use crate::config::NostrConfig;
use crate::error::{PublishError, Result};

/// Upper bound on note length; relays reject oversized events well below
/// their own frame limits
pub const MAX_NOTE_LEN: usize = 32_000;

/// Sink for formatted notes
#[async_trait]
pub trait NotePublisher: Send + Sync {
    /// Broadcast one note, returning the resulting event id
    async fn publish(&self, note: &str) -> Result<String>;
}

/// Publisher backed by the nostr-sdk relay pool
pub struct RelayPublisher {
    credential: String,
    relays: Vec<String>,
}

impl RelayPublisher {
    pub fn new(credential: String, relays: Vec<String>) -> Self {
        Self { credential, relays }
    }

    pub fn from_config(config: &NostrConfig, credential: String) -> Self {
        Self::new(credential, config.relays.clone())
    }

    /// Validate everything that can fail before any network activity
    fn validate(&self, note: &str) -> std::result::Result<Vec<&str>, PublishError> {
        if note.len() > MAX_NOTE_LEN {
            return Err(PublishError::NoteTooLong {
                len: note.len(),
                max: MAX_NOTE_LEN,
            });
        }

        if !self.credential.starts_with("nsec") {
            return Err(PublishError::InvalidCredential(
                "signing key must be in bech32 nsec format".to_string(),
            ));
        }

        if self.relays.is_empty() {
            return Err(PublishError::NoRelaysConfigured);
        }

        let valid_relays: Vec<&str> = self
            .relays
            .iter()
            .map(String::as_str)
            .filter(|relay| {
                let ok = relay.starts_with("wss://") || relay.starts_with("ws://");
                if !ok {
                    warn!("Skipping relay with unsupported scheme: {}", relay);
                }
                ok
            })
            .collect();

        if valid_relays.is_empty() {
            return Err(PublishError::NoValidRelays);
        }

        Ok(valid_relays)
    }

    async fn send(client: &Client, relays: &[&str], note: &str) -> Result<String> {
        let mut added = 0;
        for relay in relays {
            match client.add_relay(*relay).await {
                Ok(_) => added += 1,
                Err(e) => warn!("Could not add relay {}: {}", relay, e),
            }
        }
        if added == 0 {
            return Err(
                PublishError::ConnectFailed("no relay could be registered".to_string()).into(),
            );
        }

        client.connect().await;

        let output = client
            .publish_text_note(note, [])
            .await
            .map_err(|e| PublishError::SendFailed(e.to_string()))?;

        Ok(output
            .id()
            .to_bech32()
            .unwrap_or_else(|_| output.id().to_hex()))
    }
}

#[async_trait]
impl NotePublisher for RelayPublisher {
    async fn publish(&self, note: &str) -> Result<String> {
        let valid_relays = self.validate(note)?;

        let keys = Keys::parse(&self.credential)
            .map_err(|e| PublishError::InvalidCredential(e.to_string()))?;
        let client = Client::new(keys);

        // Teardown runs on every exit path of the send body; a failed
        // disconnect never overrides the primary result.
        let result = Self::send(&client, &valid_relays, note).await;
        if let Err(e) = client.disconnect().await {
            debug!("Relay disconnect failed: {}", e);
        }

        result
    }
}
