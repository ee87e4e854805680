//! Messages exchanged between the user-facing surface, the page driver and the
//! background coordinator.

use crate::state::FetchStatus;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// A message on the inter-surface channel
///
/// Serialized with a `type` tag, e.g. `{"type":"BEGIN_PROFILE_FETCH"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Extract the usernames of one result page
    BeginSinglePageScrape { url: String },

    /// Walk every result page of a search, resuming if a crawl of it is underway
    BeginMultiPageScrape {
        url: String,
        #[serde(default)]
        fresh: bool,
    },

    /// A scrape finished; its usernames are ready to fetch
    ScrapeResultsReady {
        identifiers: Vec<String>,
        #[serde(default)]
        total_pages: Option<u32>,
    },

    /// A result page was processed
    ScrapeProgress {
        page: u32,
        total_identifiers: usize,
        message: String,
    },

    /// Fetch the profiles of the stored usernames
    BeginProfileFetch,

    /// A scrape stopped on an error
    ScrapeFailed { page: u32, message: String },

    /// The profile fetch status changed
    FetchUpdate { status: FetchStatus },
}

/// Fire-and-forget sender of progress messages to an observer
///
/// Sending never blocks and never fails: once the observer has gone away
/// (the surface was closed) messages are dropped.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    tx: Option<UnboundedSender<Message>>,
}

impl Reporter {
    /// Creates a reporter delivering to `tx`
    pub fn new(tx: UnboundedSender<Message>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Creates a reporter with no observer
    pub fn silent() -> Self {
        Self::default()
    }

    /// Delivers a message if anyone is still listening
    pub fn send(&self, message: Message) {
        if let Some(tx) = &self.tx {
            if tx.send(message).is_err() {
                tracing::trace!("Observer closed, dropping message");
            }
        }
    }

    /// Reports the progress of a scrape
    pub fn progress(&self, page: u32, total_identifiers: usize, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{}", message);
        self.send(Message::ScrapeProgress {
            page,
            total_identifiers,
            message,
        });
    }

    /// Reports a new fetch status
    pub fn fetch_update(&self, status: &FetchStatus) {
        self.send(Message::FetchUpdate {
            status: status.clone(),
        });
    }
}
