//! Serial, throttled profile fetching
//!
//! The batcher requests one profile at a time, in input order, and publishes a
//! fresh `FetchStatus` before every request. The first failure of any kind
//! aborts the whole batch and nothing fetched so far is kept; callers restart
//! from the beginning.

use crate::config::{ApiConfig, UserAgentConfig};
use crate::coordinator::Reporter;
use crate::crawler::build_http_client;
use crate::fetch::client::fetch_profile;
use crate::fetch::profile::ProfileRecord;
use crate::fetch::throttle::Throttle;
use crate::state::{FetchPhase, FetchStatus};
use crate::storage::StateStore;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches the profiles of a username list
pub struct FetchBatcher {
    client: Client,
    api_base: Url,
    throttle: Throttle,
}

impl FetchBatcher {
    /// Creates a batcher
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `api_base` - Root of the REST API
    /// * `delay` - Minimum time between consecutive requests
    pub fn new(client: Client, api_base: Url, delay: Duration) -> Self {
        Self {
            client,
            api_base,
            throttle: Throttle::new(delay),
        }
    }

    /// Creates a batcher from the API and user agent configuration
    pub fn from_config(api: &ApiConfig, user_agent: &UserAgentConfig) -> Result<Self, HarvestError> {
        let client = build_http_client(user_agent, api.timeout())?;
        let api_base = Url::parse(&api.base_url)?;
        Ok(Self::new(client, api_base, api.request_delay()))
    }

    /// Runs one batch
    ///
    /// On success the profiles are stored for the export stage and returned in
    /// input order. On failure the status is set to `error`, no profile from
    /// this batch is returned or stored, and the error is returned.
    pub async fn run<S: StateStore + ?Sized>(
        &mut self,
        store: &mut S,
        identifiers: &[String],
        reporter: &Reporter,
    ) -> Result<Vec<ProfileRecord>, HarvestError> {
        let total = identifiers.len();
        let mut publisher = StatusPublisher::new();

        if identifiers.is_empty() {
            let error = HarvestError::NothingToFetch;
            publisher.publish(store, reporter, FetchStatus::error(0, 0, &error))?;
            return Err(error);
        }

        tracing::info!("Fetching {} profiles", total);
        self.throttle.reset();

        let mut profiles = Vec::with_capacity(total);

        for (index, login) in identifiers.iter().enumerate() {
            publisher.publish(store, reporter, FetchStatus::progress(index, total))?;

            self.throttle.wait_turn().await;

            match fetch_profile(&self.client, &self.api_base, login).await {
                Ok(profile) => {
                    tracing::debug!("Fetched profile {} ({}/{})", login, index + 1, total);
                    profiles.push(profile);
                }
                Err(error) => {
                    tracing::error!("Error fetching profile for {}: {}", login, error);
                    publisher.publish(store, reporter, FetchStatus::error(index, total, &error))?;
                    return Err(error);
                }
            }
        }

        store.save_profiles(&profiles)?;
        publisher.publish(store, reporter, FetchStatus::complete(total))?;
        tracing::info!("Successfully fetched {} profiles", profiles.len());

        Ok(profiles)
    }
}

/// Writes status records for one batch, refusing backward phase moves
struct StatusPublisher {
    phase: FetchPhase,
}

impl StatusPublisher {
    fn new() -> Self {
        Self {
            phase: FetchPhase::Idle,
        }
    }

    fn publish<S: StateStore + ?Sized>(
        &mut self,
        store: &mut S,
        reporter: &Reporter,
        status: FetchStatus,
    ) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(status.phase) {
            return Err(HarvestError::InvalidFetchTransition {
                from: self.phase,
                to: status.phase,
            });
        }

        store.save_fetch_status(&status)?;
        reporter.fetch_update(&status);
        self.phase = status.phase;
        Ok(())
    }
}
