//! Background coordinator
//!
//! The coordinator owns the page source, the state store and the fetch
//! batcher. It consumes commands from a channel one at a time, so a crawl
//! always finishes before a profile fetch can start, and relays everything it
//! learns to a single observer.

mod messages;

pub use messages::{Message, Reporter};

use crate::config::{Config, CrawlerConfig};
use crate::crawler::{
    run_multi_page, scrape_single_page, LinkExtractor, PageSource, SelectorCascade,
};
use crate::fetch::FetchBatcher;
use crate::state::{CrawlPhase, FetchStatus, IdentifierSet};
use crate::storage::StateStore;
use crate::url::{normalize_search_url, page_number};
use crate::{HarvestError, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the command channel returned by [`Coordinator::spawn`]
const COMMAND_BUFFER: usize = 32;

/// Main coordinator structure
pub struct Coordinator<P, S> {
    crawler: CrawlerConfig,
    source: P,
    store: S,
    extractor: Box<dyn LinkExtractor>,
    batcher: FetchBatcher,
}

impl<P, S> Coordinator<P, S>
where
    P: PageSource,
    S: StateStore + Send,
{
    /// Creates a coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `source` - Loads search result pages
    /// * `store` - Durable state shared by every stage
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to accept commands
    /// * `Err(HarvestError)` - The API client could not be built
    pub fn new(config: &Config, source: P, store: S) -> Result<Self> {
        Ok(Self {
            crawler: config.crawler.clone(),
            source,
            store,
            extractor: Box::new(SelectorCascade::default()),
            batcher: FetchBatcher::from_config(&config.api, &config.user_agent)?,
        })
    }

    /// Replaces the username extractor
    pub fn with_extractor(mut self, extractor: Box<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Runs the command loop until the inbox closes, then hands back the store
    pub async fn run(mut self, mut inbox: mpsc::Receiver<Message>, observer: Reporter) -> S {
        tracing::debug!("Coordinator started");

        while let Some(message) = inbox.recv().await {
            if let Err(e) = self.handle(message, &observer).await {
                tracing::error!("{}", e);
            }
        }

        tracing::debug!("Command channel closed, coordinator stopping");
        self.store
    }

    /// Handles a single message
    ///
    /// Every failure of a command is reported to the observer, as a
    /// `ScrapeFailed` or an `error` fetch status, before it is returned.
    pub async fn handle(&mut self, message: Message, observer: &Reporter) -> Result<()> {
        match message {
            Message::BeginSinglePageScrape { url } => {
                let url =
                    normalize_search_url(&url).map_err(|e| scrape_failed(1, e.into(), observer))?;
                let page = page_number(&url);

                let found = scrape_single_page(
                    &self.source,
                    self.extractor.as_ref(),
                    &self.crawler,
                    &url,
                    observer,
                )
                .await
                .map_err(|e| scrape_failed(page, e, observer))?;

                self.accept_results(found, None, observer)
                    .map_err(|e| scrape_failed(page, e, observer))
            }

            Message::BeginMultiPageScrape { url, fresh } => {
                let url =
                    normalize_search_url(&url).map_err(|e| scrape_failed(1, e.into(), observer))?;

                // Failures inside the crawl are reported by the driver
                let outcome = run_multi_page(
                    &self.source,
                    &mut self.store,
                    self.extractor.as_ref(),
                    &self.crawler,
                    &url,
                    fresh,
                    observer,
                )
                .await?;

                let pages = outcome.pages;
                self.accept_results(outcome.identifiers, Some(pages), observer)
                    .map_err(|e| scrape_failed(pages, e, observer))
            }

            Message::ScrapeResultsReady {
                identifiers,
                total_pages,
            } => self
                .accept_results(identifiers.into_iter().collect(), total_pages, observer)
                .map_err(|e| scrape_failed(total_pages.unwrap_or(1), e, observer)),

            Message::BeginProfileFetch => {
                let identifiers = match self.scraped_identifiers() {
                    Ok(identifiers) => identifiers,
                    Err(error) => {
                        observer.fetch_update(&FetchStatus::error(0, 0, &error));
                        return Err(error);
                    }
                };

                // The batcher publishes an error status unless the store itself failed
                self.batcher
                    .run(&mut self.store, &identifiers, observer)
                    .await
                    .map_err(|e| {
                        if matches!(
                            e,
                            HarvestError::Storage(_) | HarvestError::InvalidFetchTransition { .. }
                        ) {
                            observer.fetch_update(&FetchStatus::error(0, identifiers.len(), &e));
                        }
                        e
                    })?;
                Ok(())
            }

            relayed @ (Message::ScrapeProgress { .. }
            | Message::ScrapeFailed { .. }
            | Message::FetchUpdate { .. }) => {
                observer.send(relayed);
                Ok(())
            }
        }
    }

    /// Loads the usernames of the last scrape
    ///
    /// A crawl that was interrupted or failed leaves the usernames of an older
    /// scrape behind; those are refused.
    fn scraped_identifiers(&self) -> Result<Vec<String>> {
        let phase = self.store.load_crawl_phase()?;
        if !matches!(phase, CrawlPhase::Idle | CrawlPhase::Completed) {
            tracing::warn!("Refusing to fetch profiles, crawl phase is {}", phase);
            return Err(HarvestError::ScrapeIncomplete { phase });
        }

        Ok(self.store.load_identifiers()?.to_vec())
    }

    /// Stores a finished scrape's usernames for the fetch stage
    fn accept_results(
        &mut self,
        identifiers: IdentifierSet,
        total_pages: Option<u32>,
        observer: &Reporter,
    ) -> Result<()> {
        tracing::info!("Scrape complete: {} usernames ready", identifiers.len());

        self.store.save_identifiers(&identifiers)?;
        self.store.save_crawl_phase(CrawlPhase::Completed)?;

        observer.send(Message::ScrapeResultsReady {
            identifiers: identifiers.to_vec(),
            total_pages,
        });
        Ok(())
    }
}

impl<P, S> Coordinator<P, S>
where
    P: PageSource + 'static,
    S: StateStore + Send + 'static,
{
    /// Starts the coordinator on its own task
    ///
    /// Returns the command sender and a handle that yields the store once every
    /// sender has been dropped.
    pub fn spawn(self, observer: Reporter) -> (mpsc::Sender<Message>, JoinHandle<S>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = tokio::spawn(self.run(rx, observer));
        (tx, handle)
    }
}

/// Tells the observer a scrape stopped and hands the error back
fn scrape_failed(page: u32, error: HarvestError, observer: &Reporter) -> HarvestError {
    observer.send(Message::ScrapeFailed {
        page,
        message: error.to_string(),
    });
    error
}
