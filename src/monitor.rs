//! The poll loop: fetch each search page, walk its result links newest-first,
//! and push every not-yet-seen listing through extract → track → notify.

use scraper::{Html, Selector};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::{Config, SearchSpec};
use crate::error::MonitorError;
use crate::extract::extract_listing;
use crate::notify::Notifier;
use crate::scrape::PageSource;
use crate::server::SharedListings;
use crate::store::NoveltyTracker;

pub struct Monitor<'a, S, N> {
    config: &'a Config,
    source: S,
    notifier: N,
    tracker: NoveltyTracker,
    buffer: Option<SharedListings>,
}

impl<'a, S: PageSource, N: Notifier> Monitor<'a, S, N> {
    pub fn new(
        config: &'a Config,
        source: S,
        notifier: N,
        tracker: NoveltyTracker,
        buffer: Option<SharedListings>,
    ) -> Self {
        Self {
            config,
            source,
            notifier,
            tracker,
            buffer,
        }
    }

    /// Run until shutdown. The first cycle starts immediately; afterwards
    /// the loop sleeps `delay_secs` between cycles, with the sleep racing
    /// ctrl-c so shutdown does not wait out the interval.
    ///
    /// The only error that escapes is a persistence failure.
    pub async fn run(&mut self) -> Result<(), MonitorError> {
        loop {
            self.poll_once().await?;
            debug!(seconds = self.config.delay_secs, "cycle complete, sleeping");
            tokio::select! {
                _ = sleep(Duration::from_secs(self.config.delay_secs)) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested, stopping poll loop");
                    return Ok(());
                }
            }
        }
    }

    /// One full pass over all configured searches.
    pub async fn poll_once(&mut self) -> Result<(), MonitorError> {
        for search in &self.config.searches {
            self.scan_search(search).await?;
        }
        Ok(())
    }

    async fn scan_search(&mut self, search: &SearchSpec) -> Result<(), MonitorError> {
        info!(url = %search.url, "scanning search");
        let doc = match self.source.fetch_document(&search.url).await {
            Ok(doc) => doc,
            Err(err) => {
                warn!(error = %err, url = %search.url, "could not fetch search page");
                return Ok(());
            }
        };

        // Must be evaluated before any mark in this cycle.
        let first_poll = self.tracker.is_first_poll(&search.url);

        for (position, item_url) in result_links(&doc).into_iter().enumerate() {
            if !self.tracker.is_new(&search.url, &item_url) {
                // Results are ranked newest-first, so everything below the
                // first known link has been processed in an earlier cycle.
                if position == 0 {
                    debug!(url = %search.url, "nothing new");
                }
                break;
            }

            let item_doc = match self.source.fetch_document(&item_url).await {
                Ok(doc) => doc,
                Err(err) => {
                    // Not marked, so it will be retried next cycle.
                    warn!(error = %err, url = %item_url, "could not fetch item page");
                    continue;
                }
            };

            let listing = match extract_listing(&item_url, &search.currency, &item_doc) {
                Ok(listing) => listing,
                Err(err) => {
                    warn!(error = %err, url = %item_url, "could not extract listing");
                    continue;
                }
            };

            self.tracker.mark_seen(&search.url, &item_url)?;

            if first_poll {
                info!(url = %item_url, "baseline established, suppressing notification");
                break;
            }

            info!(url = %item_url, title = %listing.title, "new listing");
            if let Some(buffer) = &self.buffer {
                buffer.lock().await.push(listing.clone());
            }
            if let Err(err) = self.notifier.notify(&listing).await {
                warn!(error = %err, url = %listing.url, "could not deliver notification");
            }
        }

        Ok(())
    }
}

/// Item-page links of a search-results page, in document order.
fn result_links(doc: &Html) -> Vec<String> {
    let link_sel = Selector::parse("a.s-item__link").unwrap();
    doc.select(&link_sel)
        .filter_map(|link| link.value().attr("href"))
        .map(str::to_string)
        .collect()
}
