//! Lazy cursor over offset/limit paginated listings.
//!
//! The service pages every listing with `limit`/`offset` query parameters and
//! reports `meta.paging.total_results` on each response. [`Paginated`] wraps a
//! [`PageFetcher`] and hands out the records as one stream, fetching pages only
//! when a reader gets past what is already buffered.
//!
//! Fetched records are kept. Every new pass over the listing replays the buffer
//! first and only then asks for more, so reading the whole listing twice costs
//! no extra requests, and abandoning a pass halfway loses nothing.
//!
//! A `Paginated` is meant for one reader at a time: streams borrow it mutably.

use crate::error::{Error, Result};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use std::future::Future;
use tracing::{debug, warn};

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// One page of results plus the listing's total size.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// `meta` block of a paginated response.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageMeta {
    pub paging: Paging,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Paging {
    pub total_results: usize,
}

/// Anything that can fetch one page of a listing.
pub trait PageFetcher {
    type Item;

    /// Fetch up to `limit` records starting at `offset`.
    fn fetch(&self, offset: usize, limit: usize) -> impl Future<Output = Result<Page<Self::Item>>>;
}

/// Cursor state of a [`Paginated`] listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Nothing fetched yet; the total is unknown.
    Fresh,
    /// Some pages fetched, more remain.
    PartiallyFetched,
    /// Every record is buffered.
    Exhausted,
}

/// A lazily fetched listing.
pub struct Paginated<F: PageFetcher> {
    fetcher: F,
    page_size: usize,
    next_offset: usize,
    total: Option<usize>,
    items: Vec<F::Item>,
}

impl<F> Paginated<F>
where
    F: PageFetcher,
    F::Item: Clone,
{
    pub fn new(fetcher: F) -> Self {
        Self::with_page_size(fetcher, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(fetcher: F, page_size: usize) -> Self {
        Self {
            fetcher,
            page_size: page_size.max(1),
            next_offset: 0,
            total: None,
            items: Vec::new(),
        }
    }

    /// Total number of records, known after the first fetch.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Records fetched so far, in listing order.
    pub fn buffered(&self) -> &[F::Item] {
        &self.items
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> PageState {
        match self.total {
            None => PageState::Fresh,
            Some(_) if self.has_more() => PageState::PartiallyFetched,
            Some(_) => PageState::Exhausted,
        }
    }

    /// True until the total is known and every record is buffered.
    pub fn has_more(&self) -> bool {
        match self.total {
            None => true,
            Some(total) => self.items.len() < total,
        }
    }

    /// Fetch the page at the current offset, buffer it and advance the offset.
    ///
    /// Returns the newly buffered records. The total is overwritten with
    /// whatever the response reports.
    pub async fn fetch_next_page(&mut self) -> Result<&[F::Item]> {
        let page = self.fetcher.fetch(self.next_offset, self.page_size).await?;
        let start = self.items.len();

        debug!(
            "Fetched page at offset {} ({} records, {} total)",
            self.next_offset,
            page.items.len(),
            page.total
        );

        self.items.extend(page.items);
        self.next_offset += self.page_size;

        let mut total = page.total;
        if self.items.len() > total {
            warn!(
                "Listing returned {} records but reported {} in total, dropping the extra ones",
                self.items.len(),
                total
            );
            self.items.truncate(total);
        } else if self.items.len() == start && self.items.len() < total {
            // An empty page before the reported end would make readers loop forever.
            warn!(
                "Listing reported {} records but stopped after {}",
                total,
                self.items.len()
            );
            total = self.items.len();
        }
        self.total = Some(total);

        Ok(&self.items[start.min(self.items.len())..])
    }

    /// Record at `index`, fetching pages until it is buffered or the listing ends.
    async fn next_at(&mut self, index: usize) -> Result<Option<F::Item>> {
        loop {
            if let Some(item) = self.items.get(index) {
                return Ok(Some(item.clone()));
            }
            if !self.has_more() {
                return Ok(None);
            }
            self.fetch_next_page().await?;
        }
    }

    /// Every record of the listing: buffered ones first, then pages on demand.
    pub fn stream(&mut self) -> impl Stream<Item = Result<F::Item>> + '_ {
        stream::try_unfold((self, 0usize), |(this, index)| async move {
            let next = this.next_at(index).await;
            next.map(move |item| item.map(move |item| (item, (this, index + 1))))
        })
    }

    /// Records matching `predicate`, fetched lazily.
    pub fn filter_by<'a, P>(&'a mut self, mut predicate: P) -> impl Stream<Item = Result<F::Item>> + 'a
    where
        P: FnMut(&F::Item) -> bool + 'a,
    {
        self.stream()
            .try_filter(move |item| futures::future::ready(predicate(item)))
    }

    /// Up to `n` records from the start of the listing, fetching no more pages than needed.
    pub async fn take_first(&mut self, n: usize) -> Result<Vec<F::Item>> {
        self.stream().take(n).try_collect().await
    }

    /// The first record of the listing.
    ///
    /// # Errors
    /// [`Error::NoResults`] when the listing is empty.
    pub async fn take_one(&mut self) -> Result<F::Item> {
        let stream = self.stream();
        futures::pin_mut!(stream);
        stream.try_next().await?.ok_or(Error::NoResults)
    }

    /// First record matching `predicate`, if any.
    pub async fn find<P>(&mut self, predicate: P) -> Result<Option<F::Item>>
    where
        P: FnMut(&F::Item) -> bool,
    {
        let stream = self.filter_by(predicate);
        futures::pin_mut!(stream);
        stream.try_next().await
    }

    /// Every record of the listing.
    pub async fn collect_all(&mut self) -> Result<Vec<F::Item>> {
        self.stream().try_collect().await
    }
}
