//! Cursor-driven page iteration.
//!
//! A [`Pager`] walks a [`PageSource`] one page at a time. It is lazy (nothing
//! is fetched until asked), finite (it stops on the first page that either
//! reports no further pages or omits a usable cursor) and not restartable
//! (once exhausted, or after a failed fetch, it yields nothing more).

use std::future::Future;

use crate::error::Result;
use crate::types::Page;

/// Anything that can serve one page for a given cursor.
pub trait PageSource {
    type Item;

    fn fetch_page(
        &self,
        cursor: Option<&str>,
        limit: u32,
    ) -> impl Future<Output = Result<Page<Self::Item>>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

pub struct Pager<'a, S> {
    source: &'a S,
    limit: u32,
    cursor: Cursor,
    pages_fetched: usize,
}

impl<'a, S: PageSource + Sync> Pager<'a, S> {
    pub fn new(source: &'a S, limit: u32) -> Self {
        Self {
            source,
            limit,
            cursor: Cursor::Start,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == Cursor::Exhausted
    }

    /// Fetch the next page, or `None` once the sequence has ended.
    pub async fn next_page(&mut self) -> Result<Option<Vec<S::Item>>> {
        // Mark exhausted up front so a failed fetch also ends the sequence.
        let cursor = match std::mem::replace(&mut self.cursor, Cursor::Exhausted) {
            Cursor::Exhausted => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(c) => Some(c),
        };

        let page = self.source.fetch_page(cursor.as_deref(), self.limit).await?;
        self.pages_fetched += 1;
        log::debug!(
            "page {} fetched: {} record(s), has_next_page={}",
            self.pages_fetched,
            page.data.len(),
            page.has_next_page
        );

        self.cursor = match page.next_cursor {
            Some(next) if page.has_next_page && !next.is_empty() => Cursor::Next(next),
            _ => {
                if page.has_next_page {
                    log::warn!(
                        "page {} reports more pages but no cursor; stopping",
                        self.pages_fetched
                    );
                }
                Cursor::Exhausted
            }
        };

        Ok(Some(page.data))
    }

    /// Fold every remaining page into an accumulator.
    pub async fn try_fold<B, F>(mut self, init: B, mut f: F) -> Result<B>
    where
        F: FnMut(B, Vec<S::Item>) -> B,
    {
        let mut acc = init;
        while let Some(page) = self.next_page().await? {
            acc = f(acc, page);
        }
        Ok(acc)
    }

    /// Concatenate every remaining page.
    pub async fn collect_all(self) -> Result<Vec<S::Item>> {
        self.try_fold(Vec::new(), |mut acc, page| {
            acc.extend(page);
            acc
        })
        .await
    }
}
