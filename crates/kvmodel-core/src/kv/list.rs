use crate::{
    key::Key,
    kv::{Consistency, KvEntry, KvError, KvStore, ScanRequest},
};
use std::collections::VecDeque;

/// Page size used when the caller does not pick one.
pub const DEFAULT_BATCH_SIZE: usize = 128;

///
/// ListOptions
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ListOptions {
    /// Stop after this many entries.
    pub limit: Option<usize>,
    pub reverse: bool,
    /// Keys fetched per round trip.
    pub batch_size: usize,
    pub consistency: Consistency,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: None,
            reverse: false,
            batch_size: DEFAULT_BATCH_SIZE,
            consistency: Consistency::Strong,
        }
    }
}

impl ListOptions {
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    #[must_use]
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub const fn consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }
}

///
/// KvList
///
/// Lazy, ordered prefix scan. Pages are pulled on demand, each page resuming
/// after the last key yielded, so concurrent writers are observed per key
/// (pre- or post-write) rather than per scan. The first error ends the scan.
///

pub struct KvList<'a, S: KvStore + ?Sized> {
    store: &'a S,
    prefix: Key,
    options: ListOptions,
    buffer: VecDeque<KvEntry>,
    cursor: Option<Key>,
    yielded: usize,
    exhausted: bool,
}

impl<'a, S: KvStore + ?Sized> KvList<'a, S> {
    pub fn new(store: &'a S, prefix: Key, options: ListOptions) -> Self {
        Self {
            store,
            prefix,
            options,
            buffer: VecDeque::new(),
            cursor: None,
            yielded: 0,
            exhausted: false,
        }
    }

    #[must_use]
    pub const fn prefix(&self) -> &Key {
        &self.prefix
    }

    fn remaining(&self) -> Option<usize> {
        self.options
            .limit
            .map(|limit| limit.saturating_sub(self.yielded))
    }

    fn fetch_page(&mut self) -> Result<(), KvError> {
        let page_size = self.options.batch_size.max(1);
        let limit = self
            .remaining()
            .map_or(page_size, |remaining| remaining.min(page_size));

        let page = self.store.scan_batch(&ScanRequest {
            prefix: &self.prefix,
            after: self.cursor.as_ref(),
            limit,
            reverse: self.options.reverse,
            consistency: self.options.consistency,
        })?;

        if page.len() < limit {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.cursor = Some(last.key.clone());
        }
        self.buffer.extend(page);

        Ok(())
    }
}

impl<S: KvStore + ?Sized> Iterator for KvList<'_, S> {
    type Item = Result<KvEntry, KvError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == Some(0) {
            return None;
        }

        if self.buffer.is_empty() {
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }

        let entry = self.buffer.pop_front()?;
        self.yielded = self.yielded.saturating_add(1);

        Some(Ok(entry))
    }
}
