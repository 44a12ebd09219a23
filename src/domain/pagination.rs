//! Offset-based paging over a result list that the service hands out in
//! chunks, with an explicit reason for every stop.

use crate::utils::error::Result;
use async_trait::async_trait;

/// DBLP refuses offsets beyond this many hits per query.
pub const DEFAULT_MAX_ITEMS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total hits reported by the service, when it reports one.
    pub total: Option<usize>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Some(0),
        }
    }
}

#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page<Self::Item>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The service returned an empty page.
    EndOfResults,
    /// As many items were read as the service reported.
    TotalReached,
    /// The configured item cutoff was hit.
    MaxItems,
    /// The caller's predicate matched an item.
    Sentinel,
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: usize,
    max_items: usize,
}

impl Paginator {
    pub fn new(page_size: usize, max_items: Option<usize>) -> Self {
        Self {
            page_size: page_size.max(1),
            max_items: max_items.unwrap_or(DEFAULT_MAX_ITEMS),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Reads pages until a stop condition holds. The item that trips
    /// `stop_at` is not included.
    pub async fn collect<P, F>(&self, source: &P, mut stop_at: F) -> Result<(Vec<P::Item>, StopReason)>
    where
        P: PageSource + ?Sized,
        F: FnMut(&P::Item) -> bool + Send,
    {
        let mut collected = Vec::new();
        let mut offset = 0;

        loop {
            let remaining = self.max_items.saturating_sub(collected.len());
            if remaining == 0 {
                return Ok((collected, StopReason::MaxItems));
            }

            let limit = self.page_size.min(remaining);
            tracing::debug!("Fetching page offset={} limit={}", offset, limit);
            let page = source.fetch_page(offset, limit).await?;
            let received = page.items.len();

            if received == 0 {
                return Ok((collected, StopReason::EndOfResults));
            }

            for item in page.items {
                if stop_at(&item) {
                    return Ok((collected, StopReason::Sentinel));
                }
                if collected.len() >= self.max_items {
                    return Ok((collected, StopReason::MaxItems));
                }
                collected.push(item);
            }

            offset += received;

            if let Some(total) = page.total {
                if offset >= total {
                    return Ok((collected, StopReason::TotalReached));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Numbers {
        available: usize,
        report_total: bool,
        calls: AtomicUsize,
    }

    impl Numbers {
        fn new(available: usize, report_total: bool) -> Self {
            Self {
                available,
                report_total,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageSource for Numbers {
        type Item = usize;

        async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page<usize>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let end = (offset + limit).min(self.available);
            Ok(Page {
                items: (offset..end.max(offset)).collect(),
                total: self.report_total.then_some(self.available),
            })
        }
    }

    #[test]
    fn test_stops_at_reported_total() {
        let source = Numbers::new(7, true);
        let (items, reason) =
            tokio_test::block_on(Paginator::new(3, None).collect(&source, |_| false)).unwrap();
        assert_eq!(items, (0..7).collect::<Vec<_>>());
        assert_eq!(reason, StopReason::TotalReached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_stops_at_empty_page_without_total() {
        let source = Numbers::new(4, false);
        let (items, reason) =
            tokio_test::block_on(Paginator::new(2, None).collect(&source, |_| false)).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(reason, StopReason::EndOfResults);
    }

    #[test]
    fn test_stops_at_max_items() {
        let source = Numbers::new(100, true);
        let (items, reason) =
            tokio_test::block_on(Paginator::new(10, Some(25)).collect(&source, |_| false)).unwrap();
        assert_eq!(items.len(), 25);
        assert_eq!(reason, StopReason::MaxItems);
    }

    #[test]
    fn test_stops_at_sentinel_item() {
        let source = Numbers::new(100, true);
        let (items, reason) =
            tokio_test::block_on(Paginator::new(10, None).collect(&source, |n| *n == 13)).unwrap();
        assert_eq!(items, (0..13).collect::<Vec<_>>());
        assert_eq!(reason, StopReason::Sentinel);
    }
}
