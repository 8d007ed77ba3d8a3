//! Offset pagination over the GraphQL endpoint
//!
//! A query is repeated with `skip` equal to the number of records already received
//! until a page comes back shorter than the page size. There is no total-count check:
//! when the total is an exact multiple of the page size the loop issues one extra
//! request that returns nothing, then stops.

use crate::error::CensusError;
use crate::query::QueryTemplate;
use crate::record::{extract_page, Record};
use crate::transport::Transport;
use futures::{pin_mut, Stream, TryStreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Elements requested per page.
pub const PAGE_SIZE: usize = 1000;

/// What to do when a per-parent pagination fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Propagate the first failure
    Never,
    /// Wait `cooldown`, then restart the pagination once; a second failure is fatal
    Once { cooldown: Duration },
}

/// Drives a query template page by page through a transport.
#[derive(Debug)]
pub struct Paginator<'a, T> {
    transport: &'a T,
    page_size: usize,
}

impl<'a, T: Transport> Paginator<'a, T> {
    /// Creates a paginator with the default page size.
    pub fn new(transport: &'a T) -> Self {
        Self::with_page_size(transport, PAGE_SIZE)
    }

    /// Creates a paginator with a custom page size (0 is treated as 1).
    pub fn with_page_size(transport: &'a T, page_size: usize) -> Self {
        Paginator {
            transport,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Streams the pages of a query.
    ///
    /// Each item is one page; the stream ends after the first page shorter than the
    /// page size (that page is still yielded, even when empty).
    pub fn pages<'q>(
        &'q self,
        template: QueryTemplate,
        result_key: &'q str,
        dao_id: Option<&'q str>,
    ) -> impl Stream<Item = Result<Vec<Record>, CensusError>> + 'q {
        let transport: &'q T = self.transport;
        let page_size = self.page_size;

        async_stream::stream! {
            let mut offset = 0usize;
            loop {
                let query = match template.fill(page_size, offset, dao_id) {
                    Ok(query) => query,
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                };
                let data = match transport.execute(&query).await {
                    Ok(data) => data,
                    Err(err) => {
                        yield Err(CensusError::from(err));
                        break;
                    }
                };

                let page = extract_page(&data, result_key);
                let len = page.len();
                debug!(result_key, offset, len, "page received");

                offset += len;
                yield Ok(page);

                if len < page_size {
                    break;
                }
            }
        }
    }

    /// Collects every record of a query.
    ///
    /// # Errors
    /// The first transport failure aborts the pagination and is returned.
    pub async fn collect(
        &self,
        template: QueryTemplate,
        result_key: &str,
        dao_id: Option<&str>,
    ) -> Result<Vec<Record>, CensusError> {
        let pages = self.pages(template, result_key, dao_id);
        pin_mut!(pages);

        let mut records = Vec::new();
        while let Some(page) = pages.try_next().await? {
            records.extend(page);
        }
        Ok(records)
    }

    /// Collects every record of a query, applying `policy` on failure.
    pub async fn collect_with_retry(
        &self,
        template: QueryTemplate,
        result_key: &str,
        dao_id: Option<&str>,
        policy: RetryPolicy,
    ) -> Result<Vec<Record>, CensusError> {
        match self.collect(template, result_key, dao_id).await {
            Ok(records) => Ok(records),
            Err(err) => match policy {
                RetryPolicy::Never => Err(err),
                RetryPolicy::Once { cooldown } => {
                    warn!(
                        result_key,
                        dao_id = dao_id.unwrap_or("-"),
                        "request failed ({}), retrying in {}s",
                        err,
                        cooldown.as_secs()
                    );
                    tokio::time::sleep(cooldown).await;
                    let records = self.collect(template, result_key, dao_id).await?;
                    info!("Recovered: resuming requests");
                    Ok(records)
                }
            },
        }
    }
}
