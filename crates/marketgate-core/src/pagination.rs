//! Cursor-style page accumulation over the request executor.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::executor::{AttemptFailure, RequestExecutor};
use crate::http_client::HttpMethod;

/// Paging parameters for endpoints that serve list data in pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page_param: String,
    start_page: u32,
    max_pages: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("max_pages must be at least 1")]
    ZeroMaxPages,
}

impl Pagination {
    pub fn new(
        page_param: impl Into<String>,
        start_page: u32,
        max_pages: u32,
    ) -> Result<Self, PaginationError> {
        if max_pages == 0 {
            return Err(PaginationError::ZeroMaxPages);
        }
        Ok(Self {
            page_param: page_param.into(),
            start_page,
            max_pages,
        })
    }

    /// Provider default: `page` starting at 0, one page.
    pub fn single_page() -> Self {
        Self {
            page_param: String::from("page"),
            start_page: 0,
            max_pages: 1,
        }
    }

    pub fn page_param(&self) -> &str {
        &self.page_param
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }
}

/// Fetches up to `max_pages` pages and concatenates their rows in page
/// order.
///
/// Stops at the page bound, on an empty page (the provider's end-of-data
/// signal), or on a non-list page, which is appended whole since some
/// endpoints ignore paging parameters and return a single object. A failure on any
/// page aborts the whole accumulation; rows already gathered are discarded
/// rather than returned as a silent partial success.
pub async fn accumulate(
    executor: &RequestExecutor,
    method: HttpMethod,
    path: &str,
    params: &BTreeMap<String, String>,
    pagination: &Pagination,
) -> Result<Value, AttemptFailure> {
    let mut rows: Vec<Value> = Vec::new();
    let mut page = pagination.start_page;

    for fetched in 0..pagination.max_pages {
        let mut page_params = params.clone();
        page_params.insert(pagination.page_param.clone(), page.to_string());

        let chunk = executor.execute(method, path, &page_params).await?;
        if is_empty_chunk(&chunk) {
            debug!(path, page, "empty page, stopping accumulation");
            break;
        }

        match chunk {
            Value::Array(mut page_rows) => {
                rows.append(&mut page_rows);
            }
            other => {
                rows.push(other);
                break;
            }
        }

        debug!(path, page, pages_fetched = fetched + 1, total_rows = rows.len(), "page accumulated");
        page += 1;
    }

    Ok(Value::Array(rows))
}

/// The provider signals the end of a paged collection with an empty body.
fn is_empty_chunk(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}
