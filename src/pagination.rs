//! Pagination policy slot: limit/offset with process-wide defaults.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        PaginationPolicy {
            default_page_size: 100,
            max_page_size: 1000,
        }
    }
}

impl PaginationPolicy {
    /// Parse `limit`/`offset` query params into an effective page. Missing or
    /// unparsable values fall back to the policy defaults; the limit is
    /// clamped to `max_page_size`.
    pub fn page(&self, params: &HashMap<String, String>) -> (u32, u32) {
        let limit = params
            .get("limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);
        let offset = params
            .get("offset")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        (limit, offset)
    }
}
