//! Movies, series and their episodes.

pub mod episodes;
pub mod movies;
pub mod series;

use crate::trending::TrendingDeletion;
use serde::Deserialize;

/// Upper bound for `limit` on list endpoints.
pub const MAX_LIMIT: u64 = 100;

/// A deleted title together with the trending slots that pointed at it.
#[derive(Debug)]
pub struct Removed<M> {
    pub model: M,
    pub trending: Vec<TrendingDeletion>,
}

/// Query string accepted by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Title substring.
    pub q: Option<String>,
    pub limit: Option<u64>,
    /// Series only.
    pub is_animated: Option<bool>,
}

impl CatalogQuery {
    pub(crate) fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub(crate) fn limit(&self) -> Option<u64> {
        self.limit.map(|limit| limit.min(MAX_LIMIT))
    }
}
