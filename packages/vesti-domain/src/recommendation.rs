use serde::{Deserialize, Serialize};

use crate::{CatalogItem, MatchReason};

/// A ranked item as the caller sees it. `score` replaces the raw similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationEntry {
	#[serde(flatten)]
	pub item: CatalogItem,
	pub score: f64,
	pub reason: MatchReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
	Live,
	Timeout,
	Error,
}
impl SessionOutcome {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Live => "live",
			Self::Timeout => "timeout",
			Self::Error => "error",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
	pub session_id: SessionOutcome,
	pub recommendations: Vec<RecommendationEntry>,
}
impl RecommendationResponse {
	pub fn live(recommendations: Vec<RecommendationEntry>) -> Self {
		Self { session_id: SessionOutcome::Live, recommendations }
	}

	pub fn timeout() -> Self {
		Self { session_id: SessionOutcome::Timeout, recommendations: Vec::new() }
	}

	pub fn error() -> Self {
		Self { session_id: SessionOutcome::Error, recommendations: Vec::new() }
	}
}
