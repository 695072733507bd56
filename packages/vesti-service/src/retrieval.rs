use std::sync::Arc;

use tracing::{debug, warn};

use vesti_domain::{
	CatalogItem, EmbeddingVector, ScoredCandidate,
	catalog::{DEFAULT_PRICE, DEFAULT_TITLE, PLACEHOLDER_IMAGE_URL},
};
use vesti_storage::models::IndexHit;

use crate::SimilarityIndex;

pub const DEFAULT_NUM_CANDIDATES: u64 = 100;
pub const DEFAULT_LIMIT: u64 = 10;

#[derive(Clone)]
pub struct CandidateRetriever {
	index: Option<Arc<dyn SimilarityIndex>>,
	num_candidates: u64,
}
impl CandidateRetriever {
	pub fn new(index: Option<Arc<dyn SimilarityIndex>>, num_candidates: u64) -> Self {
		Self { index, num_candidates }
	}

	/// Never fails and never retries: a missing or failing index yields an empty list.
	pub async fn retrieve(&self, query: &EmbeddingVector, limit: u64) -> Vec<ScoredCandidate> {
		let Some(index) = self.index.as_ref() else {
			debug!("Similarity index is not configured; skipping retrieval.");

			return Vec::new();
		};
		let hits = match index.search(query.as_slice(), self.num_candidates, limit).await {
			Ok(hits) => hits,
			Err(err) => {
				warn!(error = %err, "Vector search failed.");

				return Vec::new();
			},
		};

		hits.into_iter().filter_map(map_hit).collect()
	}
}

/// Applies payload defaults. Hits without a sku or a finite similarity are skipped.
pub fn map_hit(hit: IndexHit) -> Option<ScoredCandidate> {
	let Some(sku) = hit.sku.filter(|sku| !sku.trim().is_empty()) else {
		warn!("Vector search hit missing sku.");

		return None;
	};
	let Some(similarity) = hit.similarity.filter(|value| value.is_finite()) else {
		warn!(sku = %sku, "Vector search hit missing similarity.");

		return None;
	};
	let price = hit.price.filter(|value| value.is_finite()).unwrap_or(DEFAULT_PRICE).max(0.0);
	let image_url = hit
		.url
		.filter(|url| !url.is_empty())
		.or(hit.source_url.filter(|url| !url.is_empty()))
		.unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());
	let item = CatalogItem {
		sku,
		title: hit.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
		price,
		image_url,
	};

	Some(ScoredCandidate::real_match(item, similarity))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn applies_defaults_for_missing_fields() {
		let candidate = map_hit(IndexHit {
			sku: Some("SKU-1".to_string()),
			similarity: Some(0.91),
			..Default::default()
		})
		.expect("Expected a candidate.");

		assert_eq!(candidate.item.title, "Item");
		assert_eq!(candidate.item.price, 99.0);
		assert_eq!(candidate.item.image_url, PLACEHOLDER_IMAGE_URL);
		assert_eq!(candidate.similarity, 0.91);
	}

	#[test]
	fn prefers_url_then_source_url() {
		let with_url = map_hit(IndexHit {
			sku: Some("A".to_string()),
			url: Some("https://shop.example.com/a".to_string()),
			source_url: Some("https://img.example.com/a.jpg".to_string()),
			similarity: Some(0.5),
			..Default::default()
		})
		.expect("Expected a candidate.");
		let empty_url = map_hit(IndexHit {
			sku: Some("B".to_string()),
			url: Some(String::new()),
			source_url: Some("https://img.example.com/b.jpg".to_string()),
			similarity: Some(0.5),
			..Default::default()
		})
		.expect("Expected a candidate.");

		assert_eq!(with_url.item.image_url, "https://shop.example.com/a");
		assert_eq!(empty_url.item.image_url, "https://img.example.com/b.jpg");
	}

	#[test]
	fn skips_malformed_hits() {
		let no_sku = IndexHit { similarity: Some(0.9), ..Default::default() };
		let no_score = IndexHit { sku: Some("A".to_string()), ..Default::default() };
		let nan_score =
			IndexHit { sku: Some("B".to_string()), similarity: Some(f64::NAN), ..Default::default() };

		assert!(map_hit(no_sku).is_none());
		assert!(map_hit(no_score).is_none());
		assert!(map_hit(nan_score).is_none());
	}

	#[test]
	fn clamps_negative_price() {
		let candidate = map_hit(IndexHit {
			sku: Some("A".to_string()),
			price: Some(-5.0),
			similarity: Some(0.9),
			..Default::default()
		})
		.expect("Expected a candidate.");

		assert_eq!(candidate.item.price, 0.0);
	}
}
