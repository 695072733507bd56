use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Item";
pub const DEFAULT_PRICE: f64 = 99.0;
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/600";

/// A product as the index stores it. Two items with the same `sku` are the same item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
	pub sku: String,
	pub title: String,
	pub price: f64,
	pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchReason {
	RealMatch,
	Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
	pub item: CatalogItem,
	pub similarity: f64,
	pub reason: MatchReason,
}
impl ScoredCandidate {
	pub fn real_match(item: CatalogItem, similarity: f64) -> Self {
		Self { item, similarity, reason: MatchReason::RealMatch }
	}
}

/// Pre-baked picks served when retrieval comes back empty.
pub fn fallback_items() -> [ScoredCandidate; 2] {
	[
		fallback(
			"FALLBACK01",
			"Black Oversized Hoodie",
			79.99,
			"https://images.unsplash.com/photo-1556821845-9d237b3edfc8?w=800",
			0.98,
		),
		fallback(
			"FALLBACK02",
			"White Minimal Sneakers",
			129.00,
			"https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=800",
			0.96,
		),
	]
}

fn fallback(sku: &str, title: &str, price: f64, image_url: &str, similarity: f64) -> ScoredCandidate {
	ScoredCandidate {
		item: CatalogItem {
			sku: sku.to_string(),
			title: title.to_string(),
			price,
			image_url: image_url.to_string(),
		},
		similarity,
		reason: MatchReason::Fallback,
	}
}
