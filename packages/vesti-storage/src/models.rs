use serde::Deserialize;

/// One nearest-neighbour result exactly as the index returned it.
///
/// Every field is optional; mapping into a domain candidate decides what is usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexHit {
	pub sku: Option<String>,
	pub title: Option<String>,
	pub price: Option<f64>,
	pub url: Option<String>,
	pub source_url: Option<String>,
	pub similarity: Option<f64>,
}

/// A catalog row as stored on disk for the in-memory index.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
	pub sku: String,
	pub title: Option<String>,
	pub price: Option<f64>,
	pub url: Option<String>,
	pub source_url: Option<String>,
	pub embedding: Vec<f32>,
}
impl CatalogRecord {
	pub fn to_hit(&self, similarity: f64) -> IndexHit {
		IndexHit {
			sku: Some(self.sku.clone()),
			title: self.title.clone(),
			price: self.price,
			url: self.url.clone(),
			source_url: self.source_url.clone(),
			similarity: Some(similarity),
		}
	}
}
