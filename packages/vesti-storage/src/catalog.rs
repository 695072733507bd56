use std::{cmp::Ordering, fs, path::Path};

use vesti_domain::embedding::cosine_similarity;

use crate::{
	Error, Result,
	models::{CatalogRecord, IndexHit},
};

/// Brute-force cosine index over a catalog snapshot held in memory.
pub struct MemoryIndex {
	records: Vec<CatalogRecord>,
}
impl MemoryIndex {
	pub fn new(records: Vec<CatalogRecord>) -> Self {
		Self { records }
	}

	pub fn load(cfg: &vesti_config::Catalog) -> Result<Self> {
		Self::load_path(&cfg.path)
	}

	pub fn load_path(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadCatalog { path: path.to_path_buf(), source: err })?;
		let records: Vec<CatalogRecord> = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseCatalog { path: path.to_path_buf(), source: err })?;

		Ok(Self::new(records))
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Scores every record against `vector` and returns the best `limit`, most similar first.
	///
	/// Records whose embedding width differs from the query are skipped.
	pub fn search(&self, vector: &[f32], limit: u64) -> Result<Vec<IndexHit>> {
		if vector.is_empty() {
			return Err(Error::InvalidArgument("Query vector must be non-empty.".to_string()));
		}

		let mut scored: Vec<(f64, &CatalogRecord)> = self
			.records
			.iter()
			.filter(|record| record.embedding.len() == vector.len())
			.map(|record| (cosine_similarity(vector, &record.embedding), record))
			.collect();

		scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
		scored.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

		Ok(scored.into_iter().map(|(similarity, record)| record.to_hit(similarity)).collect())
	}
}
