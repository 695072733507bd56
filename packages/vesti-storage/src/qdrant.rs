use std::{collections::HashMap, time::Duration};

use qdrant_client::qdrant::{
	Query, QueryPointsBuilder, ScoredPoint, SearchParamsBuilder, Value, value::Kind,
};

use crate::{Result, models::IndexHit};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
}
impl QdrantStore {
	pub fn new(cfg: &vesti_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url)
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()?;

		Ok(Self { client, collection: cfg.collection.clone() })
	}

	/// Nearest-neighbour search. `num_candidates` widens the HNSW beam; `limit` caps the result.
	pub async fn search(
		&self,
		vector: &[f32],
		num_candidates: u64,
		limit: u64,
	) -> Result<Vec<IndexHit>> {
		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.params(SearchParamsBuilder::default().hnsw_ef(num_candidates))
			.with_payload(true)
			.limit(limit);
		let response = self.client.query(search).await?;

		Ok(response.result.iter().map(point_to_hit).collect())
	}
}

fn point_to_hit(point: &ScoredPoint) -> IndexHit {
	IndexHit {
		sku: payload_string(&point.payload, "sku"),
		title: payload_string(&point.payload, "title"),
		price: payload_f64(&point.payload, "price"),
		url: payload_string(&point.payload, "url"),
		source_url: payload_string(&point.payload, "source_url"),
		similarity: Some(f64::from(point.score)),
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}

fn payload_f64(payload: &HashMap<String, Value>, key: &str) -> Option<f64> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::DoubleValue(value)) => Some(*value),
		Some(Kind::IntegerValue(value)) => Some(*value as f64),
		Some(Kind::StringValue(text)) => text.trim().parse().ok(),
		_ => None,
	}
}
