pub mod embedding;
pub mod recommend;
pub mod retrieval;

mod error;

pub use embedding::EmbeddingSource;
pub use error::{Error, Result};
pub use recommend::{RecommendationRequest, Recommender};
pub use retrieval::CandidateRetriever;

use std::{future::Future, pin::Pin, sync::Arc};

use vesti_config::{Config, InferenceProviderConfig};
use vesti_providers::inference;
use vesti_storage::{catalog::MemoryIndex, models::IndexHit, qdrant::QdrantStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns image bytes into a raw embedding. Width checks happen in [`EmbeddingSource`].
pub trait InferenceProvider
where
	Self: Send + Sync,
{
	fn infer<'a>(
		&'a self,
		cfg: &'a InferenceProviderConfig,
		image: &'a [u8],
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

/// Nearest-neighbour search over the item catalog, most similar first.
pub trait SimilarityIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		num_candidates: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub inference: Arc<dyn InferenceProvider>,
	/// `None` when no index is configured; retrieval then yields nothing.
	pub index: Option<Arc<dyn SimilarityIndex>>,
}

struct DefaultProviders;

impl InferenceProvider for DefaultProviders {
	fn infer<'a>(
		&'a self,
		cfg: &'a InferenceProviderConfig,
		image: &'a [u8],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { Ok(inference::infer(cfg, image).await?) })
	}
}

impl SimilarityIndex for QdrantStore {
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		num_candidates: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>> {
		Box::pin(async move { Ok(QdrantStore::search(self, vector, num_candidates, limit).await?) })
	}
}

impl SimilarityIndex for MemoryIndex {
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		_num_candidates: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>> {
		Box::pin(async move { Ok(MemoryIndex::search(self, vector, limit)?) })
	}
}

impl Providers {
	pub fn new(
		inference: Arc<dyn InferenceProvider>,
		index: Option<Arc<dyn SimilarityIndex>>,
	) -> Self {
		Self { inference, index }
	}

	/// Builds the HTTP inference client and whichever index the config names.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let index = match (cfg.storage.qdrant.as_ref(), cfg.storage.catalog.as_ref()) {
			(Some(qdrant), _) =>
				Some(Arc::new(QdrantStore::new(qdrant)?) as Arc<dyn SimilarityIndex>),
			(None, Some(catalog)) =>
				Some(Arc::new(MemoryIndex::load(catalog)?) as Arc<dyn SimilarityIndex>),
			(None, None) => None,
		};

		Ok(Self { inference: Arc::new(DefaultProviders), index })
	}
}

/// Result limit requested from whichever index is configured.
pub(crate) fn retrieval_limit(cfg: &Config) -> u64 {
	cfg.storage
		.qdrant
		.as_ref()
		.map(|qdrant| qdrant.limit)
		.or_else(|| cfg.storage.catalog.as_ref().map(|catalog| catalog.limit))
		.unwrap_or(retrieval::DEFAULT_LIMIT)
}

pub(crate) fn retrieval_num_candidates(cfg: &Config) -> u64 {
	cfg.storage
		.qdrant
		.as_ref()
		.map(|qdrant| qdrant.num_candidates)
		.unwrap_or(retrieval::DEFAULT_NUM_CANDIDATES)
}
