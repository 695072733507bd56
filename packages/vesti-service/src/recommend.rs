use std::{
	sync::Arc,
	time::{Duration, Instant},
};

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use vesti_config::Config;
use vesti_domain::{RecommendationEntry, RecommendationResponse, ranking};

use crate::{CandidateRetriever, EmbeddingSource, Providers, Result};

#[derive(Debug, Clone, Default)]
pub struct RecommendationRequest {
	pub image_bytes: Vec<u8>,
	pub user_id: Option<String>,
	/// Caller-supplied hints such as a budget. Recorded but not used for ranking.
	pub context_info: Option<Value>,
}

/// Aborts the pipeline task once nobody is waiting for it: on timeout, or when the
/// caller drops the request future.
struct AbortOnDrop<T>(JoinHandle<T>);
impl<T> Drop for AbortOnDrop<T> {
	fn drop(&mut self) {
		self.0.abort();
	}
}

struct Pipeline {
	embedding: EmbeddingSource,
	retriever: CandidateRetriever,
	limit: u64,
}
impl Pipeline {
	async fn run(&self, request: RecommendationRequest) -> Vec<RecommendationEntry> {
		let query = self.embedding.embed(&request.image_bytes).await;
		let candidates = self.retriever.retrieve(&query, self.limit).await;

		ranking::rank(candidates)
	}
}

/// Runs embed, retrieve and rank under one deadline. Cheap to clone and safe to share
/// between request handlers.
#[derive(Clone)]
pub struct Recommender {
	pipeline: Arc<Pipeline>,
	deadline: Duration,
}
impl Recommender {
	pub fn new(cfg: &Config, providers: Providers) -> Self {
		let embedding = EmbeddingSource::new(providers.inference, cfg.providers.inference.clone());
		let retriever =
			CandidateRetriever::new(providers.index, crate::retrieval_num_candidates(cfg));
		let pipeline = Pipeline { embedding, retriever, limit: crate::retrieval_limit(cfg) };

		Self {
			pipeline: Arc::new(pipeline),
			deadline: Duration::from_millis(cfg.request.deadline_ms),
		}
	}

	pub fn from_config(cfg: &Config) -> Result<Self> {
		Ok(Self::new(cfg, Providers::from_config(cfg)?))
	}

	pub fn deadline(&self) -> Duration {
		self.deadline
	}

	/// Always returns a well-formed response tagged `live`, `timeout` or `error`.
	pub async fn handle(&self, request: RecommendationRequest) -> RecommendationResponse {
		let span = info_span!("recommend", request_id = %Uuid::new_v4());

		self.run_with_deadline(request).instrument(span).await
	}

	async fn run_with_deadline(&self, request: RecommendationRequest) -> RecommendationResponse {
		info!(
			user_id = request.user_id.as_deref().unwrap_or("anonymous"),
			image_bytes = request.image_bytes.len(),
			has_context = request.context_info.is_some(),
			"Recommendation requested."
		);

		let started = Instant::now();
		let pipeline = Arc::clone(&self.pipeline);
		// A panic inside the task surfaces as a `JoinError` instead of unwinding into the caller.
		let mut task = AbortOnDrop(tokio::spawn(
			async move { pipeline.run(request).await }.in_current_span(),
		));

		match tokio::time::timeout(self.deadline, &mut task.0).await {
			Ok(Ok(recommendations)) => {
				info!(
					count = recommendations.len(),
					elapsed_ms = started.elapsed().as_millis() as u64,
					"Returned recommendations."
				);

				RecommendationResponse::live(recommendations)
			},
			Ok(Err(err)) => {
				error!(error = %err, "Recommendation pipeline failed.");

				RecommendationResponse::error()
			},
			Err(_) => {
				warn!(
					deadline_ms = self.deadline.as_millis() as u64,
					"Recommendation pipeline timed out."
				);

				RecommendationResponse::timeout()
			},
		}
	}
}
