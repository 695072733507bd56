use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use vesti_config::InferenceProviderConfig;
use vesti_domain::EmbeddingVector;

use crate::InferenceProvider;

/// Produces a query embedding for every request, real or synthetic.
#[derive(Clone)]
pub struct EmbeddingSource {
	provider: Arc<dyn InferenceProvider>,
	cfg: InferenceProviderConfig,
}
impl EmbeddingSource {
	pub fn new(provider: Arc<dyn InferenceProvider>, cfg: InferenceProviderConfig) -> Self {
		Self { provider, cfg }
	}

	/// Never fails. Any inference problem, including running past `timeout_ms`, yields
	/// [`EmbeddingVector::synthetic`].
	pub async fn embed(&self, image: &[u8]) -> EmbeddingVector {
		if self.cfg.api_base.is_none() {
			info!(path = "synthetic", "Inference is not configured; using synthetic embedding.");

			return EmbeddingVector::synthetic();
		}

		let timeout = Duration::from_millis(self.cfg.timeout_ms);

		match tokio::time::timeout(timeout, self.provider.infer(&self.cfg, image)).await {
			Ok(Ok(values)) => match EmbeddingVector::new(values) {
				Ok(vector) => {
					info!(path = "inference", "Using inference embedding.");

					vector
				},
				Err(rejection) => {
					warn!(
						path = "synthetic",
						?rejection,
						"Inference embedding rejected; using synthetic embedding."
					);

					EmbeddingVector::synthetic()
				},
			},
			Ok(Err(err)) => {
				info!(path = "synthetic", error = %err, "Inference unavailable; using synthetic embedding.");

				EmbeddingVector::synthetic()
			},
			Err(_) => {
				info!(
					path = "synthetic",
					timeout_ms = self.cfg.timeout_ms,
					"Inference timed out; using synthetic embedding."
				);

				EmbeddingVector::synthetic()
			},
		}
	}
}
