use std::{
	env,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::Map;
use tokio::time;

use vesti_config::{
	Config, InferenceProviderConfig, Providers as ProviderConfigs, Qdrant, Request, Security,
	Service, Storage,
};
use vesti_service::{
	BoxFuture, Error, InferenceProvider, Providers, Recommender, Result, SimilarityIndex,
};
use vesti_storage::models::IndexHit;

pub const INFERENCE_TIMEOUT_MS: u64 = 6_000;
pub const DEADLINE_MS: u64 = 8_000;

/// A config wired to fake collaborators, with the production timeouts.
pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		request: Request { deadline_ms: DEADLINE_MS },
		providers: ProviderConfigs {
			inference: InferenceProviderConfig {
				api_base: Some("http://inference.test".to_string()),
				path: "/infer".to_string(),
				api_key: None,
				timeout_ms: INFERENCE_TIMEOUT_MS,
				default_headers: Map::new(),
			},
		},
		storage: Storage {
			vector_dim: 256,
			qdrant: Some(Qdrant {
				url: "http://qdrant.test:6334".to_string(),
				collection: "fashion_items".to_string(),
				num_candidates: 100,
				limit: 10,
				timeout_ms: 5_000,
			}),
			catalog: None,
		},
		security: Security { bind_localhost_only: true },
	}
}

pub fn recommender(inference: StubInference, index: Option<StubIndex>) -> Recommender {
	let index = index.map(|index| Arc::new(index) as Arc<dyn SimilarityIndex>);

	Recommender::new(&test_config(), Providers::new(Arc::new(inference), index))
}

pub fn hit(sku: &str, similarity: f64, price: f64) -> IndexHit {
	IndexHit {
		sku: Some(sku.to_string()),
		title: Some(format!("Item {sku}")),
		price: Some(price),
		url: None,
		source_url: Some(format!("https://img.example.com/{sku}.jpg")),
		similarity: Some(similarity),
	}
}

/// Base URL of a live Qdrant for optional integration tests.
pub fn env_qdrant_url() -> Option<String> {
	env::var("VESTI_QDRANT_URL").ok().filter(|url| !url.trim().is_empty())
}

enum InferenceScript {
	Vector(Vec<f32>),
	Fail(String),
}

pub struct StubInference {
	script: InferenceScript,
	delay: Option<Duration>,
	calls: Arc<AtomicUsize>,
}
impl StubInference {
	pub fn vector(values: Vec<f32>) -> Self {
		Self { script: InferenceScript::Vector(values), delay: None, calls: Default::default() }
	}

	pub fn failing(message: &str) -> Self {
		Self {
			script: InferenceScript::Fail(message.to_string()),
			delay: None,
			calls: Default::default(),
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	/// Shared counter; stays valid after the stub moves into a recommender.
	pub fn calls(&self) -> Arc<AtomicUsize> {
		self.calls.clone()
	}
}
impl InferenceProvider for StubInference {
	fn infer<'a>(
		&'a self,
		_cfg: &'a InferenceProviderConfig,
		_image: &'a [u8],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			if let Some(delay) = self.delay {
				time::sleep(delay).await;
			}

			match &self.script {
				InferenceScript::Vector(values) => Ok(values.clone()),
				InferenceScript::Fail(message) =>
					Err(Error::Provider { message: message.clone() }),
			}
		})
	}
}

enum IndexScript {
	Hits(Vec<IndexHit>),
	Fail(String),
	Panic,
}

pub struct StubIndex {
	script: IndexScript,
	delay: Option<Duration>,
	queries: Arc<Mutex<Vec<Vec<f32>>>>,
	search_args: Arc<Mutex<Vec<(u64, u64)>>>,
	completed: Arc<AtomicUsize>,
}
impl StubIndex {
	pub fn hits(hits: Vec<IndexHit>) -> Self {
		Self::scripted(IndexScript::Hits(hits))
	}

	pub fn failing(message: &str) -> Self {
		Self::scripted(IndexScript::Fail(message.to_string()))
	}

	pub fn panicking() -> Self {
		Self::scripted(IndexScript::Panic)
	}

	fn scripted(script: IndexScript) -> Self {
		Self {
			script,
			delay: None,
			queries: Default::default(),
			search_args: Default::default(),
			completed: Default::default(),
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	/// Query vectors received so far, shared with the stub.
	pub fn queries(&self) -> Arc<Mutex<Vec<Vec<f32>>>> {
		self.queries.clone()
	}

	/// `(num_candidates, limit)` of every search received so far.
	pub fn search_args(&self) -> Arc<Mutex<Vec<(u64, u64)>>> {
		self.search_args.clone()
	}

	/// Searches that ran to the end of their scripted delay.
	pub fn completed(&self) -> Arc<AtomicUsize> {
		self.completed.clone()
	}
}
impl SimilarityIndex for StubIndex {
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		num_candidates: u64,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).push(vector.to_vec());
		self.search_args
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push((num_candidates, limit));

		Box::pin(async move {
			if let Some(delay) = self.delay {
				time::sleep(delay).await;
			}

			self.completed.fetch_add(1, Ordering::SeqCst);

			match &self.script {
				IndexScript::Hits(hits) =>
					Ok(hits.iter().take(limit as usize).cloned().collect()),
				IndexScript::Fail(message) => Err(Error::Qdrant { message: message.clone() }),
				IndexScript::Panic => panic!("scripted index panic"),
			}
		})
	}
}
