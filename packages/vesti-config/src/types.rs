use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub request: Request,
	pub providers: Providers,
	pub storage: Storage,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Request {
	/// Upper bound for one embed, retrieve, rank pass.
	pub deadline_ms: u64,
}
impl Default for Request {
	fn default() -> Self {
		Self { deadline_ms: 8_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub inference: InferenceProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceProviderConfig {
	/// Optional. Blank or missing means the synthetic embedding is always used.
	#[serde(default)]
	pub api_base: Option<String>,
	#[serde(default = "default_inference_path")]
	pub path: String,
	/// Optional. Sent as a bearer token when present.
	#[serde(default)]
	pub api_key: Option<String>,
	#[serde(default = "default_inference_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	#[serde(default = "default_vector_dim")]
	pub vector_dim: u32,
	pub qdrant: Option<Qdrant>,
	pub catalog: Option<Catalog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	#[serde(default = "default_num_candidates")]
	pub num_candidates: u64,
	#[serde(default = "default_limit")]
	pub limit: u64,
	#[serde(default = "default_qdrant_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
	pub path: PathBuf,
	#[serde(default = "default_limit")]
	pub limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Security {
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_inference_path() -> String {
	"/infer".to_string()
}

fn default_inference_timeout_ms() -> u64 {
	6_000
}

fn default_vector_dim() -> u32 {
	vesti_domain::EMBEDDING_DIM as u32
}

fn default_num_candidates() -> u64 {
	100
}

fn default_limit() -> u64 {
	10
}

fn default_qdrant_timeout_ms() -> u64 {
	5_000
}
