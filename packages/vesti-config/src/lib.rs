mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Catalog, Config, InferenceProviderConfig, Providers, Qdrant, Request, Security, Service,
	Storage,
};

use std::{fs, path::Path};

use vesti_domain::EMBEDDING_DIM;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if usize::try_from(cfg.storage.vector_dim).ok() != Some(EMBEDDING_DIM) {
		return Err(Error::Validation {
			message: format!("storage.vector_dim must be {EMBEDDING_DIM}."),
		});
	}
	if cfg.request.deadline_ms == 0 {
		return Err(Error::Validation {
			message: "request.deadline_ms must be greater than zero.".to_string(),
		});
	}

	let inference = &cfg.providers.inference;

	if inference.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.inference.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if inference.timeout_ms >= cfg.request.deadline_ms {
		return Err(Error::Validation {
			message: "providers.inference.timeout_ms must be less than request.deadline_ms."
				.to_string(),
		});
	}
	if inference.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "providers.inference.default_headers values must be strings.".to_string(),
		});
	}

	if cfg.storage.qdrant.is_some() && cfg.storage.catalog.is_some() {
		return Err(Error::Validation {
			message: "storage.qdrant and storage.catalog are mutually exclusive.".to_string(),
		});
	}
	if let Some(qdrant) = cfg.storage.qdrant.as_ref() {
		if qdrant.url.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.qdrant.url must be non-empty.".to_string(),
			});
		}
		if qdrant.collection.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.qdrant.collection must be non-empty.".to_string(),
			});
		}
		if qdrant.limit == 0 {
			return Err(Error::Validation {
				message: "storage.qdrant.limit must be greater than zero.".to_string(),
			});
		}
		if qdrant.num_candidates < qdrant.limit {
			return Err(Error::Validation {
				message: "storage.qdrant.num_candidates must be at least storage.qdrant.limit."
					.to_string(),
			});
		}
	}
	if let Some(catalog) = cfg.storage.catalog.as_ref()
		&& catalog.limit == 0
	{
		return Err(Error::Validation {
			message: "storage.catalog.limit must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let inference = &mut cfg.providers.inference;

	if inference.api_base.as_deref().map(|base| base.trim().is_empty()).unwrap_or(false) {
		inference.api_base = None;
	}
	if inference.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		inference.api_key = None;
	}
}
