use std::time::Duration;

use reqwest::{
	Client,
	multipart::{Form, Part},
};
use serde_json::Value;

use crate::{Error, Result};

const UPLOAD_FILE_NAME: &str = "img.jpg";
const UPLOAD_MIME: &str = "image/jpeg";

/// Uploads one image to the inference service and returns its raw embedding.
///
/// Length and finiteness checks are left to the caller, which owns the fallback decision.
pub async fn infer(cfg: &vesti_config::InferenceProviderConfig, image: &[u8]) -> Result<Vec<f32>> {
	let api_base = cfg.api_base.as_deref().ok_or_else(|| Error::InvalidConfig {
		message: "Inference api_base is not configured.".to_string(),
	})?;
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{api_base}{}", cfg.path);
	let part = Part::bytes(image.to_vec()).file_name(UPLOAD_FILE_NAME).mime_str(UPLOAD_MIME)?;
	let form = Form::new().part("file", part);
	let res = client
		.post(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.multipart(form)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_inference_response(json)
}

fn parse_inference_response(json: Value) -> Result<Vec<f32>> {
	let embedding = json
		.get("embedding")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Inference response is missing embedding array.".to_string(),
		})?;

	if embedding.is_empty() {
		return Err(Error::InvalidResponse {
			message: "Inference response embedding is empty.".to_string(),
		});
	}

	let mut vec = Vec::with_capacity(embedding.len());

	for value in embedding {
		let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
			message: "Embedding value must be numeric.".to_string(),
		})?;

		vec.push(number as f32);
	}

	Ok(vec)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embedding_field() {
		let json = serde_json::json!({
			"detections": [],
			"colors": ["#202020"],
			"embedding": [0.25, 0.5, 1.0]
		});
		let parsed = parse_inference_response(json).expect("parse failed");

		assert_eq!(parsed, vec![0.25, 0.5, 1.0]);
	}

	#[test]
	fn rejects_missing_or_non_numeric_embedding() {
		let missing = serde_json::json!({ "colors": [] });
		let non_numeric = serde_json::json!({ "embedding": [0.1, "x"] });
		let empty = serde_json::json!({ "embedding": [] });

		assert!(matches!(parse_inference_response(missing), Err(Error::InvalidResponse { .. })));
		assert!(matches!(
			parse_inference_response(non_numeric),
			Err(Error::InvalidResponse { .. })
		));
		assert!(matches!(parse_inference_response(empty), Err(Error::InvalidResponse { .. })));
	}
}
