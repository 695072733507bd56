use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vesti_domain::RecommendationResponse;
use vesti_service::RecommendationRequest;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendBody {
	/// Base64-encoded JPEG bytes.
	pub image_bytes: String,
	#[serde(default)]
	pub user_id: Option<String>,
	#[serde(default)]
	pub context_info: Option<Value>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/recommend", post(recommend))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn recommend(
	State(state): State<AppState>,
	payload: Result<Json<RecommendBody>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, ApiError> {
	let Json(payload) = payload.map_err(|rejection| {
		json_error(rejection.status(), "invalid_request", rejection.body_text(), None)
	})?;
	let image_bytes = STANDARD.decode(payload.image_bytes.trim()).map_err(|err| {
		json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("image_bytes is not valid base64: {err}."),
			Some(vec!["image_bytes".to_string()]),
		)
	})?;
	let request = RecommendationRequest {
		image_bytes,
		user_id: payload.user_id,
		context_info: payload.context_info,
	};

	Ok(Json(state.recommender.handle(request).await))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
