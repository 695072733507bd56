use std::{
	sync::{Arc, atomic::Ordering},
	time::Duration,
};

use tokio::time::{self, Instant};

use vesti_domain::{EMBEDDING_DIM, EmbeddingVector, MatchReason, SessionOutcome};
use vesti_service::{
	EmbeddingSource, Providers, RecommendationRequest, Recommender, SimilarityIndex,
};
use vesti_testkit::{StubIndex, StubInference, hit, recommender, test_config};

fn request() -> RecommendationRequest {
	RecommendationRequest {
		image_bytes: b"\xFF\xD8\xFFfake-jpeg".to_vec(),
		user_id: Some("web_user_123".to_string()),
		context_info: Some(serde_json::json!({ "budget": 200 })),
	}
}

fn real_vector() -> Vec<f32> {
	(0..EMBEDDING_DIM).map(|i| (i % 7) as f32 * 0.1).collect()
}

#[tokio::test(start_paused = true)]
async fn live_response_uses_inference_vector_and_ranks_hits() {
	let index = StubIndex::hits(vec![
		hit("A", 0.90, 120.0),
		hit("B", 0.80, 150.0),
		hit("C", 0.95, 100.0),
		hit("D", 0.70, 300.0),
		hit("E", 0.60, 110.0),
	]);
	let queries = index.queries();
	let search_args = index.search_args();
	let recommender = recommender(StubInference::vector(real_vector()), Some(index));
	let response = recommender.handle(request()).await;
	let skus: Vec<&str> = response.recommendations.iter().map(|e| e.item.sku.as_str()).collect();

	assert_eq!(response.session_id, SessionOutcome::Live);
	assert_eq!(skus, vec!["C", "A", "B"]);
	assert!(response.recommendations.iter().all(|e| e.reason == MatchReason::RealMatch));
	assert_eq!(queries.lock().expect("queries lock").as_slice(), &[real_vector()]);
	assert_eq!(search_args.lock().expect("search args lock").as_slice(), &[(100, 10)]);
}

#[tokio::test(start_paused = true)]
async fn slow_inference_falls_back_to_synthetic_vector_within_deadline() {
	let index = StubIndex::hits(vec![hit("A", 0.78, 50.0)]);
	let queries = index.queries();
	let inference = StubInference::vector(real_vector()).with_delay(Duration::from_secs(7));
	let recommender = recommender(inference, Some(index));
	let started = Instant::now();
	let response = recommender.handle(request()).await;

	assert_eq!(response.session_id, SessionOutcome::Live);
	assert_eq!(response.recommendations.len(), 1);
	assert!((response.recommendations[0].score - 0.87).abs() < 1e-9);
	assert_eq!(
		queries.lock().expect("queries lock").as_slice(),
		&[EmbeddingVector::synthetic().into_inner()]
	);
	assert!(started.elapsed() < recommender.deadline());
}

#[tokio::test(start_paused = true)]
async fn hanging_retrieval_times_out() {
	let index = StubIndex::hits(vec![hit("A", 0.9, 50.0)]).with_delay(Duration::from_secs(60));
	let recommender = recommender(StubInference::vector(real_vector()), Some(index));
	let response = recommender.handle(request()).await;

	assert_eq!(response.session_id, SessionOutcome::Timeout);
	assert!(response.recommendations.is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropped_request_stops_pipeline() {
	let index = StubIndex::hits(vec![hit("A", 0.9, 50.0)]).with_delay(Duration::from_secs(3));
	let queries = index.queries();
	let completed = index.completed();
	let recommender = recommender(StubInference::vector(real_vector()), Some(index));
	let outcome = time::timeout(Duration::from_secs(1), recommender.handle(request())).await;

	assert!(outcome.is_err());

	time::sleep(Duration::from_secs(5)).await;

	assert_eq!(queries.lock().expect("queries lock").len(), 1);
	assert_eq!(completed.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn timed_out_pipeline_is_aborted() {
	let index = StubIndex::hits(vec![hit("A", 0.9, 50.0)]).with_delay(Duration::from_secs(10));
	let completed = index.completed();
	let recommender = recommender(StubInference::vector(real_vector()), Some(index));
	let response = recommender.handle(request()).await;

	time::sleep(Duration::from_secs(5)).await;

	assert_eq!(response.session_id, SessionOutcome::Timeout);
	assert_eq!(completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_inference_uses_synthetic_vector() {
	let index = StubIndex::hits(vec![hit("A", 0.9, 250.0)]);
	let queries = index.queries();
	let inference = StubInference::failing("connection refused");
	let calls = inference.calls();
	let recommender = recommender(inference, Some(index));
	let response = recommender.handle(request()).await;

	assert_eq!(response.session_id, SessionOutcome::Live);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(
		queries.lock().expect("queries lock").as_slice(),
		&[EmbeddingVector::synthetic().into_inner()]
	);
}

#[tokio::test]
async fn wrong_width_inference_vector_is_replaced() {
	let index = StubIndex::hits(Vec::new());
	let queries = index.queries();
	let recommender = recommender(StubInference::vector(vec![0.5; 512]), Some(index));

	recommender.handle(request()).await;

	assert_eq!(
		queries.lock().expect("queries lock").as_slice(),
		&[EmbeddingVector::synthetic().into_inner()]
	);
}

#[tokio::test]
async fn failing_index_serves_static_fallback() {
	let recommender =
		recommender(StubInference::vector(real_vector()), Some(StubIndex::failing("unreachable")));
	let response = recommender.handle(request()).await;
	let skus: Vec<&str> = response.recommendations.iter().map(|e| e.item.sku.as_str()).collect();

	assert_eq!(response.session_id, SessionOutcome::Live);
	assert_eq!(skus, vec!["FALLBACK01", "FALLBACK02"]);
	assert!(response.recommendations.iter().all(|e| e.reason == MatchReason::Fallback));
}

#[tokio::test]
async fn missing_index_serves_static_fallback() {
	let recommender = recommender(StubInference::vector(real_vector()), None);
	let response = recommender.handle(request()).await;

	assert_eq!(response.session_id, SessionOutcome::Live);
	assert_eq!(response.recommendations.len(), 2);
}

#[tokio::test]
async fn low_scoring_hits_produce_empty_live_response() {
	let index = StubIndex::hits(vec![hit("A", 0.1, 20.0), hit("B", 0.2, 20.0)]);
	let recommender = recommender(StubInference::vector(real_vector()), Some(index));
	let response = recommender.handle(request()).await;

	assert_eq!(response.session_id, SessionOutcome::Live);
	assert!(response.recommendations.is_empty());
}

#[tokio::test]
async fn malformed_hits_are_skipped() {
	let mut no_sku = hit("X", 0.99, 20.0);

	no_sku.sku = None;

	let index = StubIndex::hits(vec![no_sku, hit("A", 0.9, 200.0)]);
	let recommender = recommender(StubInference::vector(real_vector()), Some(index));
	let response = recommender.handle(request()).await;

	assert_eq!(response.recommendations.len(), 1);
	assert_eq!(response.recommendations[0].item.sku, "A");
}

#[tokio::test]
async fn panicking_pipeline_reports_error() {
	let recommender =
		recommender(StubInference::vector(real_vector()), Some(StubIndex::panicking()));
	let response = recommender.handle(request()).await;

	assert_eq!(response.session_id, SessionOutcome::Error);
	assert!(response.recommendations.is_empty());
}

#[tokio::test]
async fn unconfigured_inference_is_never_called() {
	let mut cfg = test_config();

	cfg.providers.inference.api_base = None;

	let inference = StubInference::vector(real_vector());
	let calls = inference.calls();
	let source = EmbeddingSource::new(Arc::new(inference), cfg.providers.inference.clone());
	let vector = source.embed(b"jpeg").await;

	assert_eq!(vector, EmbeddingVector::synthetic());
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
	let index = StubIndex::hits(vec![hit("A", 0.9, 50.0), hit("B", 0.85, 500.0)]);
	let recommender = Recommender::new(
		&test_config(),
		Providers::new(
			Arc::new(StubInference::vector(real_vector())),
			Some(Arc::new(index) as Arc<dyn SimilarityIndex>),
		),
	);
	let handles: Vec<_> = (0..8)
		.map(|_| {
			let recommender = recommender.clone();

			tokio::spawn(async move { recommender.handle(request()).await })
		})
		.collect();
	let mut responses = Vec::new();

	for handle in handles {
		responses.push(handle.await.expect("request task failed"));
	}

	assert!(responses.windows(2).all(|pair| pair[0] == pair[1]));
	assert_eq!(responses[0].recommendations.len(), 2);
}
