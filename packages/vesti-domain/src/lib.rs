pub mod catalog;
pub mod embedding;
pub mod ranking;
pub mod recommendation;

pub use catalog::{CatalogItem, MatchReason, ScoredCandidate};
pub use embedding::{EMBEDDING_DIM, EmbeddingRejection, EmbeddingVector};
pub use recommendation::{RecommendationEntry, RecommendationResponse, SessionOutcome};
