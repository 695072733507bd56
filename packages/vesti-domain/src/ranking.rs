//! Last-mile ranking: converts raw retrieval candidates into the bounded list shown to callers.
//!
//! The pass is a pure function of its input. Steps run in a fixed order: source selection,
//! truncation, score offset, dedup with threshold, affordability boost, stable sort. The
//! truncation happens before filtering, so fewer than [`MAX_RECOMMENDATIONS`] entries can come
//! back even when retrieval had more to offer.

use std::{cmp::Ordering, collections::HashSet};

use crate::{
	MatchReason, RecommendationEntry, ScoredCandidate,
	catalog::fallback_items,
};

pub const MAX_RECOMMENDATIONS: usize = 5;
/// Fixed calibration offset between raw similarity and the displayed score.
pub const SCORE_OFFSET: f64 = 0.08;
/// Entries must score strictly above this to be shown.
pub const MIN_SCORE: f64 = 0.85;
pub const AFFORDABLE_PRICE: f64 = 100.0;
pub const AFFORDABLE_BOOST: f64 = 0.01;

const SCORE_DECIMALS: f64 = 10_000.0;

pub fn rank(candidates: Vec<ScoredCandidate>) -> Vec<RecommendationEntry> {
	let source: Vec<ScoredCandidate> = if candidates.is_empty() {
		fallback_items().into()
	} else {
		candidates
			.into_iter()
			.map(|candidate| ScoredCandidate { reason: MatchReason::RealMatch, ..candidate })
			.collect()
	};
	let mut seen = HashSet::new();
	let mut ranked = Vec::with_capacity(MAX_RECOMMENDATIONS);

	for candidate in source.into_iter().take(MAX_RECOMMENDATIONS) {
		let score = round_score(candidate.similarity + SCORE_OFFSET);

		// NaN fails this comparison and is dropped with the rest.
		if !(score > MIN_SCORE) || seen.contains(&candidate.item.sku) {
			continue;
		}

		seen.insert(candidate.item.sku.clone());
		ranked.push(RecommendationEntry {
			item: candidate.item,
			score,
			reason: candidate.reason,
		});
	}

	for entry in &mut ranked {
		if entry.item.price < AFFORDABLE_PRICE {
			entry.score = round_score(entry.score + AFFORDABLE_BOOST);
		}
	}

	// `sort_by` is stable, so equal scores keep retrieval order.
	ranked.sort_by(|a, b| cmp_score_desc(a.score, b.score));

	ranked
}

fn round_score(value: f64) -> f64 {
	(value * SCORE_DECIMALS).round() / SCORE_DECIMALS
}

fn cmp_score_desc(a: f64, b: f64) -> Ordering {
	b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
