pub const EMBEDDING_DIM: usize = 256;

const SYNTHETIC_BASE: f64 = 0.08;
const SYNTHETIC_STEP: f64 = 0.000_08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingRejection {
	WrongLength { expected: usize, actual: usize },
	NonFinite { index: usize },
}

/// A query embedding of exactly [`EMBEDDING_DIM`] finite components.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f32>);
impl EmbeddingVector {
	pub fn new(values: Vec<f32>) -> Result<Self, EmbeddingRejection> {
		if values.len() != EMBEDDING_DIM {
			return Err(EmbeddingRejection::WrongLength {
				expected: EMBEDDING_DIM,
				actual: values.len(),
			});
		}
		if let Some(index) = values.iter().position(|value| !value.is_finite()) {
			return Err(EmbeddingRejection::NonFinite { index });
		}

		Ok(Self(values))
	}

	/// The fixed stand-in used whenever real inference is unavailable.
	///
	/// Component `i` is `0.08 + i * 0.00008`. It has no dependency on time, randomness, or the
	/// input image, so fallback responses are reproducible.
	pub fn synthetic() -> Self {
		let values = (0..EMBEDDING_DIM)
			.map(|i| (SYNTHETIC_BASE + i as f64 * SYNTHETIC_STEP) as f32)
			.collect();

		Self(values)
	}

	pub fn as_slice(&self) -> &[f32] {
		&self.0
	}

	pub fn into_inner(self) -> Vec<f32> {
		self.0
	}
}

/// Cosine similarity that tolerates unnormalized input.
///
/// Returns `0.0` for mismatched lengths or when either side has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
	if a.len() != b.len() {
		return 0.0;
	}

	let mut dot = 0.0_f64;
	let mut norm_a = 0.0_f64;
	let mut norm_b = 0.0_f64;

	for (x, y) in a.iter().zip(b) {
		let (x, y) = (f64::from(*x), f64::from(*y));

		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	let norm = norm_a.sqrt() * norm_b.sqrt();

	if norm == 0.0 || !norm.is_finite() { 0.0 } else { dot / norm }
}
