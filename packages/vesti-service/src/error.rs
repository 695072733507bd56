pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<vesti_providers::Error> for Error {
	fn from(err: vesti_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<vesti_storage::Error> for Error {
	fn from(err: vesti_storage::Error) -> Self {
		match err {
			vesti_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
