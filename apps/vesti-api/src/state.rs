use vesti_service::Recommender;

#[derive(Clone)]
pub struct AppState {
	pub recommender: Recommender,
}
impl AppState {
	pub fn new(config: &vesti_config::Config) -> color_eyre::Result<Self> {
		let recommender = Recommender::from_config(config)?;

		Ok(Self { recommender })
	}

	pub fn with_recommender(recommender: Recommender) -> Self {
		Self { recommender }
	}
}
