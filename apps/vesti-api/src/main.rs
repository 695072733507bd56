use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = vesti_api::Args::parse();

	vesti_api::run(args).await
}
