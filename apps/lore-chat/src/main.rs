use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = lore_chat::Args::parse();

	lore_chat::run(args).await
}
