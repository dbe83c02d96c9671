mod cli;
mod commands;
mod config;
mod logging;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	let config = match config::resolve(&cli) {
		Ok(config) => config,
		Err(err) => {
			eprintln!("error: {err:#}");
			std::process::exit(2);
		}
	};
	logging::init_logging(cli.verbose, config.log_messages);

	if let Err(err) = commands::dispatch(cli.command, config).await {
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}
