
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Track Firefox tabs through a running debugger server.
///
/// Start Firefox with `-start-debugger-server <port>` first; this tool only
/// connects to it.
#[derive(Parser, Debug)]
#[command(name = "foxrdp")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v debug for actors, -vv trace everything)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// JSON config file with host, port, logMessages, maxFrameLen
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Debugger server host [default: 127.0.0.1]
	#[arg(long, global = true)]
	pub host: Option<String>,

	/// Debugger server port [default: 49022]
	#[arg(short, long, global = true)]
	pub port: Option<u16>,

	/// Log raw protocol frames (visible with -v)
	#[arg(long, global = true)]
	pub log_messages: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Print the tab list, then keep printing it whenever anything changes.
	Watch,
	/// Print the tab list once and exit.
	List,
	/// Navigate a tab to a URL and wait for the load to start.
	Navigate {
		/// Tab actor id as shown by `list`
		#[arg(long)]
		tab: String,
		url: String,
	},
}
