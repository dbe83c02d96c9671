use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use foxrdp::{Session, SessionConfig, TabActor, TabList, TabState};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::info;

use crate::cli::Commands;

const REPLY_TIMEOUT: Duration = Duration::from_secs(10);
const ATTACH_POLL: Duration = Duration::from_millis(50);

pub async fn dispatch(command: Commands, config: SessionConfig) -> Result<()> {
	info!(host = %config.host, port = config.port, "connecting");
	let session = Session::connect(&config)
		.await
		.with_context(|| format!("connecting to {}:{}", config.host, config.port))?;

	let outcome = match command {
		Commands::Watch => watch(&session).await,
		Commands::List => list(&session).await,
		Commands::Navigate { tab, url } => navigate(&session, &tab, &url).await,
	};
	// Awaits the loop even when the command ended on Ctrl-C or a timeout.
	// A connection error takes precedence over the command's own error.
	session.close().await.context("debugger connection failed")?;
	outcome
}

async fn watch(session: &Session) -> Result<()> {
	let (tx, mut rx) = mpsc::channel(8);
	session.root().tab_list_changed().register(&tx);
	session.begin()?;

	let ended = session.wait();
	tokio::pin!(ended);
	let mut shown = Vec::new();

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {
				info!("interrupted");
				return Ok(());
			}
			result = &mut ended => {
				return result.context("debugger connection lost");
			}
			Some(()) = rx.recv() => {
				let tabs = session.tabs();
				// Registration is idempotent, so new tabs are picked up on every pass.
				for tab in tabs.iter() {
					tab.state_changed().register(&tx);
					tab.favicon_changed().register(&tx);
				}
				let lines = render(&tabs);
				if lines != shown {
					print_lines(&lines);
					shown = lines;
				}
			}
		}
	}
}

async fn list(session: &Session) -> Result<()> {
	let tabs = first_listing(session).await?;
	print_lines(&render(&tabs));
	Ok(())
}

async fn navigate(session: &Session, tab_id: &str, url: &str) -> Result<()> {
	first_listing(session).await?;
	let tab = session
		.root()
		.tab(tab_id)
		.with_context(|| format!("no tab with id {tab_id}"))?;
	wait_attached(&tab).await?;

	let (tx, mut rx) = mpsc::channel(1);
	tab.state_changed().register(&tx);
	let sent = tab.navigate_to(url);
	let started = match sent {
		Ok(()) => timeout(REPLY_TIMEOUT, rx.recv()).await.ok(),
		Err(err) => {
			tab.state_changed().unregister(&tx);
			return Err(err.into());
		}
	};
	tab.state_changed().unregister(&tx);

	started.ok_or_else(|| anyhow!("navigation to {url} did not start within {REPLY_TIMEOUT:?}"))?;
	println!("{}: navigating to {url}", tab.id());
	Ok(())
}

/// Starts tracking and waits for the root to install its first tab list.
async fn first_listing(session: &Session) -> Result<TabList> {
	let (tx, mut rx) = mpsc::channel(1);
	let relay = session.root().tab_list_changed();
	relay.register(&tx);
	let begun = session.begin();
	let listed = match begun {
		Ok(()) => timeout(REPLY_TIMEOUT, rx.recv()).await.ok(),
		Err(err) => {
			relay.unregister(&tx);
			return Err(err.into());
		}
	};
	relay.unregister(&tx);

	listed.ok_or_else(|| anyhow!("no tab list within {REPLY_TIMEOUT:?}"))?;
	Ok(session.tabs())
}

async fn wait_attached(tab: &TabActor) -> Result<()> {
	let attached = timeout(REPLY_TIMEOUT, async {
		while tab.frame_id().is_none() {
			tokio::time::sleep(ATTACH_POLL).await;
		}
	})
	.await;
	attached.map_err(|_| anyhow!("tab {} never attached to a frame", tab.id()))
}

fn render(tabs: &[Arc<TabActor>]) -> Vec<String> {
	if tabs.is_empty() {
		return vec!["(no tabs)".to_string()];
	}
	tabs.iter()
		.map(|tab| describe(tab.id(), &tab.state(), tab.favicon().as_deref()))
		.collect()
}

fn describe(id: &str, state: &TabState, favicon: Option<&[u8]>) -> String {
	let marker = if state.selected { '*' } else { ' ' };
	let status = if state.navigating { "loading" } else { "ready" };
	let icon = match favicon {
		None => "no icon".to_string(),
		Some(bytes) => format!("icon {}B", bytes.len()),
	};
	format!("{marker} {id} [{status}] {} <{}> ({icon})", state.title, state.url)
}

fn print_lines(lines: &[String]) {
	println!("---");
	for line in lines {
		println!("{line}");
	}
}
