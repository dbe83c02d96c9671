//! Tab tracking client for the Firefox remote debugging protocol.
//!
//! A [`Session`] connects to a running debugger server, installs the
//! [`RootActor`] under the fixed id `"root"`, and runs the dispatch loop on a
//! background task. After [`Session::begin`], the root keeps an ordered list
//! of [`TabActor`]s in sync with the browser, and each tab mirrors its title,
//! URL, selection, navigation state, and favicon.
//!
//! Observers learn about changes through [`Relay`]s: `tab_list_changed` on
//! the root, `state_changed` and `favicon_changed` on each tab. A pulse only
//! means "re-read current state"; pulses may be coalesced.
//!
//! # Example
//!
//! ```ignore
//! let session = Session::connect(&SessionConfig::default()).await?;
//! let root = session.root().clone();
//! let _sub = root.tab_list_changed().subscribe(move || {
//!     for tab in root.tabs().iter() {
//!         println!("{} {}", tab.title(), tab.url());
//!     }
//! });
//! session.begin()?;
//! session.wait().await?;
//! ```

mod actor;
mod config;
mod root;
mod session;
mod tab;

pub use actor::{Actor, ActorContext};
pub use config::SessionConfig;
pub use root::{RootActor, TabList};
pub use session::Session;
pub use tab::{TabActor, TabState};

pub use foxrdp_protocol as protocol;
pub use foxrdp_runtime::{Error, Relay, RelaySubscription, Result};
