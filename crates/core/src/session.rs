//! [`Session`]: start-up sequence and lifetime owner of one connection.

use std::sync::Arc;

use foxrdp_runtime::{Connection, Error, FrameReader, FrameWriter, Result, dial};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::actor::{Actor, ActorContext};
use crate::config::SessionConfig;
use crate::root::{RootActor, TabList};

/// A live connection to a debugger server.
///
/// Holds the root actor and the background dispatch loop. Dropping the
/// session requests shutdown; [`close`](Self::close) additionally waits for
/// the loop to finish.
pub struct Session {
	connection: Arc<Connection<Actor>>,
	root: Arc<RootActor>,
	dispatch: Mutex<Dispatch>,
}

/// The dispatch task handle stays here until its outcome has been delivered,
/// so a cancelled [`Session::wait`] leaves it for the next caller.
enum Dispatch {
	Running(JoinHandle<Result<()>>),
	Finished,
}

impl Session {
	/// Connects to the server at `config.host:config.port` and starts dispatching.
	pub async fn connect(config: &SessionConfig) -> Result<Self> {
		let (reader, writer) = dial(&config.host, config.port, config.transport()).await?;
		Ok(Self::start(reader, writer))
	}

	/// Starts a session over an already established framed stream.
	///
	/// Must be called from within a tokio runtime.
	pub fn start<R, W>(reader: FrameReader<R>, writer: FrameWriter<W>) -> Self
	where
		R: AsyncRead + Unpin + Send + 'static,
		W: AsyncWrite + Unpin + Send + 'static,
	{
		let connection = Arc::new(Connection::new());
		let ctx = ActorContext::new(connection.registry().clone(), connection.outbox().clone());
		let root = RootActor::install(ctx);

		let conn = Arc::clone(&connection);
		let dispatch = tokio::spawn(async move { conn.run(reader, writer).await });

		Self {
			connection,
			root,
			dispatch: Mutex::new(Dispatch::Running(dispatch)),
		}
	}

	/// Issues the initial tab listing.
	pub fn begin(&self) -> Result<()> {
		self.root.begin()
	}

	pub fn root(&self) -> &Arc<RootActor> {
		&self.root
	}

	/// Snapshot of the current tab list.
	pub fn tabs(&self) -> TabList {
		self.root.tabs()
	}

	/// Waits for the dispatch loop to end.
	///
	/// Returns the fatal connection error, if the loop stopped because of one.
	/// The outcome goes to the first call that sees the loop finish; later
	/// calls return `Ok(())`. Dropping a pending call loses nothing.
	pub async fn wait(&self) -> Result<()> {
		let mut dispatch = self.dispatch.lock().await;
		let Dispatch::Running(handle) = &mut *dispatch else {
			return Ok(());
		};
		let joined = handle.await;
		*dispatch = Dispatch::Finished;
		joined.map_err(|e| Error::Connection(std::io::Error::other(e)))?
	}

	/// Stops the dispatch loop, waits for it, and releases every actor.
	pub async fn close(self) -> Result<()> {
		self.connection.shutdown();
		let result = self.wait().await;
		self.connection.registry().clear();
		result
	}
}

impl Drop for Session {
	fn drop(&mut self) {
		self.connection.shutdown();
		self.connection.registry().clear();
	}
}
