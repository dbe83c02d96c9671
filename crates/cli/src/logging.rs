use tracing_subscriber::EnvFilter;

/// Filter directives for a verbosity level.
///
/// Raw frame payloads are logged by the transport at debug level, so asking
/// for them also opens up `foxrdp_runtime::transport` even without `-v`.
fn directives(verbosity: u8, log_messages: bool) -> String {
	let mut directives = match verbosity {
		0 => "warn,foxrdp_cli=info".to_string(),
		1 => "warn,foxrdp_cli=debug,foxrdp=debug,foxrdp_runtime=info".to_string(),
		_ => "debug,foxrdp_cli=trace,foxrdp=trace,foxrdp_runtime=trace".to_string(),
	};
	if log_messages && verbosity < 2 {
		directives.push_str(",foxrdp_runtime::transport=debug");
	}
	directives
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the flags when set.
pub fn init_logging(verbosity: u8, log_messages: bool) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(directives(verbosity, log_messages)));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbosity > 0)
		.compact()
		.init();
}
