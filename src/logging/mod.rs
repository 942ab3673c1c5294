use tracing_subscriber::filter::{Directive, LevelFilter};

/// Install the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays scriptable.
/// `RUST_LOG` is honored on top of a default `mylobster_setup=info`.
pub fn init() {
    let default_directive: Directive = "mylobster_setup=info"
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_directive),
        )
        .with_writer(std::io::stderr)
        .init();
}
