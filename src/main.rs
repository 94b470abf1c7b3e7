use fix_imports::cli::{Args, Command};
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let args = Args::parse_args();
    init_logging(args.default_log_level());

    let command = Command::from_args(args);
    process::exit(command.run());
}

/// Log to stderr so reports on stdout stay machine-readable
///
/// `RUST_LOG` wins over the level implied by `--verbose`/`--quiet`.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
