use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`MAPSHELF_LOG=mapshelf_library=debug`).
pub const LOG_ENV: &str = "MAPSHELF_LOG";

/// Log to stderr, leaving stdout for command output.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}
