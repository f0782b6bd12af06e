use tracing_subscriber::EnvFilter;

/// Log filter override, e.g. `FIELDRISK_LOG=fieldrisk_recon=debug`.
pub const LOG_ENV: &str = "FIELDRISK_LOG";

/// Install the stderr subscriber. Library crates log through `log`; the
/// subscriber's log bridge picks those records up.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
