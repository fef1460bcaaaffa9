/// Initialize the client logger.
///
/// Results go to stdout; log lines are diagnostics on stderr, filtered
/// by `RUST_LOG`.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}
