use log::LevelFilter;

/// Install the process-wide logger
///
/// `RUST_LOG` directives are honoured, `level` applies to everything else.
/// Returns false when a logger was already installed.
pub fn init(level: LevelFilter) -> bool {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// Logger for tests: captured by the harness, never fails on re-init
pub fn init_for_tests() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .is_test(true)
        .try_init();
}
