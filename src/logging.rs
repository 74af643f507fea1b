//! Logger setup for the command-line tool.

use log::LevelFilter;

/// Level for this crate from the number of `-v` flags.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize `env_logger`. `RUST_LOG`, when set, wins over `-v`.
pub fn init(verbosity: u8) {
    let filter = format!(
        "{}={}",
        env!("CARGO_CRATE_NAME"),
        level_for(verbosity).as_str().to_ascii_lowercase()
    );
    if std::env::var("RUST_LOG").is_err() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&filter))
            .format_timestamp(None)
            .init();
    } else {
        env_logger::init();
    }
}
