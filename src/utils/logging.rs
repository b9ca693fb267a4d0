//! Logger bootstrap.
//!
//! `RUST_LOG` wins when set; otherwise the level from the settings file is
//! applied. Only the first call installs a logger, so call it once the
//! settings file has been read.

use log::LevelFilter;

pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

pub fn builder(default_level: &str, rust_log: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(parse_level(default_level));
    if let Some(spec) = rust_log {
        builder.parse_filters(spec);
    }
    builder
}

pub fn init(default_level: &str) {
    let rust_log = std::env::var("RUST_LOG").ok();
    if builder(default_level, rust_log.as_deref()).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn settings_level_applies_without_rust_log() {
        assert_eq!(builder("debug", None).build().filter(), LevelFilter::Debug);
        assert_eq!(builder("error", None).build().filter(), LevelFilter::Error);
    }

    #[test]
    fn rust_log_overrides_settings_level() {
        assert_eq!(
            builder("debug", Some("warn")).build().filter(),
            LevelFilter::Warn
        );
    }

    #[test]
    fn init_is_idempotent() {
        init("info");
        init("debug");
    }
}
