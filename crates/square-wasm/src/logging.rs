//! Browser console logging
//!
//! Routes `tracing` events from the navigator to the developer console.

use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;
use tracing_web::MakeWebConsoleWriter;

static INIT: Once = Once::new();

/// Parse a level name, defaulting to `info`
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|l| l.parse().ok())
        .unwrap_or(LevelFilter::INFO)
}

/// Install the console subscriber; later calls are ignored
pub fn init_logging(level: LevelFilter) {
    INIT.call_once(|| {
        let console = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .without_time()
            .with_writer(MakeWebConsoleWriter::new())
            .with_filter(level);

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("a global subscriber was already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("debug")), LevelFilter::DEBUG);
        assert_eq!(parse_level(Some("WARN")), LevelFilter::WARN);
        assert_eq!(parse_level(Some("chatty")), LevelFilter::INFO);
        assert_eq!(parse_level(None), LevelFilter::INFO);
    }
}
