//! Structured logging. Builds a `sloggers` terminal logger and returns it so
//! callers can attach a `component` field and pass it down into handlers.

use sloggers::{Config, LoggerConfig};

pub use slog::{debug, error, info, o, warn, Logger};

/// Builds a terminal logger at debug level.
pub fn init(component: &'static str) -> Logger {
    let config: LoggerConfig = serdeconv::from_toml_str(
        r#"
type = "terminal"
level = "debug"
destination = "stderr"
"#,
    )
    .expect("static logging config is always valid toml");

    let logger = config.build_logger().expect("failed to build logger");
    logger.new(o!("component" => component))
}
