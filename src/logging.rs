use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialise logging. `debug` raises the level to `debug` and lets `RUST_LOG`
/// override it; otherwise the level is forced to `info`.
/// When `log_file` is given, output goes to that file instead of stdout.
/// Calling this again after a subscriber is installed does nothing.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Without debug logging a stray `RUST_LOG` in the environment must not
    // turn on verbose output.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| "gesture_engine.log".into());
            let appender = tracing_appender::rolling::never(dir, file_name);
            builder.with_ansi(false).with_writer(appender).try_init()
        }
        None => builder.try_init(),
    };
}
