//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to a file; used while the terminal UI owns the screen.
    File(PathBuf),
    Off,
}

/// Install the global subscriber. `RUST_LOG` overrides `default_directive`.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(target: LogTarget, default_directive: &str) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        LogTarget::Off => builder.with_writer(io::sink).try_init(),
    };

    Ok(())
}
