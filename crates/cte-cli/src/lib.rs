//! Library side of the `trials-explorer` binary: logging bootstrap,
//! persisted settings and the warning-letter exporter.

pub mod export;
pub mod logging;
pub mod settings;
