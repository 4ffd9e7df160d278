//! Observability subsystem.
//!
//! All subsystems emit structured events through the `tracing` macros;
//! `logging.rs` installs the subscriber that renders them.

pub mod logging;

pub use logging::init_logging;
