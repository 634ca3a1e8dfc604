//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Check outcome counters
//!
//! Observability is read-only and has no effect on validation results.
//!
//! ```ignore
//! use idfrecord::observability::{Event, Logger};
//!
//! Logger::info(Event::SchemasLoaded.as_str(), &[("count", "42")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{CheckMetrics, CheckSnapshot};
