//! Pure-Rust engine behind a residency scheduling platform: the academic
//! calendar, the domain model, the constraint framework and library, the
//! solver adapters, the schedule generator, the compliance validator, the
//! batch mutation pipeline, the swap auto-matcher, and resilience
//! analytics. No I/O happens in this crate — everything it needs from the
//! outside world (storage, wall-clock time, metrics) comes in through
//! `ports`.

pub mod batch;
pub mod calendar;
pub mod config;
pub mod constraints;
pub mod context;
pub mod domain;
pub mod error;
pub mod generator;
pub mod ports;
pub mod redact;
pub mod resilience;
pub mod solver;
pub mod swap_matcher;
pub mod validator;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::SccConfig;
pub use error::{SccError, SccResult};
