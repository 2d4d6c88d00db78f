//! Ports the core requires from its host: persistence, a clock, and a
//! metrics sink. Modelled as `async_trait` traits with `mockall::automock`
//! so the generator, validator, batch pipeline, and swap matcher can all be
//! unit-tested without a real database.

mod clock;
mod entity_store;
mod metrics;
mod swap_repository;

pub use clock::{Clock, SystemClock};
pub use entity_store::{AssignmentPatch, EntityStore, PeriodSnapshot, TxToken};
pub use metrics::{MetricEvent, MetricsSink, NoopMetricsSink, TracingMetricsSink};
pub use swap_repository::SwapRepository;

#[cfg(any(test, feature = "testing"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "testing"))]
pub use entity_store::MockEntityStore;
#[cfg(any(test, feature = "testing"))]
pub use metrics::MockMetricsSink;
#[cfg(any(test, feature = "testing"))]
pub use swap_repository::MockSwapRepository;
