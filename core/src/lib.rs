//! Projection core for logged underwater-vehicle telemetry.
//!
//! Telemetry tables are read into [`TelemetryRecord`]s, projected onto a flat
//! local tangent plane, and handed to engine exports or scene renderers.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{LocalFrameRecord, ProjectionConfig, TelemetryRecord, TrackError, TrackResult};
pub use processing::{project, TrajectoryProjector, TrajectoryScene};
