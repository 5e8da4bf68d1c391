pub mod markers;
pub mod projector;
pub mod scaling;
pub mod scene;

pub use markers::{altitude_markers, VerticalMarker};
pub use projector::{project, TrajectoryProjector};
pub use scaling::{fit_scale_factor, Placement};
pub use scene::{SceneOptions, TrajectoryScene};
