pub mod geodesy;
pub mod stats;

pub use geodesy::TangentPlane;
pub use stats::StatsHelper;
