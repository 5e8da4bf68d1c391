use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One logged telemetry sample as read from the vehicle table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp: NaiveDateTime,
    pub salinity_psu: f64,
    pub sound_velocity_mps: f64,
    pub temperature_celsius: f64,
    pub altitude_meters: f64,
    pub depth_meters: f64,
    pub heading_degrees: f64,
    pub latitude_degrees: f64,
    pub longitude_degrees: f64,
}

impl TelemetryRecord {
    /// Numeric fields paired with their column names, in table order.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 8] {
        [
            ("salinity_psu", self.salinity_psu),
            ("sound_velocity_mps", self.sound_velocity_mps),
            ("temperature_celsius", self.temperature_celsius),
            ("altitude_meters", self.altitude_meters),
            ("depth_meters", self.depth_meters),
            ("heading_degrees", self.heading_degrees),
            ("latitude_degrees", self.latitude_degrees),
            ("longitude_degrees", self.longitude_degrees),
        ]
    }

    /// Rejects records carrying NaN or infinite values.
    pub fn validate(&self, index: usize) -> TrackResult<()> {
        for (field, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(TrackError::InvalidRecord {
                    index,
                    field,
                    reason: format!("is not a finite number ({value})"),
                });
            }
        }
        Ok(())
    }
}

/// A telemetry sample re-expressed in the local Cartesian frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFrameRecord {
    pub timestamp: NaiveDateTime,
    pub elapsed_seconds: f64,
    pub x_meters: f64,
    pub y_meters: f64,
    pub z_meters: f64,
    pub salinity_psu: f64,
    pub sound_velocity_mps: f64,
    pub temperature_celsius: f64,
    pub altitude_meters: f64,
    pub depth_meters: f64,
    pub heading_degrees: f64,
}

impl LocalFrameRecord {
    pub fn position(&self) -> [f64; 3] {
        [self.x_meters, self.y_meters, self.z_meters]
    }
}

/// How the origin of the local frame is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceMode {
    /// First record's latitude and longitude.
    #[default]
    FirstPoint,
    /// Arithmetic mean of all latitudes and longitudes.
    MeanPosition,
}

/// Which latitude feeds the longitude cosine correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CosineLatitude {
    /// Each record's own latitude.
    PerRecord,
    /// The reference latitude, shared by every record.
    #[default]
    Reference,
}

/// Output axis layout for the projected positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisConvention {
    /// Game-engine layout: x = east, y = up (negated depth), z = north.
    #[default]
    EngineYUp,
    /// Plotting layout: x = north, y = east, z = depth (positive down).
    NorthEastDown,
}

impl AxisConvention {
    /// Maps local offsets and depth into `[x, y, z]`.
    pub fn map(self, north: f64, east: f64, depth: f64) -> [f64; 3] {
        match self {
            AxisConvention::EngineYUp => [east, -depth, north],
            AxisConvention::NorthEastDown => [north, east, depth],
        }
    }

    /// Index of the axis carrying depth and the sign applied to it.
    pub fn depth_axis(self) -> (usize, f64) {
        match self {
            AxisConvention::EngineYUp => (1, -1.0),
            AxisConvention::NorthEastDown => (2, 1.0),
        }
    }

    /// Indices of the two horizontal axes.
    pub fn horizontal_axes(self) -> (usize, usize) {
        match self {
            AxisConvention::EngineYUp => (0, 2),
            AxisConvention::NorthEastDown => (0, 1),
        }
    }

    pub fn axis_titles(self) -> [&'static str; 3] {
        match self {
            AxisConvention::EngineYUp => [
                "East (meters from reference)",
                "Up (meters)",
                "North (meters from reference)",
            ],
            AxisConvention::NorthEastDown => [
                "Latitude (meters from reference)",
                "Longitude (meters from reference)",
                "Depth (meters)",
            ],
        }
    }
}

/// Side of the depth point the altitude marker extends toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AltitudeDirection {
    /// depth + altitude: toward the seafloor.
    #[default]
    Below,
    /// depth - altitude: toward the surface.
    Above,
}

impl AltitudeDirection {
    /// Sign applied to altitude in positive-down depth units.
    pub fn depth_sign(self) -> f64 {
        match self {
            AltitudeDirection::Below => 1.0,
            AltitudeDirection::Above => -1.0,
        }
    }
}

macro_rules! kebab_option {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(format!(
                        "unknown {} `{}` (expected one of: {})",
                        stringify!($ty),
                        other,
                        [$($name),+].join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($ty::$variant => $name,)+
                };
                f.write_str(name)
            }
        }
    };
}

kebab_option!(ReferenceMode {
    FirstPoint => "first-point",
    MeanPosition => "mean-position",
});
kebab_option!(CosineLatitude {
    PerRecord => "per-record",
    Reference => "reference",
});
kebab_option!(AxisConvention {
    EngineYUp => "engine-y-up",
    NorthEastDown => "north-east-down",
});
kebab_option!(AltitudeDirection {
    Below => "below",
    Above => "above",
});

/// Settings shared by every projection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub reference_mode: ReferenceMode,
    pub cosine_latitude: CosineLatitude,
    pub axis_convention: AxisConvention,
    pub anchor_to_origin: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            reference_mode: ReferenceMode::FirstPoint,
            cosine_latitude: CosineLatitude::Reference,
            axis_convention: AxisConvention::EngineYUp,
            anchor_to_origin: true,
        }
    }
}

/// Common error type for ingest, projection and export.
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error("empty input: at least one telemetry record is required")]
    EmptyInput,
    #[error("invalid record {index}: field `{field}` {reason}")]
    InvalidRecord {
        index: usize,
        field: &'static str,
        reason: String,
    },
    #[error("csv failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TrackResult<T> = Result<T, TrackError>;

/// Produces telemetry batches, e.g. from a logged table.
pub trait TelemetrySource {
    fn read_records(&mut self) -> TrackResult<Vec<TelemetryRecord>>;
}

/// Consumes projected trajectories, e.g. by serializing them for an engine.
pub trait TrajectorySink {
    fn write_records(&mut self, records: &[LocalFrameRecord]) -> TrackResult<()>;
}
