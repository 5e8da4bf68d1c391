use crate::interface::timestamp::format_timestamp;
use crate::math::stats::StatsHelper;
use crate::prelude::{AltitudeDirection, AxisConvention, LocalFrameRecord, TrackError, TrackResult};
use crate::processing::markers::{altitude_markers, VerticalMarker};
use serde::{Deserialize, Serialize};

const HORIZONTAL_PADDING_METERS: f64 = 5.0;
const DEPTH_PADDING_METERS: f64 = 10.0;

/// Rendering choices that do not affect the projected coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    pub title: String,
    pub axis_convention: AxisConvention,
    pub altitude_direction: AltitudeDirection,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            title: "Vehicle path with time progression and altitude".into(),
            axis_convention: AxisConvention::default(),
            altitude_direction: AltitudeDirection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub position: [f64; 3],
    pub elapsed_seconds: f64,
    /// Elapsed time normalised over the run, used for colouring.
    pub time_fraction: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub title: String,
    pub min: f64,
    pub max: f64,
    /// Draw max at the near end, so positive-down depth reads downward.
    pub reversed: bool,
}

/// Renderer-ready trajectory: path, altitude markers and axis layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryScene {
    pub title: String,
    pub axis_convention: AxisConvention,
    pub path: Vec<ScenePoint>,
    pub markers: Vec<VerticalMarker>,
    pub axes: [AxisRange; 3],
    pub duration_seconds: f64,
}

impl TrajectoryScene {
    /// `records` must already be projected with `options.axis_convention`.
    pub fn build(records: &[LocalFrameRecord], options: &SceneOptions) -> TrackResult<Self> {
        if records.is_empty() {
            return Err(TrackError::EmptyInput);
        }

        let convention = options.axis_convention;
        let duration_seconds = records
            .iter()
            .map(|record| record.elapsed_seconds)
            .fold(0.0, f64::max);

        let path = records
            .iter()
            .map(|record| ScenePoint {
                position: record.position(),
                elapsed_seconds: record.elapsed_seconds,
                time_fraction: if duration_seconds > 0.0 {
                    (record.elapsed_seconds / duration_seconds).clamp(0.0, 1.0)
                } else {
                    0.0
                },
                label: format!("Timestamp: {}", format_timestamp(&record.timestamp)),
            })
            .collect::<Vec<_>>();

        let markers = altitude_markers(records, convention, options.altitude_direction);
        let axes = axis_ranges(records, convention);

        Ok(Self {
            title: options.title.clone(),
            axis_convention: convention,
            path,
            markers,
            axes,
            duration_seconds,
        })
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

fn axis_ranges(records: &[LocalFrameRecord], convention: AxisConvention) -> [AxisRange; 3] {
    let (depth_axis, depth_sign) = convention.depth_axis();
    let titles = convention.axis_titles();

    let build = |axis: usize| {
        let (min, max) = StatsHelper::extent(records.iter().map(|record| record.position()[axis]))
            .unwrap_or((0.0, 0.0));
        let padding = if axis == depth_axis {
            DEPTH_PADDING_METERS
        } else {
            HORIZONTAL_PADDING_METERS
        };
        AxisRange {
            title: titles[axis].to_string(),
            min: min - padding,
            max: max + padding,
            reversed: axis == depth_axis && depth_sign > 0.0,
        }
    };

    [build(0), build(1), build(2)]
}
