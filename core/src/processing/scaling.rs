use crate::math::stats::StatsHelper;
use crate::prelude::{AxisConvention, LocalFrameRecord};
use serde::{Deserialize, Serialize};

/// Default edge length the horizontal footprint is fitted into.
pub const DEFAULT_TARGET_SIZE: f64 = 2.0;

/// Uniform scale that fits the horizontal footprint into `target_size`.
///
/// Axes with no extent are ignored; a track with no horizontal extent at all
/// keeps a scale of `1.0`.
pub fn fit_scale_factor(
    records: &[LocalFrameRecord],
    convention: AxisConvention,
    target_size: f64,
) -> f64 {
    let (first_axis, second_axis) = convention.horizontal_axes();
    [first_axis, second_axis]
        .into_iter()
        .filter_map(|axis| {
            let (min, max) =
                StatsHelper::extent(records.iter().map(|record| record.position()[axis]))?;
            let extent = max - min;
            (extent > 0.0).then(|| target_size / extent)
        })
        .reduce(f64::min)
        .unwrap_or(1.0)
}

/// Uniform scale applied when a track is placed into a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub scale: f64,
}

impl Placement {
    pub fn fitted(records: &[LocalFrameRecord], convention: AxisConvention, target_size: f64) -> Self {
        Self {
            scale: fit_scale_factor(records, convention, target_size),
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(x: f64, y: f64, z: f64) -> LocalFrameRecord {
        LocalFrameRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            elapsed_seconds: 0.0,
            x_meters: x,
            y_meters: y,
            z_meters: z,
            salinity_psu: 0.0,
            sound_velocity_mps: 0.0,
            temperature_celsius: 0.0,
            altitude_meters: 0.0,
            depth_meters: -y,
            heading_degrees: 0.0,
        }
    }

    #[test]
    fn longest_horizontal_extent_sets_the_scale() {
        let records = [at(0.0, -5.0, 0.0), at(100.0, -80.0, 40.0)];
        let scale = fit_scale_factor(&records, AxisConvention::EngineYUp, 2.0);
        assert!((scale - 0.02).abs() < 1e-12);
    }

    #[test]
    fn degenerate_footprint_keeps_unit_scale() {
        let records = [at(3.0, -5.0, 3.0), at(3.0, -9.0, 3.0)];
        assert_eq!(
            fit_scale_factor(&records, AxisConvention::EngineYUp, 2.0),
            1.0
        );
        assert_eq!(fit_scale_factor(&[], AxisConvention::EngineYUp, 2.0), 1.0);
    }

    #[test]
    fn placement_carries_only_the_fit_scale() {
        let records = [at(0.0, -5.0, 0.0), at(100.0, -80.0, 40.0)];
        let placement = Placement::fitted(&records, AxisConvention::EngineYUp, 2.0);
        let value = serde_json::to_value(placement).unwrap();
        assert_eq!(value.as_object().map(|fields| fields.len()), Some(1));
        assert!((value["scale"].as_f64().unwrap() - 0.02).abs() < 1e-12);
        assert_eq!(Placement::default().scale, 1.0);
    }
}
