use crate::math::geodesy::TangentPlane;
use crate::math::stats::StatsHelper;
use crate::prelude::{
    LocalFrameRecord, ProjectionConfig, ReferenceMode, TelemetryRecord, TrackError, TrackResult,
};
use crate::telemetry::log::LogManager;
use chrono::NaiveDateTime;

/// Projects geodetic telemetry onto a flat local frame anchored at a reference point.
pub struct TrajectoryProjector {
    config: ProjectionConfig,
    logger: LogManager,
}

impl TrajectoryProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    /// Maps every record into the local frame, preserving length and order.
    ///
    /// Fails with [`TrackError::EmptyInput`] for an empty batch and with
    /// [`TrackError::InvalidRecord`] as soon as any record carries a
    /// non-finite value; no partial output is produced.
    pub fn project(&self, records: &[TelemetryRecord]) -> TrackResult<Vec<LocalFrameRecord>> {
        let first = records.first().ok_or(TrackError::EmptyInput)?;
        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
        }

        let plane = self.tangent_plane(records, first)?;
        self.logger.detail(&format!(
            "reference ({:.7}, {:.7}) via {} / cosine {}",
            plane.ref_latitude,
            plane.ref_longitude,
            self.config.reference_mode,
            self.config.cosine_latitude
        ));

        let origin_time = first.timestamp;
        let mut projected = records
            .iter()
            .map(|record| self.project_record(&plane, origin_time, record))
            .collect::<Vec<_>>();

        if self.config.anchor_to_origin {
            anchor_to_first(&mut projected);
        }

        self.logger.record(&format!(
            "projected {} records into {} frame",
            projected.len(),
            self.config.axis_convention
        ));
        Ok(projected)
    }

    fn tangent_plane(
        &self,
        records: &[TelemetryRecord],
        first: &TelemetryRecord,
    ) -> TrackResult<TangentPlane> {
        let (ref_latitude, ref_longitude) = match self.config.reference_mode {
            ReferenceMode::FirstPoint => (first.latitude_degrees, first.longitude_degrees),
            ReferenceMode::MeanPosition => {
                let latitudes = records
                    .iter()
                    .map(|record| record.latitude_degrees)
                    .collect::<Vec<_>>();
                let longitudes = records
                    .iter()
                    .map(|record| record.longitude_degrees)
                    .collect::<Vec<_>>();
                let latitude = StatsHelper::mean(&latitudes).ok_or(TrackError::EmptyInput)?;
                let longitude = StatsHelper::mean(&longitudes).ok_or(TrackError::EmptyInput)?;
                (latitude, longitude)
            }
        };
        Ok(TangentPlane::new(
            ref_latitude,
            ref_longitude,
            self.config.cosine_latitude,
        ))
    }

    fn project_record(
        &self,
        plane: &TangentPlane,
        origin_time: NaiveDateTime,
        record: &TelemetryRecord,
    ) -> LocalFrameRecord {
        let north = plane.north_offset(record.latitude_degrees);
        let east = plane.east_offset(record.latitude_degrees, record.longitude_degrees);
        let [x_meters, y_meters, z_meters] =
            self.config
                .axis_convention
                .map(north, east, record.depth_meters);

        LocalFrameRecord {
            timestamp: record.timestamp,
            elapsed_seconds: elapsed_seconds(origin_time, record.timestamp),
            x_meters,
            y_meters,
            z_meters,
            salinity_psu: record.salinity_psu,
            sound_velocity_mps: record.sound_velocity_mps,
            temperature_celsius: record.temperature_celsius,
            altitude_meters: record.altitude_meters,
            depth_meters: record.depth_meters,
            heading_degrees: record.heading_degrees,
        }
    }
}

impl Default for TrajectoryProjector {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}

/// Convenience wrapper around [`TrajectoryProjector::project`].
pub fn project(
    records: &[TelemetryRecord],
    config: ProjectionConfig,
) -> TrackResult<Vec<LocalFrameRecord>> {
    TrajectoryProjector::new(config).project(records)
}

/// Seconds from `origin` to `timestamp`, negative when out of order.
pub fn elapsed_seconds(origin: NaiveDateTime, timestamp: NaiveDateTime) -> f64 {
    let delta = timestamp - origin;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

fn anchor_to_first(records: &mut [LocalFrameRecord]) {
    let Some([x0, y0, z0]) = records.first().map(LocalFrameRecord::position) else {
        return;
    };
    for record in records.iter_mut() {
        record.x_meters -= x0;
        record.y_meters -= y0;
        record.z_meters -= z0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geodesy::{METERS_PER_DEGREE_LAT, METERS_PER_DEGREE_LON};
    use crate::prelude::{AxisConvention, CosineLatitude};
    use chrono::NaiveDate;

    fn at(seconds: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + chrono::Duration::seconds(seconds as i64)
    }

    fn record(lat: f64, lon: f64, depth: f64, altitude: f64, seconds: u32) -> TelemetryRecord {
        TelemetryRecord {
            timestamp: at(seconds),
            salinity_psu: 34.5,
            sound_velocity_mps: 1500.2,
            temperature_celsius: 11.0,
            altitude_meters: altitude,
            depth_meters: depth,
            heading_degrees: 90.0,
            latitude_degrees: lat,
            longitude_degrees: lon,
        }
    }

    fn plot_config() -> ProjectionConfig {
        ProjectionConfig {
            axis_convention: AxisConvention::NorthEastDown,
            ..Default::default()
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = project(&[], ProjectionConfig::default()).unwrap_err();
        assert!(matches!(err, TrackError::EmptyInput));
    }

    #[test]
    fn non_finite_field_rejects_whole_batch() {
        let mut bad = record(10.0, 20.0, 5.0, 2.0, 10);
        bad.depth_meters = f64::NAN;
        let err = project(
            &[record(10.0, 20.0, 5.0, 2.0, 0), bad],
            ProjectionConfig::default(),
        )
        .unwrap_err();
        match err {
            TrackError::InvalidRecord { index, field, .. } => {
                assert_eq!(index, 1);
                assert_eq!(field, "depth_meters");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn example_dive_projects_to_expected_offsets() {
        let records = [
            record(10.0, 20.0, 5.0, 2.0, 0),
            record(10.001, 20.001, 6.0, 2.0, 10),
        ];
        let output = project(&records, plot_config()).unwrap();

        assert_eq!(output[0].position(), [0.0, 0.0, 0.0]);
        assert_eq!(output[0].elapsed_seconds, 0.0);

        let north = output[1].x_meters;
        let east = output[1].y_meters;
        assert!((north - 111.13292).abs() < 1e-6, "north {north}");
        assert!((east - 109.6281).abs() < 1e-3, "east {east}");
        assert!((output[1].z_meters - 1.0).abs() < 1e-12);
        assert_eq!(output[1].elapsed_seconds, 10.0);
    }

    #[test]
    fn engine_frame_negates_depth_and_swaps_axes() {
        let records = [
            record(10.0, 20.0, 5.0, 2.0, 0),
            record(10.001, 20.001, 6.0, 2.0, 10),
        ];
        let config = ProjectionConfig {
            anchor_to_origin: false,
            ..Default::default()
        };
        let output = project(&records, config).unwrap();
        assert_eq!(output[0].position(), [0.0, -5.0, 0.0]);
        assert!((output[1].z_meters - 111.13292).abs() < 1e-6);
        assert_eq!(output[1].y_meters, -6.0);
    }

    #[test]
    fn anchoring_moves_first_record_to_origin() {
        let records = [
            record(-33.9, 151.2, 42.0, 3.0, 0),
            record(-33.8, 151.3, 40.0, 4.0, 5),
        ];
        let config = ProjectionConfig {
            reference_mode: ReferenceMode::MeanPosition,
            ..Default::default()
        };
        let output = project(&records, config).unwrap();
        assert_eq!(output[0].position(), [0.0, 0.0, 0.0]);
        assert_eq!(output[1].y_meters, 2.0);
    }

    #[test]
    fn mean_position_centres_the_track() {
        let records = [
            record(0.0, -1.0, 0.0, 0.0, 0),
            record(0.0, 1.0, 0.0, 0.0, 1),
        ];
        let config = ProjectionConfig {
            reference_mode: ReferenceMode::MeanPosition,
            anchor_to_origin: false,
            ..plot_config()
        };
        let output = project(&records, config).unwrap();
        assert!((output[0].y_meters + METERS_PER_DEGREE_LON).abs() < 1e-6);
        assert!((output[1].y_meters - METERS_PER_DEGREE_LON).abs() < 1e-6);
    }

    #[test]
    fn one_degree_steps_match_scale_constants() {
        let records = [
            record(0.0, 0.0, 0.0, 0.0, 0),
            record(1.0, 0.0, 0.0, 0.0, 1),
            record(0.0, 1.0, 0.0, 0.0, 2),
        ];
        let config = ProjectionConfig {
            cosine_latitude: CosineLatitude::PerRecord,
            ..plot_config()
        };
        let output = project(&records, config).unwrap();
        assert!((output[1].x_meters - METERS_PER_DEGREE_LAT).abs() < 1e-6);
        assert!((output[2].y_meters - METERS_PER_DEGREE_LON).abs() < 1e-6);
    }

    #[test]
    fn projection_is_deterministic_and_order_preserving() {
        let records = (0..25)
            .map(|i| {
                let step = i as f64 * 1e-4;
                record(48.1 + step, -4.3 - step, 10.0 + i as f64, 3.0, i * 2)
            })
            .collect::<Vec<_>>();
        let first = project(&records, ProjectionConfig::default()).unwrap();
        let second = project(&records, ProjectionConfig::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), records.len());
        for (input, output) in records.iter().zip(&first) {
            assert_eq!(input.timestamp, output.timestamp);
            assert_eq!(input.depth_meters, output.depth_meters);
        }
        assert!(first
            .windows(2)
            .all(|pair| pair[0].elapsed_seconds <= pair[1].elapsed_seconds));
    }

    #[test]
    fn elapsed_seconds_keeps_fractions() {
        let origin = at(0);
        let later = origin + chrono::Duration::milliseconds(1_250);
        assert_eq!(elapsed_seconds(origin, later), 1.25);
        assert_eq!(elapsed_seconds(later, origin), -1.25);
    }
}
