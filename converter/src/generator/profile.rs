use anyhow::{ensure, Context};
use chrono::{Duration, NaiveDateTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use trackcore::math::geodesy::{METERS_PER_DEGREE_LAT, METERS_PER_DEGREE_LON};
use trackcore::prelude::TelemetryRecord;

/// Largest dive accepted from the CLI or the bridge.
pub const MAX_DIVE_SAMPLES: usize = 100_000;

/// Largest jitter amplitude the generator draws from.
const MAX_NOISE: f64 = 1.0e6;

/// Configuration for generating a synthetic survey dive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiveConfig {
    pub samples: usize,
    pub start_time: NaiveDateTime,
    pub interval_seconds: f64,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub heading_degrees: f64,
    /// Heading change applied after every sample; non-zero values curve the track.
    pub turn_rate_degrees: f64,
    pub speed_mps: f64,
    pub cruise_depth: f64,
    pub seafloor_depth: f64,
    pub descent_samples: usize,
    pub salinity_psu: f64,
    pub temperature_celsius: f64,
    pub noise: f64,
    pub seed: u64,
    pub description: Option<String>,
}

impl Default for DiveConfig {
    fn default() -> Self {
        Self {
            samples: 120,
            start_time: NaiveDateTime::default(),
            interval_seconds: 1.0,
            start_latitude: 36.802,
            start_longitude: -121.788,
            heading_degrees: 90.0,
            turn_rate_degrees: 0.0,
            speed_mps: 1.5,
            cruise_depth: 25.0,
            seafloor_depth: 40.0,
            descent_samples: 20,
            salinity_psu: 34.5,
            temperature_celsius: 10.0,
            noise: 0.05,
            seed: 0,
            description: None,
        }
    }
}

/// Simplified Mackenzie-style sound speed in seawater.
fn sound_velocity(temperature: f64, salinity: f64, depth: f64) -> f64 {
    1449.2 + 4.6 * temperature - 0.055 * temperature * temperature
        + 1.34 * (salinity - 35.0)
        + 0.016 * depth
}

/// Builds a deterministic dead-reckoned dive: descent ramp, then a cruise leg.
pub fn generate_dive(config: &DiveConfig) -> anyhow::Result<Vec<TelemetryRecord>> {
    ensure!(config.samples > 0, "dive needs at least one sample");
    ensure!(
        config.samples <= MAX_DIVE_SAMPLES,
        "dive of {} samples exceeds the limit of {}",
        config.samples,
        MAX_DIVE_SAMPLES
    );
    ensure!(
        (0.0..=MAX_NOISE).contains(&config.noise),
        "noise amplitude must be between 0 and {}",
        MAX_NOISE
    );
    ensure!(
        config.interval_seconds.is_finite() && config.interval_seconds >= 0.0,
        "sample interval must be a non-negative number of seconds"
    );

    let interval_ms = (config.interval_seconds * 1000.0).round() as i64;
    let step = Duration::try_milliseconds(interval_ms)
        .context("sample interval out of range for timestamps")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut jitter = |scale: f64| {
        if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise) * scale
        } else {
            0.0
        }
    };

    let mut records = Vec::with_capacity(config.samples);
    let mut timestamp = config.start_time;
    let mut latitude = config.start_latitude;
    let mut longitude = config.start_longitude;
    let mut heading = config.heading_degrees;
    let leg = config.speed_mps * config.interval_seconds;

    for index in 0..config.samples {
        let ramp = if config.descent_samples == 0 {
            1.0
        } else {
            (index as f64 / config.descent_samples as f64).min(1.0)
        };
        let depth = (config.cruise_depth * ramp + jitter(1.0)).max(0.0);
        let altitude = (config.seafloor_depth - depth + jitter(1.0)).max(0.0);
        let temperature = config.temperature_celsius - 0.02 * depth + jitter(0.1);
        let salinity = config.salinity_psu + jitter(0.1);

        records.push(TelemetryRecord {
            timestamp,
            salinity_psu: salinity,
            sound_velocity_mps: sound_velocity(temperature, salinity, depth),
            temperature_celsius: temperature,
            altitude_meters: altitude,
            depth_meters: depth,
            heading_degrees: heading.rem_euclid(360.0),
            latitude_degrees: latitude,
            longitude_degrees: longitude,
        });

        let north = leg * heading.to_radians().cos();
        let east = leg * heading.to_radians().sin();
        latitude += north / METERS_PER_DEGREE_LAT;
        longitude += east / (METERS_PER_DEGREE_LON * latitude.to_radians().cos());
        heading += config.turn_rate_degrees;
        timestamp = timestamp
            .checked_add_signed(step)
            .context("dive timestamps overflowed")?;
    }

    Ok(records)
}
