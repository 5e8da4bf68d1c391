use crate::interface::timestamp::format_timestamp;
use crate::prelude::{LocalFrameRecord, TrackResult, TrajectorySink};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Per-record object as consumed by the engine-side data loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRecord {
    pub timestamp: String,
    #[serde(rename = "Salinity_psu")]
    pub salinity_psu: f64,
    #[serde(rename = "SoundVelocity_meters_per_second")]
    pub sound_velocity_mps: f64,
    #[serde(rename = "Temperature_celsius")]
    pub temperature_celsius: f64,
    #[serde(rename = "VehicleAltitude_meters")]
    pub altitude_meters: f64,
    #[serde(rename = "VehicleDepth_meters")]
    pub depth_meters: f64,
    #[serde(rename = "VehicleHeading_degrees")]
    pub heading_degrees: f64,
    pub x_meters: f64,
    pub y_meters: f64,
    pub z_meters: f64,
    pub elapsed_seconds: f64,
}

impl From<&LocalFrameRecord> for EngineRecord {
    fn from(record: &LocalFrameRecord) -> Self {
        Self {
            timestamp: format_timestamp(&record.timestamp),
            salinity_psu: record.salinity_psu,
            sound_velocity_mps: record.sound_velocity_mps,
            temperature_celsius: record.temperature_celsius,
            altitude_meters: record.altitude_meters,
            depth_meters: record.depth_meters,
            heading_degrees: record.heading_degrees,
            x_meters: record.x_meters,
            y_meters: record.y_meters,
            z_meters: record.z_meters,
            elapsed_seconds: record.elapsed_seconds,
        }
    }
}

/// Top-level document; the engine loader expects the array under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDocument {
    pub data: Vec<EngineRecord>,
}

impl EngineDocument {
    pub fn from_records(records: &[LocalFrameRecord]) -> Self {
        Self {
            data: records.iter().map(EngineRecord::from).collect(),
        }
    }
}

pub struct JsonTrajectoryWriter<W: Write> {
    writer: W,
    pretty: bool,
    logger: LogManager,
}

impl JsonTrajectoryWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P, pretty: bool) -> TrackResult<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file), pretty))
    }
}

impl<W: Write> JsonTrajectoryWriter<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            pretty,
            logger: LogManager::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TrajectorySink for JsonTrajectoryWriter<W> {
    fn write_records(&mut self, records: &[LocalFrameRecord]) -> TrackResult<()> {
        let document = EngineDocument::from_records(records);
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &document)?;
        } else {
            serde_json::to_writer(&mut self.writer, &document)?;
        }
        self.writer.flush()?;
        self.logger
            .record(&format!("wrote {} engine records", document.data.len()));
        Ok(())
    }
}
