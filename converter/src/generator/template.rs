use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use trackcore::interface::{format_timestamp, TABLE_COLUMNS};
use trackcore::prelude::TelemetryRecord;

/// Writes records in the nine-column layout the table reader expects.
pub fn write_telemetry_csv<W: Write>(writer: W, records: &[TelemetryRecord]) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(TABLE_COLUMNS)
        .context("writing telemetry header")?;
    for record in records {
        csv_writer
            .write_record([
                format_timestamp(&record.timestamp),
                record.salinity_psu.to_string(),
                record.sound_velocity_mps.to_string(),
                record.temperature_celsius.to_string(),
                record.altitude_meters.to_string(),
                record.depth_meters.to_string(),
                record.heading_degrees.to_string(),
                record.latitude_degrees.to_string(),
                record.longitude_degrees.to_string(),
            ])
            .context("writing telemetry row")?;
    }
    csv_writer.flush().context("flushing telemetry table")?;
    Ok(())
}

pub fn write_telemetry_csv_file<P: AsRef<Path>>(
    path: P,
    records: &[TelemetryRecord],
) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref)
        .with_context(|| format!("creating telemetry table {}", path_ref.display()))?;
    write_telemetry_csv(file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{generate_dive, DiveConfig};
    use trackcore::interface::CsvTelemetryReader;
    use trackcore::prelude::TelemetrySource;

    #[test]
    fn synthetic_table_reads_back_unchanged() {
        let records = generate_dive(&DiveConfig {
            samples: 8,
            interval_seconds: 0.5,
            ..Default::default()
        })
        .unwrap();
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.into_temp_path();
        write_telemetry_csv_file(&path, &records).unwrap();

        let parsed = CsvTelemetryReader::from_path(&path)
            .unwrap()
            .read_records()
            .unwrap();
        assert_eq!(parsed, records);
    }
}
