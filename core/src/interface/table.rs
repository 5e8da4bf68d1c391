use crate::interface::timestamp::parse_timestamp;
use crate::prelude::{TelemetryRecord, TelemetrySource, TrackError, TrackResult};
use crate::telemetry::log::LogManager;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Positional column names of the vehicle log, whatever its header says.
pub const TABLE_COLUMNS: [&str; 9] = [
    "timestamp",
    "Salinity_psu",
    "SoundVelocity_meters_per_second",
    "Temperature_celsius",
    "VehicleAltitude_meters",
    "VehicleDepth_meters",
    "VehicleHeading_degrees",
    "VehicleLatitude_degrees",
    "VehicleLongitude_degrees",
];

/// Reads the nine-column vehicle log.
///
/// The first line is always treated as a header. A second header row that
/// some exporters duplicate is recognised by its `timestamp` cell and dropped.
pub struct CsvTelemetryReader<R> {
    inner: csv::Reader<R>,
    logger: LogManager,
}

impl CsvTelemetryReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> TrackResult<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CsvTelemetryReader<R> {
    pub fn from_reader(reader: R) -> Self {
        let inner = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        Self {
            inner,
            logger: LogManager::new(),
        }
    }
}

impl<R: Read> TelemetrySource for CsvTelemetryReader<R> {
    fn read_records(&mut self) -> TrackResult<Vec<TelemetryRecord>> {
        let mut records = Vec::new();
        for (row, result) in self.inner.records().enumerate() {
            let raw = result?;
            if row == 0 && raw.get(0) == Some(TABLE_COLUMNS[0]) {
                self.logger.detail("dropping duplicated header row");
                continue;
            }
            records.push(parse_row(records.len(), &raw)?);
        }
        self.logger
            .record(&format!("read {} telemetry rows", records.len()));
        Ok(records)
    }
}

fn parse_row(index: usize, raw: &StringRecord) -> TrackResult<TelemetryRecord> {
    if raw.len() != TABLE_COLUMNS.len() {
        return Err(TrackError::InvalidRecord {
            index,
            field: "row",
            reason: format!(
                "has {} columns, expected {}",
                raw.len(),
                TABLE_COLUMNS.len()
            ),
        });
    }

    let timestamp_text = &raw[0];
    let timestamp = parse_timestamp(timestamp_text).ok_or_else(|| TrackError::InvalidRecord {
        index,
        field: TABLE_COLUMNS[0],
        reason: format!("is not a timestamp: {timestamp_text:?}"),
    })?;
    let number = |column: usize| parse_number(index, column, &raw[column]);

    Ok(TelemetryRecord {
        timestamp,
        salinity_psu: number(1)?,
        sound_velocity_mps: number(2)?,
        temperature_celsius: number(3)?,
        altitude_meters: number(4)?,
        depth_meters: number(5)?,
        heading_degrees: number(6)?,
        latitude_degrees: number(7)?,
        longitude_degrees: number(8)?,
    })
}

fn parse_number(index: usize, column: usize, text: &str) -> TrackResult<f64> {
    let field = TABLE_COLUMNS[column];
    let value = text.parse::<f64>().map_err(|_| TrackError::InvalidRecord {
        index,
        field,
        reason: format!("is not a number: {text:?}"),
    })?;
    if !value.is_finite() {
        return Err(TrackError::InvalidRecord {
            index,
            field,
            reason: format!("is not finite: {text:?}"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "time,sal,sv,temp,alt,depth,hdg,lat,lon\n";

    fn read(text: &str) -> TrackResult<Vec<TelemetryRecord>> {
        CsvTelemetryReader::from_reader(text.as_bytes()).read_records()
    }

    #[test]
    fn reads_rows_positionally() {
        let text = format!(
            "{HEADER}2024-05-01 12:00:00,34.9,1502.3,10.4,2.5,5.0,181.0,10.0,20.0\n\
             2024-05-01 12:00:10, 34.8 ,1502.1,10.3,2.4,6.0,182.0,10.001,20.001\n"
        );
        let records = read(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].salinity_psu, 34.9);
        assert_eq!(records[0].heading_degrees, 181.0);
        assert_eq!(records[1].salinity_psu, 34.8);
        assert_eq!(records[1].latitude_degrees, 10.001);
        assert_eq!(records[1].longitude_degrees, 20.001);
    }

    #[test]
    fn drops_duplicated_header_row() {
        let text = format!(
            "{HEADER}timestamp,Salinity_psu,SoundVelocity,Temperature,Altitude,Depth,Heading,Latitude,Longitude\n\
             2024-05-01 12:00:00,34.9,1502.3,10.4,2.5,5.0,181.0,10.0,20.0\n"
        );
        let records = read(&text).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn row_index_skips_the_duplicated_header() {
        let text = format!(
            "{HEADER}timestamp,Salinity_psu,SoundVelocity,Temperature,Altitude,Depth,Heading,Latitude,Longitude\n\
             2024-05-01 12:00:00,34.9,1502.3,10.4,2.5,shallow,181.0,10.0,20.0\n"
        );
        match read(&text).unwrap_err() {
            TrackError::InvalidRecord { index, field, .. } => {
                assert_eq!(index, 0);
                assert_eq!(field, "VehicleDepth_meters");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn header_only_table_reads_empty() {
        assert!(read(HEADER).unwrap().is_empty());
    }

    #[test]
    fn malformed_number_names_row_and_column() {
        let text = format!(
            "{HEADER}2024-05-01 12:00:00,34.9,1502.3,10.4,2.5,5.0,181.0,10.0,20.0\n\
             2024-05-01 12:00:10,34.8,1502.1,10.3,2.4,deep,182.0,10.001,20.001\n"
        );
        match read(&text).unwrap_err() {
            TrackError::InvalidRecord { index, field, .. } => {
                assert_eq!(index, 1);
                assert_eq!(field, "VehicleDepth_meters");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_and_non_finite_values_are_invalid() {
        let missing = format!("{HEADER}2024-05-01 12:00:00,34.9,1502.3,10.4,,5.0,181.0,10.0,20.0\n");
        assert!(matches!(
            read(&missing),
            Err(TrackError::InvalidRecord { field: "VehicleAltitude_meters", .. })
        ));
        let nan = format!("{HEADER}2024-05-01 12:00:00,NaN,1502.3,10.4,2.0,5.0,181.0,10.0,20.0\n");
        assert!(matches!(
            read(&nan),
            Err(TrackError::InvalidRecord { field: "Salinity_psu", .. })
        ));
        let short = format!("{HEADER}2024-05-01 12:00:00,34.9,1502.3\n");
        assert!(matches!(
            read(&short),
            Err(TrackError::InvalidRecord { field: "row", .. })
        ));
        let bad_time = format!("{HEADER}yesterday,34.9,1502.3,10.4,2.0,5.0,181.0,10.0,20.0\n");
        assert!(matches!(
            read(&bad_time),
            Err(TrackError::InvalidRecord { field: "timestamp", .. })
        ));
    }

    #[test]
    fn reads_from_path() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(HEADER.as_bytes()).unwrap();
        temp.write_all(b"2024-05-01T12:00:00Z,35,1500,9,3,12,0,48.5,-4.5\n")
            .unwrap();
        let path = temp.into_temp_path();
        let records = CsvTelemetryReader::from_path(&path)
            .unwrap()
            .read_records()
            .unwrap();
        assert_eq!(records[0].depth_meters, 12.0);
    }
}
