pub mod engine_json;
pub mod table;
pub mod timestamp;

pub use engine_json::{EngineDocument, EngineRecord, JsonTrajectoryWriter};
pub use table::{CsvTelemetryReader, TABLE_COLUMNS};
pub use timestamp::{format_timestamp, parse_timestamp};
