use crate::prelude::{AltitudeDirection, AxisConvention, LocalFrameRecord};
use serde::{Deserialize, Serialize};

/// Segment from a track point to the point offset by the vehicle altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalMarker {
    pub start: [f64; 3],
    pub end: [f64; 3],
}

/// One marker per record, displaced along whichever axis carries depth.
pub fn altitude_markers(
    records: &[LocalFrameRecord],
    convention: AxisConvention,
    direction: AltitudeDirection,
) -> Vec<VerticalMarker> {
    let (axis, axis_sign) = convention.depth_axis();
    records
        .iter()
        .map(|record| {
            let start = record.position();
            let mut end = start;
            end[axis] += axis_sign * direction.depth_sign() * record.altitude_meters;
            VerticalMarker { start, end }
        })
        .collect()
}
