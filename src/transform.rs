use crate::geocoder::Location;
use crate::nike_client::{ActivityRecord, Waypoint};
use std::num::ParseFloatError;

pub const KM_TO_MILES: f64 = 0.621371;

/// Merge GPS endpoints and location metadata into a record and rewrite the
/// summary distance from kilometers to miles, keeping the upstream
/// numeric-as-string encoding.
pub fn enrich_record(
    mut record: ActivityRecord,
    gps_start: Waypoint,
    gps_end: Waypoint,
    location: Location,
) -> Result<ActivityRecord, ParseFloatError> {
    let kilometers: f64 = record.metric_summary.distance.parse()?;
    record.metric_summary.distance = (kilometers * KM_TO_MILES).to_string();

    record.gps_start = Some(gps_start);
    record.gps_end = Some(gps_end);
    record.postal = Some(location.postal);
    record.city = Some(location.city);
    record.state = Some(location.state);

    Ok(record)
}
