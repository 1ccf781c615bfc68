//! SL real-time departures (v4) response DTOs.
//!
//! These types map directly to the `realtimedeparturesV4.json` payload.
//! SL sends `null` for many fields, so nearly everything is an `Option`.

use serde::{Deserialize, Serialize};

/// Top-level response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DepartureResponse {
    /// Application status; 0 means success.
    pub status_code: i32,

    /// Error description when `status_code` is non-zero.
    pub message: Option<String>,

    /// Server-side processing time in milliseconds.
    pub execution_time: Option<i64>,

    /// Departures grouped by transport mode. Absent on failure.
    pub response_data: Option<ResponseData>,
}

/// Departures grouped by transport mode.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseData {
    /// When SL last refreshed this data.
    pub latest_update: Option<String>,

    /// Age of the data in seconds.
    pub data_age: Option<i64>,

    pub metros: Option<Vec<DepartureDto>>,
    pub buses: Option<Vec<DepartureDto>>,
    pub trains: Option<Vec<DepartureDto>>,
    pub trams: Option<Vec<DepartureDto>>,
    pub ships: Option<Vec<DepartureDto>>,
}

/// A single departure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DepartureDto {
    /// Public line designation, e.g. "14" or "55K".
    pub line_number: Option<String>,

    /// Terminus shown on the vehicle.
    pub destination: Option<String>,

    /// Direction of travel along the line (1 or 2). Kept wide so an odd
    /// value does not fail the whole response.
    pub journey_direction: Option<i64>,

    /// "Nu", "N min" or "HH:MM".
    pub display_time: Option<String>,

    /// Disruption notices for this departure.
    pub deviations: Option<Deviations>,

    /// Name of the stop area the departure leaves from.
    pub stop_area_name: Option<String>,
}

/// Deviation notices: a plain string in older payloads, a list in v4.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Deviations {
    Text(String),
    List(Vec<DeviationDto>),
}

/// A single deviation notice.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviationDto {
    pub text: Option<String>,
    pub consequence: Option<String>,
    pub importance_level: Option<i32>,
}
