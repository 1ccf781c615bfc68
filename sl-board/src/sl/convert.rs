//! Conversion from SL DTOs to domain departures.

use crate::domain::{RawDeparture, TransportMode};

use super::error::SlError;
use super::types::{DepartureDto, DepartureResponse, Deviations};

/// Convert a response into departures in feed order.
///
/// Feed order is metros, buses, trains, trams, then ships, each in the order
/// SL listed them. A non-zero `StatusCode` becomes [`SlError::Api`].
pub fn convert_response(response: DepartureResponse) -> Result<Vec<RawDeparture>, SlError> {
    if response.status_code != 0 {
        return Err(SlError::Api {
            code: response.status_code,
            message: response.message.unwrap_or_default(),
        });
    }

    let data = response.response_data.ok_or_else(|| SlError::Decode {
        message: "missing ResponseData in successful response".to_string(),
        body: None,
    })?;

    let by_mode = [
        (TransportMode::Metro, data.metros),
        (TransportMode::Bus, data.buses),
        (TransportMode::Train, data.trains),
        (TransportMode::Tram, data.trams),
        (TransportMode::Ship, data.ships),
    ];

    let departures = by_mode
        .into_iter()
        .flat_map(|(mode, list)| {
            list.unwrap_or_default()
                .into_iter()
                .map(move |dto| convert_departure(mode, dto))
        })
        .collect();

    Ok(departures)
}

/// Convert a single departure, defaulting absent fields.
pub fn convert_departure(mode: TransportMode, dto: DepartureDto) -> RawDeparture {
    RawDeparture {
        mode,
        line_number: dto.line_number.unwrap_or_default(),
        destination: dto.destination.unwrap_or_default(),
        direction: dto
            .journey_direction
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or(0),
        display_time: dto.display_time.unwrap_or_default(),
        deviations: dto.deviations.map(flatten_deviations).unwrap_or_default(),
    }
}

/// Join deviation texts into one line.
fn flatten_deviations(deviations: Deviations) -> String {
    match deviations {
        Deviations::Text(text) => text,
        Deviations::List(list) => list
            .into_iter()
            .filter_map(|d| d.text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sl::types::{DeviationDto, ResponseData};

    fn dto(line: &str, display_time: &str) -> DepartureDto {
        DepartureDto {
            line_number: Some(line.to_string()),
            destination: Some("Ropsten".to_string()),
            journey_direction: Some(2),
            display_time: Some(display_time.to_string()),
            ..Default::default()
        }
    }

    fn ok_response(data: ResponseData) -> DepartureResponse {
        DepartureResponse {
            status_code: 0,
            message: None,
            execution_time: None,
            response_data: Some(data),
        }
    }

    #[test]
    fn concatenates_modes_in_feed_order() {
        let data = ResponseData {
            ships: Some(vec![dto("80", "12:00")]),
            buses: Some(vec![dto("2", "3 min"), dto("53", "Nu")]),
            metros: Some(vec![dto("13", "5 min")]),
            trams: None,
            ..Default::default()
        };

        let departures = convert_response(ok_response(data)).unwrap();
        let summary: Vec<_> = departures
            .iter()
            .map(|d| (d.mode, d.line_number.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                (TransportMode::Metro, "13"),
                (TransportMode::Bus, "2"),
                (TransportMode::Bus, "53"),
                (TransportMode::Ship, "80"),
            ]
        );
    }

    #[test]
    fn absent_fields_default() {
        let departure = convert_departure(TransportMode::Tram, DepartureDto::default());
        assert_eq!(departure.line_number, "");
        assert_eq!(departure.destination, "");
        assert_eq!(departure.direction, 0);
        assert_eq!(departure.display_time, "");
        assert_eq!(departure.deviations, "");
    }

    #[test]
    fn out_of_range_direction_defaults() {
        let mut negative = dto("14", "Nu");
        negative.journey_direction = Some(-1);
        let mut huge = dto("14", "Nu");
        huge.journey_direction = Some(300);

        assert_eq!(convert_departure(TransportMode::Metro, negative).direction, 0);
        assert_eq!(convert_departure(TransportMode::Metro, huge).direction, 0);
    }

    #[test]
    fn odd_direction_does_not_fail_the_response() {
        let response: DepartureResponse = serde_json::from_value(serde_json::json!({
            "StatusCode": 0,
            "ResponseData": {"Metros": [
                {"LineNumber": "14", "JourneyDirection": -1, "DisplayTime": "Nu"},
                {"LineNumber": "13", "JourneyDirection": 2, "DisplayTime": "3 min"}
            ]}
        }))
        .unwrap();

        let departures = convert_response(response).unwrap();
        assert_eq!(departures.len(), 2);
        assert_eq!(departures[0].direction, 0);
        assert_eq!(departures[1].direction, 2);
    }

    #[test]
    fn flattens_deviation_list() {
        let mut d = dto("14", "Nu");
        d.deviations = Some(Deviations::List(vec![
            DeviationDto {
                text: Some("Hissen ur funktion".into()),
                consequence: None,
                importance_level: Some(2),
            },
            DeviationDto {
                text: None,
                consequence: Some("INFORMATION".into()),
                importance_level: None,
            },
            DeviationDto {
                text: Some("Ersättningsbuss".into()),
                consequence: None,
                importance_level: Some(5),
            },
        ]));

        let departure = convert_departure(TransportMode::Metro, d);
        assert_eq!(departure.deviations, "Hissen ur funktion; Ersättningsbuss");
    }

    #[test]
    fn non_zero_status_is_api_error() {
        let response = DepartureResponse {
            status_code: 1006,
            message: Some("Too many requests per minute".into()),
            execution_time: None,
            response_data: None,
        };

        assert_eq!(
            convert_response(response).unwrap_err(),
            SlError::Api {
                code: 1006,
                message: "Too many requests per minute".into()
            }
        );
    }

    #[test]
    fn success_without_data_is_decode_error() {
        let response = DepartureResponse {
            status_code: 0,
            message: None,
            execution_time: None,
            response_data: None,
        };

        assert!(matches!(
            convert_response(response),
            Err(SlError::Decode { .. })
        ));
    }
}
