//! Flight and airport models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bookable flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub departure: String,
    pub arrival: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub price: Decimal,
    pub duration: String,
}

/// Flight details embedded in a booking. The booking endpoints omit the id
/// and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSummary {
    pub airline: String,
    pub flight_number: String,
    pub departure: String,
    pub arrival: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

impl From<&Flight> for FlightSummary {
    fn from(flight: &Flight) -> Self {
        Self {
            airline: flight.airline.clone(),
            flight_number: flight.flight_number.clone(),
            departure: flight.departure.clone(),
            arrival: flight.arrival.clone(),
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
        }
    }
}

/// Body of `POST /flights/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchRequest {
    pub departure: String,
    pub arrival: String,
    pub departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub passengers: u8,
}

/// An airport in the search catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Airport {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub country: &'static str,
}

impl std::fmt::Display for Airport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.city, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_parses_backend_shape() {
        let flight: Flight = serde_json::from_value(serde_json::json!({
            "id": "flight_1",
            "airline": "Demo Airlines",
            "flightNumber": "DEMO123",
            "departure": "JFK",
            "arrival": "LAX",
            "departureTime": "2024-01-15T08:00:00",
            "arrivalTime": "2024-01-15T10:30:00",
            "price": 299,
            "duration": "2h 30m"
        }))
        .unwrap();
        assert_eq!(flight.price, Decimal::from(299));
        assert_eq!(flight.departure_time.to_string(), "2024-01-15 08:00:00");
    }

    #[test]
    fn search_request_omits_missing_return_date() {
        let req = FlightSearchRequest {
            departure: "JFK".into(),
            arrival: "LHR".into(),
            departure_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            return_date: None,
            passengers: 2,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["departureDate"], "2025-03-01");
        assert!(json.get("returnDate").is_none());
    }

    #[test]
    fn airport_display() {
        let jfk = Airport {
            code: "JFK",
            name: "John F. Kennedy International",
            city: "New York",
            country: "USA",
        };
        assert_eq!(jfk.to_string(), "New York (JFK)");
    }
}
