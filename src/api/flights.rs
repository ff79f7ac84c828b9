//! Flight search and lookup.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::info;

use super::client::ApiClient;
use super::fallback::{ApiReply, DemoFallback};
use crate::error::ApiError;
use crate::models::{Flight, FlightSearchRequest};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchBody {
    flights: Vec<Flight>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlightBody {
    flight: Option<Flight>,
    message: Option<String>,
}

pub struct FlightsApi {
    client: Arc<ApiClient>,
    fallback: Arc<DemoFallback>,
}

impl FlightsApi {
    pub fn new(client: Arc<ApiClient>, fallback: Arc<DemoFallback>) -> Self {
        Self { client, fallback }
    }

    /// `POST /flights/search`.
    pub async fn search_flights(
        &self,
        request: &FlightSearchRequest,
    ) -> Result<ApiReply<Vec<Flight>>, ApiError> {
        let call = async {
            let body: SearchBody = self
                .client
                .post_json("/flights/search", request, None)
                .await?;
            Ok(ApiReply::live(body.flights, body.message))
        };
        let reply = self
            .fallback
            .guard("search_flights", call, || {
                ApiReply::demo(
                    vec![demo_flight("flight_1", &request.departure, &request.arrival)],
                    "Flights retrieved (demo mode)",
                )
            })
            .await?;
        info!(
            departure = %request.departure,
            arrival = %request.arrival,
            results = reply.data.len(),
            demo = reply.demo,
            "Flight search complete"
        );
        Ok(reply)
    }

    /// `GET /flights/{id}`. The payload is `None` when the server omits it.
    pub async fn get_flight(&self, id: &str) -> Result<ApiReply<Option<Flight>>, ApiError> {
        let path = format!("/flights/{id}");
        let call = async {
            let body: FlightBody = self.client.get_json(&path, None).await?;
            Ok(ApiReply::live(body.flight, body.message))
        };
        self.fallback
            .guard("get_flight", call, || {
                ApiReply::demo(
                    Some(demo_flight(id, "New York (JFK)", "Los Angeles (LAX)")),
                    "Flight details retrieved (demo mode)",
                )
            })
            .await
    }
}

/// 2024-01-15 at `hour:minute`, the fixed date of every demo itinerary.
pub(crate) fn demo_time(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

fn demo_flight(id: &str, departure: &str, arrival: &str) -> Flight {
    Flight {
        id: id.to_string(),
        airline: "Demo Airlines".to_string(),
        flight_number: "DEMO123".to_string(),
        departure: departure.to_string(),
        arrival: arrival.to_string(),
        departure_time: demo_time(8, 0),
        arrival_time: demo_time(10, 30),
        price: dec!(299),
        duration: "2h 30m".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Url;
    use rust_decimal::Decimal;

    use super::*;

    fn offline() -> FlightsApi {
        let client = ApiClient::with_http(
            reqwest::Client::new(),
            Some(Url::parse("http://127.0.0.1:9").unwrap()),
        );
        FlightsApi::new(Arc::new(client), Arc::new(DemoFallback::new("@test.com")))
    }

    #[tokio::test]
    async fn offline_search_echoes_requested_airports() {
        let request = FlightSearchRequest {
            departure: "LHR".into(),
            arrival: "DXB".into(),
            departure_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            return_date: None,
            passengers: 1,
        };
        let reply = offline().search_flights(&request).await.unwrap();
        assert!(reply.demo);
        assert_eq!(reply.data.len(), 1);
        let flight = &reply.data[0];
        assert_eq!(flight.departure, "LHR");
        assert_eq!(flight.arrival, "DXB");
        assert_eq!(flight.flight_number, "DEMO123");
        assert_eq!(flight.price, Decimal::from(299));
    }

    #[tokio::test]
    async fn offline_lookup_keeps_requested_id() {
        let reply = offline().get_flight("abc").await.unwrap();
        let flight = reply.data.unwrap();
        assert_eq!(flight.id, "abc");
        assert_eq!(flight.departure, "New York (JFK)");
        assert_eq!(flight.arrival_time.to_string(), "2024-01-15 10:30:00");
    }

    #[tokio::test]
    async fn unconfigured_search_is_not_masked() {
        let api = FlightsApi::new(
            Arc::new(ApiClient::with_http(reqwest::Client::new(), None)),
            Arc::new(DemoFallback::new("@test.com")),
        );
        let err = api.get_flight("abc").await.unwrap_err();
        assert!(matches!(err, ApiError::NotConfigured));
    }
}
