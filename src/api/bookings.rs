//! Booking endpoints. All of them carry the session's bearer token.

use std::sync::Arc;

use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::info;

use super::client::ApiClient;
use super::fallback::{ApiReply, DemoFallback, demo_suffix};
use super::flights::demo_time;
use crate::error::ApiError;
use crate::models::{Booking, BookingRequest, FlightSummary, Passenger};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BookingBody {
    booking: Option<Booking>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BookingsBody {
    bookings: Vec<Booking>,
    message: Option<String>,
}

pub struct BookingsApi {
    client: Arc<ApiClient>,
    fallback: Arc<DemoFallback>,
}

impl BookingsApi {
    pub fn new(client: Arc<ApiClient>, fallback: Arc<DemoFallback>) -> Self {
        Self { client, fallback }
    }

    /// `POST /bookings`.
    pub async fn create_booking(
        &self,
        request: &BookingRequest,
        token: Option<&str>,
    ) -> Result<ApiReply<Option<Booking>>, ApiError> {
        let call = async {
            let body: BookingBody = self.client.post_json("/bookings", request, token).await?;
            Ok(ApiReply::live(body.booking, body.message))
        };
        let reply = self
            .fallback
            .guard("create_booking", call, || {
                let booking = Booking {
                    id: format!("booking_{}", demo_suffix().to_uppercase()),
                    flight_id: Some(request.flight_id.clone()),
                    flight: None,
                    passengers: request.passengers.clone(),
                    total_price: dec!(299),
                    status: "confirmed".to_string(),
                };
                ApiReply::demo(Some(booking), "Booking created successfully (demo mode)")
            })
            .await?;
        if let Some(booking) = &reply.data {
            info!(booking_id = %booking.id, flight_id = %request.flight_id, demo = reply.demo, "Booking created");
        }
        Ok(reply)
    }

    /// `GET /bookings/user`.
    pub async fn user_bookings(
        &self,
        token: Option<&str>,
    ) -> Result<ApiReply<Vec<Booking>>, ApiError> {
        let call = async {
            let body: BookingsBody = self.client.get_json("/bookings/user", token).await?;
            Ok(ApiReply::live(body.bookings, body.message))
        };
        self.fallback
            .guard("user_bookings", call, || {
                ApiReply::demo(Vec::new(), "Bookings retrieved (demo mode)")
            })
            .await
    }

    /// `GET /bookings/{id}`.
    pub async fn get_booking(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<ApiReply<Option<Booking>>, ApiError> {
        let path = format!("/bookings/{id}");
        let call = async {
            let body: BookingBody = self.client.get_json(&path, token).await?;
            Ok(ApiReply::live(body.booking, body.message))
        };
        self.fallback
            .guard("get_booking", call, || {
                ApiReply::demo(Some(demo_booking(id)), "Booking details retrieved (demo mode)")
            })
            .await
    }
}

fn demo_booking(id: &str) -> Booking {
    Booking {
        id: id.to_string(),
        flight_id: None,
        flight: Some(FlightSummary {
            airline: "Demo Airlines".to_string(),
            flight_number: "DEMO123".to_string(),
            departure: "New York (JFK)".to_string(),
            arrival: "Los Angeles (LAX)".to_string(),
            departure_time: demo_time(8, 0),
            arrival_time: demo_time(10, 30),
        }),
        passengers: vec![Passenger {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            gender: "male".to_string(),
            passport_number: None,
        }],
        total_price: dec!(299),
        status: "confirmed".to_string(),
    }
}
