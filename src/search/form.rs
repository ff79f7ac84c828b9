//! The flight search form on the home page.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::FlightSearchRequest;

pub const MIN_TRAVELERS: u8 = 1;
pub const MAX_TRAVELERS: u8 = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    #[default]
    RoundTrip,
    OneWay,
    MultiCity,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundTrip => "round-trip",
            Self::OneWay => "one-way",
            Self::MultiCity => "multi-city",
        }
    }
}

impl std::fmt::Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "round-trip" => Ok(Self::RoundTrip),
            "one-way" => Ok(Self::OneWay),
            "multi-city" => Ok(Self::MultiCity),
            other => Err(ValidationError::UnknownOption {
                field: "trip type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::PremiumEconomy => "premium-economy",
            Self::Business => "business",
            Self::First => "first",
        }
    }
}

impl std::fmt::Display for CabinClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CabinClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "economy" => Ok(Self::Economy),
            "premium-economy" => Ok(Self::PremiumEconomy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            other => Err(ValidationError::UnknownOption {
                field: "cabin class",
                value: other.to_string(),
            }),
        }
    }
}

/// One leg of a multi-city itinerary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightLeg {
    pub id: String,
    pub from: String,
    pub to: String,
    pub depart_date: Option<NaiveDate>,
}

impl FlightLeg {
    fn is_complete(&self) -> bool {
        !self.from.trim().is_empty() && !self.to.trim().is_empty() && self.depart_date.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightSearchForm {
    pub from: String,
    pub to: String,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub trip_type: TripType,
    pub cabin_class: CabinClass,
    travelers: u8,
    legs: Vec<FlightLeg>,
    next_leg_id: u32,
}

impl Default for FlightSearchForm {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            departure_date: None,
            return_date: None,
            trip_type: TripType::default(),
            cabin_class: CabinClass::default(),
            travelers: MIN_TRAVELERS,
            legs: vec![FlightLeg {
                id: "1".to_string(),
                ..Default::default()
            }],
            next_leg_id: 2,
        }
    }
}

impl FlightSearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn travelers(&self) -> u8 {
        self.travelers
    }

    pub fn set_travelers(&mut self, count: u8) -> Result<(), ValidationError> {
        if !(MIN_TRAVELERS..=MAX_TRAVELERS).contains(&count) {
            return Err(ValidationError::TravelerCount {
                value: count,
                min: MIN_TRAVELERS,
                max: MAX_TRAVELERS,
            });
        }
        self.travelers = count;
        Ok(())
    }

    /// Exchange the origin and destination.
    pub fn swap_locations(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    pub fn legs(&self) -> &[FlightLeg] {
        &self.legs
    }

    /// Append an empty leg and return its id.
    pub fn add_leg(&mut self) -> String {
        let id = self.next_leg_id.to_string();
        self.next_leg_id += 1;
        self.legs.push(FlightLeg {
            id: id.clone(),
            ..Default::default()
        });
        id
    }

    /// Mutable access to the leg with `id`.
    pub fn leg_mut(&mut self, id: &str) -> Option<&mut FlightLeg> {
        self.legs.iter_mut().find(|leg| leg.id == id)
    }

    /// Remove a leg. The last remaining leg cannot be removed.
    pub fn remove_leg(&mut self, id: &str) -> Result<bool, ValidationError> {
        if self.legs.len() <= 1 {
            return Err(ValidationError::LastLeg);
        }
        let before = self.legs.len();
        self.legs.retain(|leg| leg.id != id);
        Ok(self.legs.len() != before)
    }

    /// Validate the form and build one search request per flight: one for a
    /// simple search, one per leg for multi-city.
    pub fn to_requests(&self) -> Result<Vec<FlightSearchRequest>, ValidationError> {
        if self.trip_type == TripType::MultiCity {
            if let Some(index) = self.legs.iter().position(|leg| !leg.is_complete()) {
                return Err(ValidationError::IncompleteLeg { leg: index + 1 });
            }
            return Ok(self
                .legs
                .iter()
                .filter_map(|leg| {
                    Some(FlightSearchRequest {
                        departure: leg.from.trim().to_string(),
                        arrival: leg.to.trim().to_string(),
                        departure_date: leg.depart_date?,
                        return_date: None,
                        passengers: self.travelers,
                    })
                })
                .collect());
        }

        let missing: Vec<&'static str> = [
            ("from", self.from.trim().is_empty()),
            ("to", self.to.trim().is_empty()),
            ("departure date", self.departure_date.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, blank)| blank.then_some(field))
        .collect();
        let Some(departure_date) = self.departure_date.filter(|_| missing.is_empty()) else {
            return Err(ValidationError::MissingFields { fields: missing });
        };

        let return_date = match self.trip_type {
            TripType::RoundTrip => self.return_date,
            _ => None,
        };
        if return_date.is_some_and(|r| r < departure_date) {
            return Err(ValidationError::ReturnBeforeDeparture);
        }

        Ok(vec![FlightSearchRequest {
            departure: self.from.trim().to_string(),
            arrival: self.to.trim().to_string(),
            departure_date,
            return_date,
            passengers: self.travelers,
        }])
    }
}
