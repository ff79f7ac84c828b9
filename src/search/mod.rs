//! Flight search: the home page form and the airport catalog.

pub mod airports;
pub mod form;

pub use form::{CabinClass, FlightLeg, FlightSearchForm, TripType};
