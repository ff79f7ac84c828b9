//! Data shared with the Ezzifly backend and local storage.

pub mod booking;
pub mod flight;
pub mod traveller;
pub mod user;

pub use booking::{Booking, BookingRequest, ContactInfo, Passenger};
pub use flight::{Airport, Flight, FlightSearchRequest, FlightSummary};
pub use traveller::Traveller;
pub use user::{Credentials, Identity, Registration, User};
