pub mod search;
pub mod iata;
pub mod supplier;

pub use iata::{BaggageAllowance, RawProviderOffer};
pub use search::{
    validate, CabinClass, Passengers, SearchLeg, SearchRequest, SortOrder, TripType,
    ValidationErrors, ValidationIssue,
};
pub use supplier::{FlightProvider, OfferRequest, ProviderError};
