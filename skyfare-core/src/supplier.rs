use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::iata::RawProviderOffer;
use crate::search::{CabinClass, SearchRequest};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request timed out after {0}ms")]
    Timeout(u64),
    #[error("provider transport failure: {0}")]
    Transport(String),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}

/// External flight-distribution API.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// Create an offer request and return the offers it produced, in
    /// provider order.
    async fn create_offer_request(
        &self,
        request: &OfferRequest,
    ) -> Result<Vec<RawProviderOffer>, ProviderError>;
}

// ============================================================================
// Offer Request (wire shape)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OfferRequest {
    pub slices: Vec<OfferSlice>,
    pub passengers: Vec<OfferPassenger>,
    pub cabin_class: CabinClass,
    pub return_offers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferSlice {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerType {
    Adult,
    Child,
    InfantWithoutSeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfferPassenger {
    #[serde(rename = "type")]
    pub kind: PassengerType,
}

impl From<&SearchRequest> for OfferRequest {
    fn from(search: &SearchRequest) -> Self {
        let slices = search
            .legs
            .iter()
            .map(|leg| OfferSlice {
                origin: leg.origin.clone(),
                destination: leg.destination.clone(),
                departure_date: leg.date,
            })
            .collect();

        let counts = search.passengers;
        let passengers = std::iter::repeat(PassengerType::Adult)
            .take(counts.adults as usize)
            .chain(std::iter::repeat(PassengerType::Child).take(counts.children as usize))
            .chain(std::iter::repeat(PassengerType::InfantWithoutSeat).take(counts.infants as usize))
            .map(|kind| OfferPassenger { kind })
            .collect();

        Self {
            slices,
            passengers,
            cabin_class: search.cabin_class,
            return_offers: true,
        }
    }
}
