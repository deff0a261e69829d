use serde::Serialize;
use skyfare_core::CabinClass;

/// A provider offer after normalization. Built once per raw offer and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOffer {
    pub id: String,
    pub carrier: Carrier,
    pub itinerary: Vec<NormalizedSlice>,
    pub price: PriceBreakdown,
    pub baggage: String,
    pub cabin_class: CabinClass,
    pub conditions: OfferConditions,
    #[serde(rename = "expires_at")]
    pub expires_at: Option<String>,
}

impl NormalizedOffer {
    /// Total flying plus connection time over every slice.
    pub fn total_minutes(&self) -> u32 {
        self.itinerary
            .iter()
            .fold(0u32, |total, slice| total.saturating_add(slice.duration_minutes))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Carrier {
    pub name: String,
    pub logo: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSlice {
    pub direction: String,
    pub total_duration: String,
    pub duration_minutes: u32,
    pub stops: usize,
    pub segments: Vec<NormalizedSegment>,
    pub main_departure: Option<SegmentEndpoint>,
    pub main_arrival: Option<SegmentEndpoint>,
    pub main_airline: Option<String>,
    pub main_logo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSegment {
    pub airline: String,
    pub logo: Option<String>,
    pub flight_number: String,
    pub aircraft: Option<String>,
    pub class_type: String,
    pub departure: SegmentEndpoint,
    pub arrival: SegmentEndpoint,
    pub duration: String,
    pub layover_to_next: Option<String>,
    /// Guessed from the aircraft plus common cabin features. The provider
    /// does not guarantee any of these.
    #[serde(rename = "amenities")]
    pub inferred_amenities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentEndpoint {
    pub airport: String,
    pub code: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub currency: String,
    pub base_price: f64,
    pub markup: f64,
    pub final_price: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfferConditions {
    pub refundable: bool,
    pub changeable: bool,
}
