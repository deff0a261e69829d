use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

// ============================================================================
// Provider Offer Models (offer_requests response shape)
//
// Nested structures are decoded leniently: a value with the wrong JSON shape
// becomes `None` instead of failing the whole offer. Only an offer whose
// slices or segments are not arrays is rejected outright.
// ============================================================================

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProviderOffer {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_currency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub expires_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub owner: Option<RawCarrier>,
    #[serde(default, deserialize_with = "lenient")]
    pub conditions: Option<RawConditions>,
    #[serde(default)]
    pub slices: Vec<RawSlice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCarrier {
    pub name: Option<String>,
    pub iata_code: Option<String>,
    pub logo_symbol_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlace {
    pub name: Option<String>,
    pub iata_code: Option<String>,
    pub city_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAircraft {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSlice {
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub origin: Option<RawPlace>,
    #[serde(default, deserialize_with = "lenient")]
    pub destination: Option<RawPlace>,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSegment {
    #[serde(default, deserialize_with = "lenient")]
    pub operating_carrier: Option<RawCarrier>,
    #[serde(default, deserialize_with = "lenient")]
    pub marketing_carrier: Option<RawCarrier>,
    #[serde(default, deserialize_with = "lenient")]
    pub operating_carrier_flight_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub marketing_carrier_flight_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub aircraft: Option<RawAircraft>,
    #[serde(default, deserialize_with = "lenient")]
    pub origin: Option<RawPlace>,
    #[serde(default, deserialize_with = "lenient")]
    pub destination: Option<RawPlace>,
    #[serde(default, deserialize_with = "lenient")]
    pub departing_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub arriving_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub passengers: Option<Vec<RawSegmentPassenger>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSegmentPassenger {
    #[serde(default, deserialize_with = "lenient")]
    pub cabin_class: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cabin_class_marketing_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub baggages: Option<Vec<BaggageAllowance>>,
}

/// One baggage entry as reported by the provider. Some carriers report an
/// exact checked weight, others only a bag count.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BaggageAllowance {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub quantity: Option<u32>,
    pub weight: Option<f64>,
}

impl BaggageAllowance {
    pub fn is_checked(&self) -> bool {
        self.kind.as_deref() == Some("checked")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConditions {
    #[serde(default, deserialize_with = "lenient")]
    pub refund_before_departure: Option<RawConditionRule>,
    #[serde(default, deserialize_with = "lenient")]
    pub change_before_departure: Option<RawConditionRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConditionRule {
    pub allowed: Option<bool>,
    pub penalty_amount: Option<String>,
    pub penalty_currency: Option<String>,
}

impl RawProviderOffer {
    /// Decode a batch of provider offers one by one. Offers that cannot be
    /// decoded at all are skipped so the rest of the batch survives.
    pub fn decode_batch(values: Vec<Value>) -> Vec<RawProviderOffer> {
        let total = values.len();
        let offers: Vec<RawProviderOffer> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(offer) => Some(offer),
                Err(e) => {
                    warn!(index, error = %e, "Skipping undecodable provider offer");
                    None
                }
            })
            .collect();

        if offers.len() < total {
            warn!(decoded = offers.len(), total, "Provider batch partially decoded");
        }
        offers
    }

    pub fn first_segment(&self) -> Option<&RawSegment> {
        self.slices.first().and_then(|slice| slice.segments.first())
    }
}
