//! HTTP client for the flight-distribution provider's offer request API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skyfare_core::{FlightProvider, OfferRequest, ProviderError, RawProviderOffer};
use tracing::{info, warn};

use crate::app_config::ProviderConfig;

const VERSION_HEADER: &str = "Duffel-Version";

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    data: &'a OfferRequest,
}

#[derive(Deserialize)]
struct OfferRequestResponse {
    data: OfferRequestData,
}

#[derive(Deserialize)]
struct OfferRequestData {
    #[serde(default)]
    offers: Vec<Value>,
}

/// Decode an offer request response body. The envelope must be well formed;
/// individual offers are decoded one at a time.
pub fn decode_offer_response(body: &[u8]) -> Result<Vec<RawProviderOffer>, ProviderError> {
    let response: OfferRequestResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::Decode(e.to_string()))?;
    Ok(RawProviderOffer::decode_batch(response.data.offers))
}

pub struct HttpFlightProvider {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    api_version: Option<String>,
    timeout_ms: u64,
}

impl HttpFlightProvider {
    /// `base_url` should be like `https://api.duffel.com` (no trailing slash needed).
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            api_version: config.api_version.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout_ms)
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl FlightProvider for HttpFlightProvider {
    async fn create_offer_request(
        &self,
        request: &OfferRequest,
    ) -> Result<Vec<RawProviderOffer>, ProviderError> {
        let url = format!("{}/air/offer_requests?return_offers=true", self.base_url);

        info!(
            url = %url,
            slices = request.slices.len(),
            passengers = request.passengers.len(),
            "Creating provider offer request"
        );

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .json(&RequestEnvelope { data: request });
        if let Some(version) = &self.api_version {
            builder = builder.header(VERSION_HEADER, version);
        }

        let resp = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Provider rejected offer request");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await.map_err(|e| self.map_send_error(e))?;
        let offers = decode_offer_response(&body)?;
        info!(count = offers.len(), "Received provider offers");
        Ok(offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skyfare_core::validate;

    fn provider_config() -> ProviderConfig {
        ProviderConfig {
            base_url: "https://provider.test/".to_string(),
            access_token: "test_token".to_string(),
            api_version: Some("v2".to_string()),
            timeout_ms: 5_000,
        }
    }

    #[test]
    fn test_request_is_wrapped_in_data_envelope() {
        let search = validate(&json!({
            "type": "one_way",
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-09-01"
        }))
        .unwrap();
        let request = OfferRequest::from(&search);

        let wire = serde_json::to_value(RequestEnvelope { data: &request }).unwrap();
        assert_eq!(wire["data"]["slices"][0]["origin"], "LHR");
        assert_eq!(wire["data"]["cabin_class"], "economy");
        assert_eq!(wire["data"]["return_offers"], true);
    }

    #[test]
    fn test_decode_offer_response() {
        let body = json!({
            "data": {
                "id": "orq_1",
                "offers": [
                    { "id": "off_1", "total_amount": "120.00", "total_currency": "USD", "slices": [] },
                    42,
                    { "id": "off_3", "total_amount": "99.00", "total_currency": "USD", "slices": [] }
                ]
            }
        });

        let offers = decode_offer_response(body.to_string().as_bytes()).unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[1].id.as_deref(), Some("off_3"));
    }

    #[test]
    fn test_decode_rejects_bad_envelope() {
        let result = decode_offer_response(br#"{"errors": [{"message": "bad"}]}"#);
        assert!(matches!(result, Err(ProviderError::Decode(_))));

        let result = decode_offer_response(b"<html>gateway</html>");
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let provider = HttpFlightProvider::new(&provider_config()).unwrap();
        assert_eq!(provider.base_url, "https://provider.test");
    }
}
