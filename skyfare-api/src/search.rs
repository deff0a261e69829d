use axum::{
    body::Bytes,
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use skyfare_core::{validate, OfferRequest, ProviderError};
use skyfare_offer::{sort_offers, NormalizeContext, NormalizedOffer, OfferNormalizer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::rate_limit_middleware;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SearchMeta {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub meta: SearchMeta,
    pub data: Vec<NormalizedOffer>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/flights/search", post(search_flights))
        .route_layer(axum::middleware::from_fn_with_state(state, rate_limit_middleware))
}

/// POST /api/flights/search
pub async fn search_flights(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SearchResponse>, AppError> {
    let search_id = Uuid::new_v4();
    run_search(&state, &body)
        .instrument(info_span!("flight_search", %search_id))
        .await
        .map(Json)
}

async fn run_search(state: &AppState, body: &[u8]) -> Result<SearchResponse, AppError> {
    let raw: Value =
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let search = validate(&raw)?;

    info!(
        trip_type = ?search.trip_type,
        legs = search.legs.len(),
        adults = search.passengers.adults,
        "Searching provider offers"
    );

    let request = OfferRequest::from(&search);
    let raw_offers = tokio::time::timeout(
        state.provider_timeout,
        state.provider.create_offer_request(&request),
    )
    .await
    .map_err(|_| ProviderError::Timeout(state.provider_timeout.as_millis() as u64))??;

    let normalizer = OfferNormalizer::new(NormalizeContext {
        trip_type: search.trip_type,
        cabin_class: search.cabin_class,
        commission_rate_percent: state.commission_rate,
    });
    let mut offers = normalizer.normalize(&raw_offers);
    sort_offers(&mut offers, search.sort);

    info!(count = offers.len(), sort = ?search.sort, "Search complete");

    Ok(SearchResponse {
        success: true,
        meta: SearchMeta { count: offers.len() },
        data: offers,
    })
}
