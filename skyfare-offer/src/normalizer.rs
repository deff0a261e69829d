use chrono::{DateTime, NaiveDateTime};
use skyfare_core::iata::{RawCarrier, RawConditionRule, RawPlace, RawSegment, RawSlice};
use skyfare_core::{BaggageAllowance, CabinClass, RawProviderOffer, TripType};
use tracing::debug;

use crate::baggage::format_baggage;
use crate::duration::{duration_minutes, parse_duration};
use crate::models::{
    Carrier, NormalizedOffer, NormalizedSegment, NormalizedSlice, OfferConditions,
    SegmentEndpoint,
};
use crate::pricing::calculate_price_with_markup;

const UNKNOWN_AIRLINE: &str = "Unknown Airline";

/// Cabin features assumed for every segment, on top of the aircraft name.
pub const ASSUMED_AMENITIES: [&str; 2] = ["In-flight Meal", "USB Power"];

/// Request context the normalizer needs besides the raw offers.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext {
    pub trip_type: TripType,
    pub cabin_class: CabinClass,
    pub commission_rate_percent: f64,
}

/// Turns raw provider offers into the offer → slice → segment tree served to
/// clients. Pure and synchronous; provider order is preserved at every level.
pub struct OfferNormalizer {
    context: NormalizeContext,
}

impl OfferNormalizer {
    pub fn new(context: NormalizeContext) -> Self {
        Self { context }
    }

    /// Normalize a whole batch. Every decoded offer yields exactly one
    /// normalized offer; defects inside an offer are defaulted field by field.
    pub fn normalize(&self, raw_offers: &[RawProviderOffer]) -> Vec<NormalizedOffer> {
        let offers: Vec<NormalizedOffer> = raw_offers
            .iter()
            .map(|offer| self.normalize_offer(offer))
            .collect();

        debug!(
            count = offers.len(),
            commission_rate = self.context.commission_rate_percent,
            "Normalized provider offers"
        );
        offers
    }

    pub fn normalize_offer(&self, offer: &RawProviderOffer) -> NormalizedOffer {
        let price = calculate_price_with_markup(
            offer.total_amount.as_deref(),
            offer.total_currency.as_deref(),
            self.context.commission_rate_percent,
        );

        let baggage = format_baggage(first_checked_bag(offer));

        let itinerary = offer
            .slices
            .iter()
            .enumerate()
            .map(|(index, slice)| self.normalize_slice(index, slice))
            .collect();

        let conditions = offer.conditions.as_ref();
        let conditions = OfferConditions {
            refundable: permitted(conditions.and_then(|c| c.refund_before_departure.as_ref())),
            changeable: permitted(conditions.and_then(|c| c.change_before_departure.as_ref())),
        };

        let carrier = offer
            .owner
            .as_ref()
            .or_else(|| offer.first_segment().and_then(|s| s.marketing_carrier.as_ref()))
            .map(|owner| Carrier {
                name: owner.name.clone().unwrap_or_else(|| UNKNOWN_AIRLINE.to_string()),
                logo: owner.logo_symbol_url.clone(),
                code: owner.iata_code.clone().unwrap_or_default(),
            })
            .unwrap_or_else(|| Carrier {
                name: UNKNOWN_AIRLINE.to_string(),
                ..Default::default()
            });

        NormalizedOffer {
            id: offer.id.clone().unwrap_or_default(),
            carrier,
            itinerary,
            price,
            baggage,
            cabin_class: self.context.cabin_class,
            conditions,
            expires_at: offer.expires_at.clone(),
        }
    }

    fn normalize_slice(&self, index: usize, slice: &RawSlice) -> NormalizedSlice {
        let segments: Vec<NormalizedSegment> = slice
            .segments
            .iter()
            .enumerate()
            .map(|(i, segment)| self.normalize_segment(segment, slice.segments.get(i + 1)))
            .collect();

        let minutes = duration_minutes(slice.duration.as_deref()).unwrap_or_else(|| {
            slice
                .segments
                .iter()
                .filter_map(|s| duration_minutes(s.duration.as_deref()))
                .fold(0u32, u32::saturating_add)
        });

        let first = segments.first();
        let last = segments.last();

        NormalizedSlice {
            direction: direction_label(self.context.trip_type, index),
            total_duration: parse_duration(slice.duration.as_deref()),
            duration_minutes: minutes,
            stops: segments.len().saturating_sub(1),
            main_departure: first.map(|s| s.departure.clone()),
            main_arrival: last.map(|s| s.arrival.clone()),
            main_airline: first.map(|s| s.airline.clone()),
            main_logo: first.and_then(|s| s.logo.clone()),
            segments,
        }
    }

    fn normalize_segment(&self, segment: &RawSegment, next: Option<&RawSegment>) -> NormalizedSegment {
        let carrier = segment
            .operating_carrier
            .as_ref()
            .or(segment.marketing_carrier.as_ref());

        let aircraft = segment.aircraft.as_ref().and_then(|a| a.name.clone());

        let class_type = segment
            .passengers
            .as_ref()
            .and_then(|passengers| passengers.first())
            .and_then(|p| p.cabin_class_marketing_name.clone())
            .unwrap_or_else(|| self.context.cabin_class.display_name().to_string());

        let layover_to_next = next.and_then(|next| {
            layover(segment.arriving_at.as_deref(), next.departing_at.as_deref())
        });

        let mut inferred_amenities: Vec<String> = aircraft.iter().cloned().collect();
        inferred_amenities.extend(ASSUMED_AMENITIES.iter().map(|a| a.to_string()));

        NormalizedSegment {
            airline: carrier
                .and_then(|c| c.name.clone())
                .unwrap_or_else(|| UNKNOWN_AIRLINE.to_string()),
            logo: carrier.and_then(|c| c.logo_symbol_url.clone()),
            flight_number: flight_number(segment),
            aircraft,
            class_type,
            departure: endpoint(segment.origin.as_ref(), segment.departing_at.as_deref()),
            arrival: endpoint(segment.destination.as_ref(), segment.arriving_at.as_deref()),
            duration: parse_duration(segment.duration.as_deref()),
            layover_to_next,
            inferred_amenities,
        }
    }
}

fn direction_label(trip_type: TripType, index: usize) -> String {
    match (trip_type, index) {
        (TripType::RoundTrip, 0) => "Outbound".to_string(),
        (TripType::RoundTrip, 1) => "Inbound".to_string(),
        _ => format!("Flight {}", index + 1),
    }
}

/// Refund and change rules are only ever *denied* explicitly; a missing rule
/// or a missing `allowed` flag counts as permitted.
fn permitted(rule: Option<&RawConditionRule>) -> bool {
    !matches!(rule.and_then(|r| r.allowed), Some(false))
}

fn first_checked_bag(offer: &RawProviderOffer) -> Option<&BaggageAllowance> {
    offer
        .first_segment()?
        .passengers
        .as_ref()?
        .iter()
        .filter_map(|passenger| passenger.baggages.as_ref())
        .flatten()
        .find(|bag| bag.is_checked())
}

fn flight_number(segment: &RawSegment) -> String {
    let pair = |carrier: Option<&RawCarrier>, number: Option<&String>| {
        number.map(|n| format!("{}{}", carrier.and_then(|c| c.iata_code.as_deref()).unwrap_or(""), n))
    };

    pair(
        segment.marketing_carrier.as_ref(),
        segment.marketing_carrier_flight_number.as_ref(),
    )
    .or_else(|| {
        pair(
            segment.operating_carrier.as_ref(),
            segment.operating_carrier_flight_number.as_ref(),
        )
    })
    .unwrap_or_default()
}

fn endpoint(place: Option<&RawPlace>, time: Option<&str>) -> SegmentEndpoint {
    SegmentEndpoint {
        airport: place.and_then(|p| p.name.clone()).unwrap_or_default(),
        code: place.and_then(|p| p.iata_code.clone()).unwrap_or_default(),
        time: time.unwrap_or_default().to_string(),
    }
}

/// Provider timestamps are either airport-local without an offset or RFC 3339.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Wall-clock gap between an arrival and the next departure, floored to whole
/// minutes and rendered as `{h}h {m}m`.
pub fn layover(arrival: Option<&str>, next_departure: Option<&str>) -> Option<String> {
    let arrival = parse_timestamp(arrival?)?;
    let departure = parse_timestamp(next_departure?)?;

    let minutes = (departure - arrival).num_minutes();
    if minutes < 0 {
        return None;
    }
    Some(format!("{}h {}m", minutes / 60, minutes % 60))
}
