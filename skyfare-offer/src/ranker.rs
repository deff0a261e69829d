use skyfare_core::SortOrder;

use crate::models::NormalizedOffer;

/// Reorder normalized offers for display. Runs after normalization; the
/// sort is stable so provider order breaks ties.
pub fn sort_offers(offers: &mut [NormalizedOffer], order: SortOrder) {
    match order {
        SortOrder::Best => {}
        SortOrder::Cheapest => offers.sort_by_key(|offer| offer.price.final_price),
        SortOrder::Fastest => offers.sort_by_key(|offer| offer.total_minutes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Carrier, NormalizedSlice, OfferConditions, PriceBreakdown};
    use skyfare_core::CabinClass;

    fn offer(id: &str, final_price: i64, minutes: u32) -> NormalizedOffer {
        NormalizedOffer {
            id: id.to_string(),
            carrier: Carrier::default(),
            itinerary: vec![NormalizedSlice {
                direction: "Flight 1".to_string(),
                total_duration: String::new(),
                duration_minutes: minutes,
                stops: 0,
                segments: Vec::new(),
                main_departure: None,
                main_arrival: None,
                main_airline: None,
                main_logo: None,
            }],
            price: PriceBreakdown {
                currency: "USD".to_string(),
                base_price: final_price as f64,
                markup: 0.0,
                final_price,
            },
            baggage: String::new(),
            cabin_class: CabinClass::Economy,
            conditions: OfferConditions {
                refundable: true,
                changeable: true,
            },
            expires_at: None,
        }
    }

    fn ids(offers: &[NormalizedOffer]) -> Vec<&str> {
        offers.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_best_keeps_provider_order() {
        let mut offers = vec![offer("a", 300, 90), offer("b", 100, 400), offer("c", 200, 60)];
        sort_offers(&mut offers, SortOrder::Best);
        assert_eq!(ids(&offers), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cheapest_is_stable() {
        let mut offers = vec![offer("a", 300, 90), offer("b", 100, 400), offer("c", 100, 60)];
        sort_offers(&mut offers, SortOrder::Cheapest);
        assert_eq!(ids(&offers), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_fastest_with_saturated_durations() {
        let mut huge = offer("huge", 100, 0);
        huge.itinerary = vec![offer("x", 0, u32::MAX).itinerary[0].clone(); 2];
        let mut offers = vec![huge, offer("short", 300, 90)];

        sort_offers(&mut offers, SortOrder::Fastest);
        assert_eq!(ids(&offers), vec!["short", "huge"]);
    }

    #[test]
    fn test_fastest() {
        let mut offers = vec![offer("a", 300, 90), offer("b", 100, 400), offer("c", 200, 60)];
        sort_offers(&mut offers, SortOrder::Fastest);
        assert_eq!(ids(&offers), vec!["c", "a", "b"]);
    }
}
