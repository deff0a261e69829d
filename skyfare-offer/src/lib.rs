pub mod models;
pub mod duration;
pub mod baggage;
pub mod pricing;
pub mod normalizer;
pub mod ranker;

pub use models::{
    Carrier, NormalizedOffer, NormalizedSegment, NormalizedSlice, OfferConditions,
    PriceBreakdown, SegmentEndpoint,
};
pub use duration::{duration_minutes, parse_duration};
pub use baggage::format_baggage;
pub use pricing::calculate_price_with_markup;
pub use normalizer::{NormalizeContext, OfferNormalizer};
pub use ranker::sort_offers;
