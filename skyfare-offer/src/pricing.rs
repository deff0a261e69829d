use crate::models::PriceBreakdown;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Sums within a few ULPs of a whole number are float noise (such as
/// `110.00000000000001`) and must not ceil up to the next unit.
const NOISE_ULPS: f64 = 4.0;

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ceiling that ignores representation noise around whole numbers. Anything
/// genuinely above a whole number still rounds up.
fn ceil_ignoring_noise(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= NOISE_ULPS * f64::EPSILON * nearest.abs().max(1.0) {
        nearest
    } else {
        value.ceil()
    }
}

fn parse_amount(amount: Option<&str>) -> Option<f64> {
    amount
        .map(str::trim)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Apply the agency commission to a provider fare.
///
/// `markup = base * rate / 100` and `final = ceil(base + markup)`, so the
/// agency never loses a fractional unit. Base and markup are rounded to cents
/// for display only; the ceiling uses the unrounded sum.
///
/// A missing or unparseable amount yields an all-zero breakdown instead of an
/// error. A negative rate is treated as zero.
pub fn calculate_price_with_markup(
    amount: Option<&str>,
    currency: Option<&str>,
    commission_rate_percent: f64,
) -> PriceBreakdown {
    let currency = currency
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string();

    let Some(base_price) = parse_amount(amount) else {
        return PriceBreakdown {
            currency,
            base_price: 0.0,
            markup: 0.0,
            final_price: 0,
        };
    };

    let rate = if commission_rate_percent.is_finite() {
        commission_rate_percent.max(0.0)
    } else {
        0.0
    };
    let markup = base_price * (rate / 100.0);
    let final_price = ceil_ignoring_noise(base_price + markup).max(0.0) as i64;

    PriceBreakdown {
        currency,
        base_price: round_to_cents(base_price),
        markup: round_to_cents(markup),
        final_price,
    }
}
