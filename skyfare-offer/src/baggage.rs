use skyfare_core::BaggageAllowance;

/// Typical checked-bag allowance on international routes, used when the
/// provider only reports a bag count.
pub const APPROX_KG_PER_BAG: u32 = 23;

pub const CABIN_BAG_ONLY: &str = "Cabin Bag Only";
pub const CHECK_RULES: &str = "Check Rules";

/// Describe a checked-baggage allowance.
///
/// An exact weight wins over a bag count; a count alone is turned into an
/// estimate that is labelled `approx`. Zero weights and counts carry no
/// information and are treated as absent.
pub fn format_baggage(bag: Option<&BaggageAllowance>) -> String {
    let Some(bag) = bag else {
        return CABIN_BAG_ONLY.to_string();
    };

    let weight = bag.weight.filter(|w| *w > 0.0);
    let quantity = bag.quantity.filter(|q| *q > 0);

    match (weight, quantity) {
        (Some(weight), quantity) => {
            format!("{} Bag ({}kg)", quantity.unwrap_or(1), weight)
        }
        (None, Some(quantity)) => {
            let plural = if quantity > 1 { "s" } else { "" };
            format!(
                "{} Bag{} ({}kg approx)",
                quantity,
                plural,
                quantity.saturating_mul(APPROX_KG_PER_BAG)
            )
        }
        (None, None) => CHECK_RULES.to_string(),
    }
}
