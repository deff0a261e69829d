use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MIN_MULTI_CITY_LEGS: usize = 2;
pub const MAX_MULTI_CITY_LEGS: usize = 8;
/// Most travellers one offer request may carry, infants included.
pub const MAX_TRAVELLERS: u64 = 9;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Search Request Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

impl TripType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "one_way" => Some(Self::OneWay),
            "round_trip" => Some(Self::RoundTrip),
            "multi_city" => Some(Self::MultiCity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "economy" => Some(Self::Economy),
            "premium_economy" => Some(Self::PremiumEconomy),
            "business" => Some(Self::Business),
            "first" => Some(Self::First),
            _ => None,
        }
    }

    /// Human-readable label, used when the provider omits a marketing name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Economy => "Economy",
            Self::PremiumEconomy => "Premium Economy",
            Self::Business => "Business",
            Self::First => "First",
        }
    }
}

/// Post-processing order applied to the normalized offer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Provider order
    #[default]
    Best,
    Cheapest,
    Fastest,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "best" => Some(Self::Best),
            "cheapest" => Some(Self::Cheapest),
            "fastest" => Some(Self::Fastest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchLeg {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Passengers {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

/// A validated search. Every trip type is flattened into ordered legs:
/// one-way has one, round-trip has the outbound and the return, multi-city
/// keeps the requested legs.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub trip_type: TripType,
    pub legs: Vec<SearchLeg>,
    pub passengers: Passengers,
    pub cabin_class: CabinClass,
    pub sort: SortOrder,
}

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("search request failed validation with {} issue(s)", .issues.len())]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// True when at least one issue was reported against `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Validate and normalize a raw search body.
///
/// All violations found in one pass are reported together; nothing
/// short-circuits after the first problem.
pub fn validate(raw: &Value) -> Result<SearchRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(body) = raw.as_object() else {
        errors.push("", "Request body must be a JSON object");
        return Err(errors);
    };

    let trip_type = match body.get("type") {
        None | Some(Value::Null) => {
            errors.push("type", "Trip type is required");
            None
        }
        Some(Value::String(value)) => {
            let parsed = TripType::parse(value);
            if parsed.is_none() {
                errors.push(
                    "type",
                    "Trip type must be one of one_way, round_trip, multi_city",
                );
            }
            parsed
        }
        Some(_) => {
            errors.push("type", "Trip type must be a string");
            None
        }
    };

    let legs = match trip_type {
        Some(TripType::OneWay) => point_to_point_legs(body, false, &mut errors),
        Some(TripType::RoundTrip) => point_to_point_legs(body, true, &mut errors),
        Some(TripType::MultiCity) => multi_city_legs(body, &mut errors),
        None => Vec::new(),
    };

    let passengers = passengers(body.get("passengers"), &mut errors);

    let cabin_class = enum_field(
        body.get("cabinClass"),
        "cabinClass",
        CabinClass::parse,
        "Cabin class must be one of economy, premium_economy, business, first",
        &mut errors,
    )
    .unwrap_or_default();

    let sort = enum_field(
        body.get("sort"),
        "sort",
        SortOrder::parse,
        "Sort must be one of best, cheapest, fastest",
        &mut errors,
    )
    .unwrap_or_default();

    match trip_type {
        Some(trip_type) if errors.is_empty() => Ok(SearchRequest {
            trip_type,
            legs,
            passengers,
            cabin_class,
            sort,
        }),
        _ => Err(errors),
    }
}

fn point_to_point_legs(
    body: &Map<String, Value>,
    round_trip: bool,
    errors: &mut ValidationErrors,
) -> Vec<SearchLeg> {
    let origin = airport_code(body.get("origin"), "origin", errors);
    let destination = airport_code(body.get("destination"), "destination", errors);
    let departure = date_field(body.get("departureDate"), "departureDate", errors);
    let return_date = if round_trip {
        date_field(body.get("returnDate"), "returnDate", errors)
    } else {
        None
    };

    if let (Some(origin), Some(destination)) = (&origin, &destination) {
        if origin == destination {
            errors.push("destination", "Origin and destination must be different");
        }
    }

    if let (Some(departure), Some(return_date)) = (departure, return_date) {
        if return_date < departure {
            errors.push("returnDate", "Return date cannot be before departure date");
        }
    }

    let (Some(origin), Some(destination), Some(departure)) = (origin, destination, departure)
    else {
        return Vec::new();
    };

    let mut legs = vec![SearchLeg {
        origin: origin.clone(),
        destination: destination.clone(),
        date: departure,
    }];

    if round_trip {
        if let Some(return_date) = return_date {
            legs.push(SearchLeg {
                origin: destination,
                destination: origin,
                date: return_date,
            });
        }
    }

    legs
}

fn multi_city_legs(body: &Map<String, Value>, errors: &mut ValidationErrors) -> Vec<SearchLeg> {
    let flights = match body.get("flights") {
        None | Some(Value::Null) => {
            errors.push("flights", "At least 2 flights are required for a multi-city trip");
            return Vec::new();
        }
        Some(Value::Array(flights)) => flights,
        Some(_) => {
            errors.push("flights", "Flights must be an array");
            return Vec::new();
        }
    };

    if flights.len() < MIN_MULTI_CITY_LEGS {
        errors.push("flights", "At least 2 flights are required for a multi-city trip");
    } else if flights.len() > MAX_MULTI_CITY_LEGS {
        errors.push("flights", "A multi-city trip supports at most 8 flights");
    }

    let mut legs = Vec::with_capacity(flights.len());
    for (index, flight) in flights.iter().enumerate() {
        let prefix = format!("flights[{index}]");
        let Some(flight) = flight.as_object() else {
            errors.push(prefix, "Flight must be an object");
            continue;
        };

        let origin = airport_code(flight.get("origin"), &format!("{prefix}.origin"), errors);
        let destination = airport_code(
            flight.get("destination"),
            &format!("{prefix}.destination"),
            errors,
        );
        let date = date_field(flight.get("date"), &format!("{prefix}.date"), errors);

        if let (Some(origin), Some(destination), Some(date)) = (origin, destination, date) {
            legs.push(SearchLeg {
                origin,
                destination,
                date,
            });
        }
    }

    legs
}

fn passengers(value: Option<&Value>, errors: &mut ValidationErrors) -> Passengers {
    let defaults = Passengers::default();
    let body = match value {
        None | Some(Value::Null) => return defaults,
        Some(Value::Object(body)) => body,
        Some(_) => {
            errors.push("passengers", "Passengers must be an object");
            return defaults;
        }
    };

    let adults = count_field(body.get("adults"), "passengers.adults", defaults.adults, errors);
    let children = count_field(
        body.get("children"),
        "passengers.children",
        defaults.children,
        errors,
    );
    let infants = count_field(
        body.get("infants"),
        "passengers.infants",
        defaults.infants,
        errors,
    );

    if let Some(adults) = adults {
        if adults < 1 {
            errors.push("passengers.adults", "At least one adult is required");
        }
        if let Some(infants) = infants {
            if infants > adults {
                errors.push(
                    "passengers.infants",
                    "Each infant must travel with an adult",
                );
            }
        }
    }

    if let (Some(adults), Some(children), Some(infants)) = (adults, children, infants) {
        let total = u64::from(adults) + u64::from(children) + u64::from(infants);
        if total > MAX_TRAVELLERS {
            errors.push(
                "passengers",
                format!("No more than {MAX_TRAVELLERS} travellers can be booked together"),
            );
        }
    }

    Passengers {
        adults: adults.unwrap_or(defaults.adults),
        children: children.unwrap_or(defaults.children),
        infants: infants.unwrap_or(defaults.infants),
    }
}

fn count_field(
    value: Option<&Value>,
    path: &str,
    default: u32,
    errors: &mut ValidationErrors,
) -> Option<u32> {
    match value {
        None | Some(Value::Null) => Some(default),
        Some(Value::Number(number)) => {
            if let Some(count) = number.as_u64() {
                match u32::try_from(count) {
                    Ok(count) => Some(count),
                    Err(_) => {
                        errors.push(path, "Passenger count is too large");
                        None
                    }
                }
            } else if number.as_i64().is_some_and(|n| n < 0) {
                errors.push(path, "Passenger count cannot be negative");
                None
            } else {
                errors.push(path, "Passenger count must be a whole number");
                None
            }
        }
        Some(_) => {
            errors.push(path, "Passenger count must be a number");
            None
        }
    }
}

fn airport_code(value: Option<&Value>, path: &str, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            errors.push(path, "Airport code is required");
            None
        }
        Some(Value::String(code)) => {
            let code = code.trim().to_ascii_uppercase();
            if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
                Some(code)
            } else {
                errors.push(path, "Airport code must be a 3-letter IATA code");
                None
            }
        }
        Some(_) => {
            errors.push(path, "Airport code must be a string");
            None
        }
    }
}

fn date_field(value: Option<&Value>, path: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    match value {
        None | Some(Value::Null) => {
            errors.push(path, "Date is required");
            None
        }
        Some(Value::String(date)) => match NaiveDate::parse_from_str(date.trim(), DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(path, "Date must use the YYYY-MM-DD format");
                None
            }
        },
        Some(_) => {
            errors.push(path, "Date must be a string");
            None
        }
    }
}

fn enum_field<T>(
    value: Option<&Value>,
    path: &str,
    parse: fn(&str) -> Option<T>,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => {
            let parsed = parse(raw);
            if parsed.is_none() {
                errors.push(path, message);
            }
            parsed
        }
        Some(_) => {
            errors.push(path, message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_one_way_is_normalized() {
        let raw = json!({
            "type": "one_way",
            "origin": "jfk",
            "destination": "lhr",
            "departureDate": "2025-06-01"
        });

        let request = validate(&raw).expect("valid one-way search");
        assert_eq!(request.trip_type, TripType::OneWay);
        assert_eq!(request.legs.len(), 1);
        assert_eq!(request.legs[0].origin, "JFK");
        assert_eq!(request.legs[0].destination, "LHR");
        assert_eq!(request.legs[0].date, date("2025-06-01"));
        assert_eq!(request.passengers, Passengers::default());
        assert_eq!(request.cabin_class, CabinClass::Economy);
        assert_eq!(request.sort, SortOrder::Best);
    }

    #[test]
    fn test_round_trip_builds_return_leg() {
        let raw = json!({
            "type": "round_trip",
            "origin": "JFK",
            "destination": "CDG",
            "departureDate": "2025-06-01",
            "returnDate": "2025-06-10",
            "passengers": { "adults": 2, "children": 1, "infants": 1 },
            "cabinClass": "business",
            "sort": "cheapest"
        });

        let request = validate(&raw).expect("valid round trip");
        assert_eq!(request.legs.len(), 2);
        assert_eq!(request.legs[1].origin, "CDG");
        assert_eq!(request.legs[1].destination, "JFK");
        assert_eq!(request.legs[1].date, date("2025-06-10"));
        assert_eq!(request.passengers.adults, 2);
        assert_eq!(request.passengers.children, 1);
        assert_eq!(request.cabin_class, CabinClass::Business);
        assert_eq!(request.sort, SortOrder::Cheapest);
    }

    #[test]
    fn test_same_city_round_trip_flags_destination() {
        let raw = json!({
            "type": "round_trip",
            "origin": "JFK",
            "destination": "jfk",
            "departureDate": "2025-06-01",
            "returnDate": "2025-06-10"
        });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.has_path("destination"));
        assert_eq!(errors.issues().len(), 1);
    }

    #[test]
    fn test_round_trip_requires_return_date() {
        let raw = json!({
            "type": "round_trip",
            "origin": "JFK",
            "destination": "LAX",
            "departureDate": "2025-06-01"
        });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.has_path("returnDate"));
    }

    #[test]
    fn test_return_before_departure_rejected() {
        let raw = json!({
            "type": "round_trip",
            "origin": "JFK",
            "destination": "LAX",
            "departureDate": "2025-06-10",
            "returnDate": "2025-06-01"
        });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.has_path("returnDate"));
    }

    #[test]
    fn test_all_issues_collected_in_one_pass() {
        let raw = json!({
            "type": "one_way",
            "origin": "NEWYORK",
            "departureDate": "01/06/2025",
            "passengers": { "adults": 0, "children": -1 },
            "cabinClass": "luxury"
        });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.has_path("origin"));
        assert!(errors.has_path("destination"));
        assert!(errors.has_path("departureDate"));
        assert!(errors.has_path("passengers.adults"));
        assert!(errors.has_path("passengers.children"));
        assert!(errors.has_path("cabinClass"));
    }

    #[test]
    fn test_missing_trip_type() {
        let errors = validate(&json!({ "origin": "JFK" })).unwrap_err();
        assert!(errors.has_path("type"));

        let errors = validate(&json!({ "type": "open_jaw" })).unwrap_err();
        assert!(errors.has_path("type"));
    }

    #[test]
    fn test_non_object_body_rejected() {
        let errors = validate(&json!(["JFK", "LHR"])).unwrap_err();
        assert_eq!(errors.issues().len(), 1);
    }

    #[test]
    fn test_multi_city_legs() {
        let raw = json!({
            "type": "multi_city",
            "flights": [
                { "origin": "JFK", "destination": "LHR", "date": "2025-06-01" },
                { "origin": "LHR", "destination": "CDG", "date": "2025-06-05" },
                { "origin": "CDG", "destination": "JFK", "date": "2025-06-12" }
            ]
        });

        let request = validate(&raw).expect("valid multi-city search");
        assert_eq!(request.trip_type, TripType::MultiCity);
        assert_eq!(request.legs.len(), 3);
        assert_eq!(request.legs[2].destination, "JFK");
    }

    #[test]
    fn test_multi_city_requires_two_legs() {
        let raw = json!({
            "type": "multi_city",
            "flights": [
                { "origin": "JFK", "destination": "LHR", "date": "2025-06-01" }
            ]
        });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.has_path("flights"));

        let errors = validate(&json!({ "type": "multi_city" })).unwrap_err();
        assert!(errors.has_path("flights"));
    }

    #[test]
    fn test_multi_city_caps_leg_count() {
        let leg = json!({ "origin": "JFK", "destination": "LHR", "date": "2025-06-01" });
        let raw = json!({ "type": "multi_city", "flights": vec![leg; 9] });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.has_path("flights"));
    }

    #[test]
    fn test_multi_city_reports_indexed_paths() {
        let raw = json!({
            "type": "multi_city",
            "flights": [
                { "origin": "JFK", "destination": "LHR", "date": "2025-06-01" },
                { "origin": "L1", "destination": "CDG" }
            ]
        });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.has_path("flights[1].origin"));
        assert!(errors.has_path("flights[1].date"));
        assert!(!errors.has_path("flights[0].origin"));
    }

    #[test]
    fn test_infants_cannot_exceed_adults() {
        let raw = json!({
            "type": "one_way",
            "origin": "JFK",
            "destination": "LHR",
            "departureDate": "2025-06-01",
            "passengers": { "adults": 1, "infants": 2 }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(errors.has_path("passengers.infants"));
    }

    #[test]
    fn test_traveller_total_is_capped() {
        let search = |passengers: Value| {
            json!({
                "type": "one_way",
                "origin": "JFK",
                "destination": "LHR",
                "departureDate": "2025-06-01",
                "passengers": passengers
            })
        };

        let request = validate(&search(json!({ "adults": 5, "children": 2, "infants": 2 })))
            .expect("nine travellers is allowed");
        assert_eq!(request.passengers.adults, 5);

        let errors =
            validate(&search(json!({ "adults": 6, "children": 2, "infants": 2 }))).unwrap_err();
        assert!(errors.has_path("passengers"));

        let errors = validate(&search(json!({ "adults": 4_000_000_000u64, "children": 4_000_000_000u64 })))
            .unwrap_err();
        assert!(errors.has_path("passengers"));
    }

    #[test]
    fn test_validation_errors_serialize_as_list() {
        let mut errors = ValidationErrors::default();
        errors.push("origin", "Airport code is required");

        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value[0]["path"], "origin");
        assert_eq!(errors.to_string(), "search request failed validation with 1 issue(s)");
    }
}
