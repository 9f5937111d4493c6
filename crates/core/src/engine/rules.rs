//! Declarative rule tables for the expense engines. Categorization keywords
//! and policy thresholds live here so new categories or limits are data
//! edits, not control-flow edits.

use rust_decimal::Decimal;

pub const CATEGORY_TRANSPORTATION: &str = "transportation";
pub const CATEGORY_LODGING: &str = "lodging";
pub const CATEGORY_MEALS: &str = "meals";
pub const CATEGORY_OFFICE_SUPPLIES: &str = "office_supplies";
pub const CATEGORY_AIRFARE: &str = "airfare";
pub const CATEGORY_FALLBACK: &str = "miscellaneous";

pub const POLICY_MEAL_ALLOWANCES: &str = "Section 3.2 - Meal Allowances";
pub const POLICY_ACCOMMODATION_LIMITS: &str = "Section 4.1 - Accommodation Limits";
pub const POLICY_DOCUMENTATION: &str = "Section 2.1 - Documentation Requirements";

/// Keyword weight tables. Within a category the score of a match is the
/// maximum matched weight, never a sum: one strong keyword outranks several
/// weak ones.
pub const TRANSPORTATION_KEYWORDS: &[(&str, f64)] = &[
    ("flight", 0.95),
    ("airline", 0.9),
    ("airfare", 0.95),
    ("plane", 0.8),
    ("uber", 0.9),
    ("lyft", 0.9),
    ("taxi", 0.85),
    ("cab", 0.8),
    ("rideshare", 0.85),
    ("rental", 0.7),
    ("hertz", 0.9),
    ("avis", 0.9),
    ("enterprise", 0.9),
    ("parking", 0.8),
    ("toll", 0.8),
    ("mileage", 0.85),
    ("gas", 0.6),
];

pub const LODGING_KEYWORDS: &[(&str, f64)] = &[
    ("hotel", 0.95),
    ("motel", 0.9),
    ("accommodation", 0.9),
    ("lodging", 0.95),
    ("resort", 0.85),
    ("inn", 0.8),
    ("marriott", 0.95),
    ("hilton", 0.95),
    ("hyatt", 0.95),
    ("airbnb", 0.8),
    ("booking", 0.7),
];

pub const MEAL_KEYWORDS: &[(&str, f64)] = &[
    ("restaurant", 0.9),
    ("dinner", 0.85),
    ("lunch", 0.85),
    ("breakfast", 0.85),
    ("meal", 0.9),
    ("food", 0.7),
    ("cafe", 0.8),
    ("starbucks", 0.8),
    ("mcdonald", 0.8),
    ("subway", 0.8),
    ("client dinner", 0.95),
];

pub const OFFICE_SUPPLY_KEYWORDS: &[(&str, f64)] = &[
    ("office", 0.9),
    ("supplies", 0.85),
    ("stationery", 0.9),
    ("printer", 0.8),
    ("paper", 0.7),
    ("staples", 0.9),
    ("depot", 0.8),
    ("amazon", 0.4),
];

/// Scoring tables in tie-break priority order: with equal top scores, the
/// table declared first wins.
pub const CATEGORY_TABLES: &[(&str, &[(&str, f64)])] = &[
    (CATEGORY_TRANSPORTATION, TRANSPORTATION_KEYWORDS),
    (CATEGORY_LODGING, LODGING_KEYWORDS),
    (CATEGORY_MEALS, MEAL_KEYWORDS),
    (CATEGORY_OFFICE_SUPPLIES, OFFICE_SUPPLY_KEYWORDS),
];

/// Subcategory hint sets, checked in declaration order within a category.
pub const AIRFARE_HINTS: &[&str] = &["flight", "airline", "airfare"];
pub const RIDESHARE_HINTS: &[&str] = &["uber", "lyft", "taxi"];
pub const CAR_RENTAL_HINTS: &[&str] = &["rental"];
pub const MISC_TRANSPORT_HINTS: &[&str] = &["parking", "toll"];
pub const MEAL_TIME_HINTS: &[&str] = &["breakfast", "lunch", "dinner"];

/// Monetary thresholds from the travel and expense policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyLimits {
    /// Meal expenses above this are a policy violation (Section 3.2).
    pub meal_daily_limit: Decimal,
    /// Meal expenses above this require a receipt.
    pub meal_receipt_threshold: Decimal,
    /// Meal expenses above this warn unless the description mentions
    /// "business".
    pub meal_justification_threshold: Decimal,
    /// Lodging above this per night is a policy violation (Section 4.1).
    pub lodging_nightly_limit: Decimal,
    /// Ride-share expenses above this draw a review warning.
    pub rideshare_review_threshold: Decimal,
    /// Car rentals above this require the rental agreement and fuel
    /// receipts.
    pub car_rental_document_threshold: Decimal,
    /// Airfare above this warns and requires itinerary documents.
    pub airfare_review_threshold: Decimal,
    /// Any expense above this requires a receipt (Section 2.1).
    pub universal_receipt_threshold: Decimal,
    /// Meals above this categorize as a business meal.
    pub business_meal_threshold: Decimal,
}

impl Default for PolicyLimits {
    fn default() -> Self {
        Self {
            meal_daily_limit: Decimal::new(100, 0),
            meal_receipt_threshold: Decimal::new(25, 0),
            meal_justification_threshold: Decimal::new(50, 0),
            lodging_nightly_limit: Decimal::new(300, 0),
            rideshare_review_threshold: Decimal::new(75, 0),
            car_rental_document_threshold: Decimal::new(500, 0),
            airfare_review_threshold: Decimal::new(1000, 0),
            universal_receipt_threshold: Decimal::new(25, 0),
            business_meal_threshold: Decimal::new(75, 0),
        }
    }
}
