use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinType {
    Mobile,
    Connect,
}

impl CheckinType {
    pub const ALL: [CheckinType; 2] = [CheckinType::Mobile, CheckinType::Connect];

    pub fn label(&self) -> &'static str {
        match self {
            CheckinType::Mobile => "mobile",
            CheckinType::Connect => "connect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalState {
    Ended,
    Canceled,
}

impl RentalState {
    pub const ALL: [RentalState; 2] = [RentalState::Ended, RentalState::Canceled];

    pub fn label(&self) -> &'static str {
        match self {
            RentalState::Ended => "ended",
            RentalState::Canceled => "canceled",
        }
    }
}

/// One rental event, as it appears in the delay analysis table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RentalRecord {
    pub rental_id: String,
    pub car_id: String,
    pub checkin_type: CheckinType,
    pub state: RentalState,
    /// Negative means the car came back early.
    pub delay_at_checkout_in_minutes: Option<f64>,
    #[serde(default)]
    pub previous_ended_rental_id: Option<String>,
    /// Gap between the previous rental's scheduled checkout and this rental's
    /// scheduled check-in, for the same car.
    pub time_delta_with_previous_rental_in_minutes: Option<f64>,
}

impl RentalRecord {
    /// `time_delta - delay`; negative when the previous driver's actual
    /// checkout overran this rental's scheduled check-in.
    pub fn delta_minus_late_checkout(&self) -> Option<f64> {
        match (
            self.time_delta_with_previous_rental_in_minutes,
            self.delay_at_checkout_in_minutes,
        ) {
            (Some(delta), Some(delay)) => Some(delta - delay),
            _ => None,
        }
    }

    pub fn is_connect(&self) -> bool {
        self.checkin_type == CheckinType::Connect
    }
}

/// One car of the pricing table. Only the price column is consumed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PricingRecord {
    pub rental_price_per_day: f64,
}

/// Checkout delay bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DelayCategory {
    EarlyOrInTime,
    UnderOneHour,
    OneToTwoHours,
    TwoToThreeHours,
    ThreeToSixHours,
    SixToTwelveHours,
    TwelveToTwentyFourHours,
    OneDayOrMore,
    Unknown,
}

/// Coarse grouping of delay buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lateness {
    OnTime,
    Late,
    Unknown,
}

impl Lateness {
    pub const ALL: [Lateness; 3] = [Lateness::OnTime, Lateness::Late, Lateness::Unknown];

    pub fn label(&self) -> &'static str {
        match self {
            Lateness::OnTime => "Early or in time",
            Lateness::Late => "Late",
            Lateness::Unknown => "Unknown",
        }
    }
}

impl DelayCategory {
    /// Display order of the chart axis.
    pub const ORDERED: [DelayCategory; 9] = [
        DelayCategory::EarlyOrInTime,
        DelayCategory::UnderOneHour,
        DelayCategory::OneToTwoHours,
        DelayCategory::TwoToThreeHours,
        DelayCategory::ThreeToSixHours,
        DelayCategory::SixToTwelveHours,
        DelayCategory::TwelveToTwentyFourHours,
        DelayCategory::OneDayOrMore,
        DelayCategory::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DelayCategory::EarlyOrInTime => "Early or in time",
            DelayCategory::UnderOneHour => "< 1 hour",
            DelayCategory::OneToTwoHours => "1 to 2 hours",
            DelayCategory::TwoToThreeHours => "2 to 3 hours",
            DelayCategory::ThreeToSixHours => "3 to 6 hours",
            DelayCategory::SixToTwelveHours => "6 to 12 hours",
            DelayCategory::TwelveToTwentyFourHours => "12 to 24 hours",
            DelayCategory::OneDayOrMore => "1 day or more",
            DelayCategory::Unknown => "Unknown",
        }
    }

    pub fn lateness(&self) -> Lateness {
        match self {
            DelayCategory::EarlyOrInTime => Lateness::OnTime,
            DelayCategory::Unknown => Lateness::Unknown,
            _ => Lateness::Late,
        }
    }
}

/// First matching bound wins; each upper bound is exclusive except the
/// on-time bucket, which includes 0.
pub fn categorize_delay(delay: Option<f64>) -> DelayCategory {
    let Some(d) = delay else {
        return DelayCategory::Unknown;
    };
    if d.is_nan() {
        DelayCategory::Unknown
    } else if d <= 0.0 {
        DelayCategory::EarlyOrInTime
    } else if d < 60.0 {
        DelayCategory::UnderOneHour
    } else if d < 120.0 {
        DelayCategory::OneToTwoHours
    } else if d < 180.0 {
        DelayCategory::TwoToThreeHours
    } else if d < 360.0 {
        DelayCategory::ThreeToSixHours
    } else if d < 720.0 {
        DelayCategory::SixToTwelveHours
    } else if d < 1440.0 {
        DelayCategory::TwelveToTwentyFourHours
    } else {
        DelayCategory::OneDayOrMore
    }
}
