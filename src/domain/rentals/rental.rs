use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentType {
    Minute,
    Day,
}

impl RentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentType::Minute => "minute",
            RentType::Day => "day",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "minute" => Some(RentType::Minute),
            "day" => Some(RentType::Day),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentStatus {
    Active,
    Terminated,
}

impl RentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentStatus::Active => "active",
            RentStatus::Terminated => "terminated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(RentStatus::Active),
            "terminated" => Some(RentStatus::Terminated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rental {
    pub id: Uuid,
    pub rental_code: String,
    pub renter_id: Uuid,
    pub car_id: Uuid,
    pub rent_type: RentType,
    pub starting_date: DateTime<Utc>,
    pub ending_date: Option<DateTime<Utc>>,
    pub total_fee: Option<f64>,
    pub rent_status: RentStatus,
    pub payment_status: PaymentStatus,
    pub is_images_uploaded: bool,
    pub created_at: DateTime<Utc>,
}

impl Rental {
    pub fn is_active(&self) -> bool {
        self.rent_status == RentStatus::Active
    }

    /// Day rentals must be handed back before their ending date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match (self.rent_type, self.ending_date) {
            (RentType::Day, Some(end)) => now > end,
            _ => false,
        }
    }
}

/// Ending date and flat fee fixed when a rental starts.
pub fn opening_terms(
    rent_type: RentType,
    start: DateTime<Utc>,
    price_per_day: f64,
) -> (Option<DateTime<Utc>>, Option<f64>) {
    match rent_type {
        RentType::Day => (Some(start + Duration::days(1)), Some(price_per_day)),
        RentType::Minute => (None, None),
    }
}

/// Started minutes between two instants, never less than one.
pub fn billable_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let secs = (end - start).num_seconds().max(0);
    ((secs + 59) / 60).max(1)
}

pub fn minute_fee(minutes: i64, price_per_min: f64) -> f64 {
    round_cents(minutes as f64 * price_per_min)
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
