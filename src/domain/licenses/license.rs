use chrono::{DateTime, Months, NaiveDate, Utc};
use uuid::Uuid;

/// Minimum time between a license's issue date and the first rental.
pub const MIN_LICENSE_AGE_MONTHS: u32 = 12;

#[derive(Debug, Clone)]
pub struct DriverLicense {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub born_date: NaiveDate,
    pub born_place: String,
    pub drivers_license_date: NaiveDate,
    pub licence_validity_period: NaiveDate,
    pub identity_number: String,
    pub blood_group: String,
    pub front_side_image: String,
    pub back_side_image: String,
    pub created_at: DateTime<Utc>,
}

impl DriverLicense {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.licence_validity_period < today
    }
}

/// A license issued on `issued` is seasoned once a full year has passed.
pub fn is_seasoned(issued: NaiveDate, today: NaiveDate) -> bool {
    match today.checked_sub_months(Months::new(MIN_LICENSE_AGE_MONTHS)) {
        Some(cutoff) => issued <= cutoff,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn seasoned_after_exactly_one_year() {
        assert!(is_seasoned(d(2023, 3, 10), d(2024, 3, 10)));
        assert!(!is_seasoned(d(2023, 3, 11), d(2024, 3, 10)));
    }

    #[test]
    fn leap_day_issue_date() {
        assert!(is_seasoned(d(2024, 2, 29), d(2025, 3, 1)));
        assert!(!is_seasoned(d(2024, 2, 29), d(2025, 2, 27)));
    }
}
