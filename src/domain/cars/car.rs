use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const MAX_CAR_IMAGES: usize = 5;
pub const MIN_HORSE_POWER: i32 = 50;

#[derive(Debug, Clone)]
pub struct Car {
    pub id: Uuid,
    pub car_code: String,
    pub car_owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub model_detail: String,
    pub year: i32,
    pub plate_number: String,
    pub color: String,
    pub horse_power: i32,
    pub transmission: String,
    pub fuel_level: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_day: f64,
    pub price_per_min: f64,
    pub fuel_price: f64,
    pub is_rentable: bool,
    pub is_publish: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<String>,
}

impl Car {
    pub fn is_owned_by(&self, owner_id: Uuid) -> bool {
        self.car_owner_id == owner_id
    }

    pub fn image_capacity_left(&self) -> usize {
        MAX_CAR_IMAGES.saturating_sub(self.images.len())
    }
}

/// Multipart field names accepted for car photos. Each side may be sent once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CarImageSide {
    FrontSide,
    BackSide,
    RightSide,
    LeftSide,
    Inside,
}

impl CarImageSide {
    pub const ALL: [CarImageSide; 5] = [
        CarImageSide::FrontSide,
        CarImageSide::BackSide,
        CarImageSide::RightSide,
        CarImageSide::LeftSide,
        CarImageSide::Inside,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            CarImageSide::FrontSide => "frontSide",
            CarImageSide::BackSide => "backSide",
            CarImageSide::RightSide => "rightSide",
            CarImageSide::LeftSide => "leftSide",
            CarImageSide::Inside => "inside",
        }
    }

    pub fn from_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.field_name() == name)
    }
}

#[cfg(test)]
pub(crate) fn sample_car(owner_id: Uuid) -> Car {
    let now = Utc::now();
    Car {
        id: Uuid::new_v4(),
        car_code: "100000000000000000000001".into(),
        car_owner_id: owner_id,
        brand: "renault".into(),
        model: "clio".into(),
        model_detail: "1.5 dci".into(),
        year: 2019,
        plate_number: "34ABC123".into(),
        color: "white".into(),
        horse_power: 90,
        transmission: "manual".into(),
        fuel_level: 80,
        latitude: 41.01,
        longitude: 28.97,
        price_per_day: 1200.0,
        price_per_min: 3.5,
        fuel_price: 40.0,
        is_rentable: true,
        is_publish: true,
        is_deleted: false,
        deleted_at: None,
        created_at: now,
        updated_at: now,
        images: vec![],
    }
}
