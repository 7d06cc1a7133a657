//! Query-string filter for the public car listing.
//!
//! Range fields accept either a single number (exact match) or `low-high`
//! (inclusive bounds). Equality fields are compared lowercased, the way cars
//! are stored. Unknown keys are ignored.

use std::collections::HashMap;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 100;
pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("{0} must be a number or a range like 10-20")]
    NotANumber(&'static str),
    #[error("the first value of {0} must not be greater than the second value")]
    InvertedRange(&'static str),
    #[error("unknown sort option {0}")]
    UnknownSort(String),
    #[error("page must not be greater than 1000000")]
    PageTooLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    HorsePower,
    PricePerMin,
    PricePerDay,
    FuelPrice,
    FuelLevel,
    Year,
}

impl RangeField {
    pub const ALL: [RangeField; 6] = [
        RangeField::HorsePower,
        RangeField::PricePerMin,
        RangeField::PricePerDay,
        RangeField::FuelPrice,
        RangeField::FuelLevel,
        RangeField::Year,
    ];

    pub fn query_key(&self) -> &'static str {
        match self {
            RangeField::HorsePower => "horsePower",
            RangeField::PricePerMin => "pricePerMin",
            RangeField::PricePerDay => "pricePerDay",
            RangeField::FuelPrice => "fuelPrice",
            RangeField::FuelLevel => "fuelLevel",
            RangeField::Year => "year",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            RangeField::HorsePower => "horse_power",
            RangeField::PricePerMin => "price_per_min",
            RangeField::PricePerDay => "price_per_day",
            RangeField::FuelPrice => "fuel_price",
            RangeField::FuelLevel => "fuel_level",
            RangeField::Year => "year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub gte: f64,
    pub lte: f64,
}

impl Bounds {
    pub fn contains(&self, v: f64) -> bool {
        v >= self.gte && v <= self.lte
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqField {
    Brand,
    Transmission,
    Model,
}

impl EqField {
    pub const ALL: [EqField; 3] = [EqField::Brand, EqField::Transmission, EqField::Model];

    pub fn query_key(&self) -> &'static str {
        match self {
            EqField::Brand => "brand",
            EqField::Transmission => "transmission",
            EqField::Model => "model",
        }
    }

    pub fn column(&self) -> &'static str {
        self.query_key()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PricePerMinAsc,
    PricePerMinDesc,
    PricePerDayAsc,
    PricePerDayDesc,
    MostRecent,
    HorsePowerAsc,
    HorsePowerDesc,
    FuelLevelAsc,
    FuelLevelDesc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "PRICEPM_BY_ASC" => SortOrder::PricePerMinAsc,
            "PRICEPM_BY_DESC" => SortOrder::PricePerMinDesc,
            "PRICEPD_BY_ASC" => SortOrder::PricePerDayAsc,
            "PRICEPD_BY_DESC" => SortOrder::PricePerDayDesc,
            "MOST_RECENT" => SortOrder::MostRecent,
            "HORSEPOWER_BY_ASC" => SortOrder::HorsePowerAsc,
            "HORSEPOWER_BY_DESC" => SortOrder::HorsePowerDesc,
            "FUELLEVEL_BY_ASC" => SortOrder::FuelLevelAsc,
            "FUELLEVEL_BY_DESC" => SortOrder::FuelLevelDesc,
            _ => return None,
        })
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortOrder::PricePerMinAsc | SortOrder::PricePerMinDesc => "price_per_min",
            SortOrder::PricePerDayAsc | SortOrder::PricePerDayDesc => "price_per_day",
            SortOrder::MostRecent => "created_at",
            SortOrder::HorsePowerAsc | SortOrder::HorsePowerDesc => "horse_power",
            SortOrder::FuelLevelAsc | SortOrder::FuelLevelDesc => "fuel_level",
        }
    }

    pub fn descending(&self) -> bool {
        matches!(
            self,
            SortOrder::PricePerMinDesc
                | SortOrder::PricePerDayDesc
                | SortOrder::MostRecent
                | SortOrder::HorsePowerDesc
                | SortOrder::FuelLevelDesc
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CarFilter {
    pub ranges: Vec<(RangeField, Bounds)>,
    pub equals: Vec<(EqField, String)>,
    pub sort: Option<SortOrder>,
    pub page: PageRequest,
}

impl CarFilter {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, FilterError> {
        let mut filter = CarFilter::default();

        for field in RangeField::ALL {
            if let Some(raw) = query.get(field.query_key()) {
                filter.ranges.push((field, parse_bounds(field, raw)?));
            }
        }

        for field in EqField::ALL {
            if let Some(raw) = query.get(field.query_key()) {
                let v = raw.trim();
                if !v.is_empty() {
                    filter.equals.push((field, v.to_lowercase()));
                }
            }
        }

        if let Some(raw) = query
            .get("sort")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            let sort = SortOrder::parse(raw).ok_or_else(|| FilterError::UnknownSort(raw.into()))?;
            filter.sort = Some(sort);
        }

        let page = positive_or(query.get("page"), DEFAULT_PAGE);
        if page > MAX_PAGE {
            return Err(FilterError::PageTooLarge);
        }
        filter.page = PageRequest {
            page,
            limit: positive_or(query.get("limit"), DEFAULT_LIMIT).min(MAX_LIMIT),
        };
        Ok(filter)
    }
}

fn positive_or(raw: Option<&String>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn parse_bounds(field: RangeField, raw: &str) -> Result<Bounds, FilterError> {
    let num = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(FilterError::NotANumber(field.query_key()))
    };
    match raw.split_once('-') {
        None => {
            let v = num(raw)?;
            Ok(Bounds { gte: v, lte: v })
        }
        Some((low, high)) => {
            let (gte, lte) = (num(low)?, num(high)?);
            if gte > lte {
                return Err(FilterError::InvertedRange(field.query_key()));
            }
            Ok(Bounds { gte, lte })
        }
    }
}

/// Page metadata returned next to the listing documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub skip: i64,
    pub page: i64,
    pub total_length: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<i64>,
    pub prev_page: i64,
}

impl Pagination {
    pub fn compute(req: PageRequest, total_length: i64) -> Self {
        let PageRequest { page, limit } = req;
        let total_pages = total_length.saturating_add(limit - 1) / limit;
        let has_next_page = total_pages > page;
        Self {
            limit,
            skip: req.skip(),
            page,
            total_length,
            total_pages,
            current_page: page,
            has_next_page,
            has_prev_page: page > 1,
            next_page: has_next_page.then(|| page.saturating_add(1)),
            prev_page: if page == 1 { 1 } else { page - 1 },
        }
    }
}
