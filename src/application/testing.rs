//! In-memory fakes of every port, shared by use-case and router tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::application::errors::ConstraintViolation;
use crate::application::ports::account_repository::{AccountRepository, NewAccount};
use crate::application::ports::car_repository::{CarChanges, CarPage, CarRepository, NewCar};
use crate::application::ports::driver_license_repository::{
    DriverLicenseRepository, NewDriverLicense,
};
use crate::application::ports::image_cdn::{ImageCdn, ImageUpload};
use crate::application::ports::mailer::{Mailer, OutgoingEmail};
use crate::application::ports::ocr_engine::OcrEngine;
use crate::application::ports::rental_repository::{NewRental, RentalRepository, Termination};
use crate::application::ports::request_log_repository::{RequestLogEntry, RequestLogRepository};
use crate::domain::accounts::{Account, Role};
use crate::domain::cars::Car;
use crate::domain::cars::filter::{CarFilter, EqField, Pagination, RangeField};
use crate::domain::licenses::DriverLicense;
use crate::domain::rentals::{PaymentStatus, RentStatus, Rental};

pub use crate::infrastructure::cache::memory_token_store::MemoryTokenStore;

#[derive(Default)]
struct DbState {
    accounts: Vec<Account>,
    cars: Vec<Car>,
    licenses: Vec<DriverLicense>,
    rentals: Vec<Rental>,
}

/// One shared store backing every repository port.
#[derive(Default)]
pub struct MemoryDb {
    state: Mutex<DbState>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut DbState) -> T) -> T {
        let mut guard = self.state.lock().unwrap();
        f(&mut guard)
    }

    pub fn insert_account(&self, account: Account) {
        self.with(|s| s.accounts.push(account));
    }

    pub fn insert_car(&self, car: Car) {
        self.with(|s| s.cars.push(car));
    }

    pub fn insert_license(&self, license: DriverLicense) {
        self.with(|s| s.licenses.push(license));
    }

    pub fn insert_rental(&self, rental: Rental) {
        self.with(|s| s.rentals.push(rental));
    }

    pub fn account(&self, id: Uuid) -> Option<Account> {
        self.with(|s| s.accounts.iter().find(|a| a.id == id).cloned())
    }

    pub fn account_by_email(&self, email: &str) -> Option<Account> {
        self.with(|s| s.accounts.iter().find(|a| a.email == email).cloned())
    }

    pub fn car(&self, id: Uuid) -> Option<Car> {
        self.with(|s| s.cars.iter().find(|c| c.id == id).cloned())
    }

    pub fn rental(&self, code: &str) -> Option<Rental> {
        self.with(|s| s.rentals.iter().find(|r| r.rental_code == code).cloned())
    }

    pub fn rentals(&self) -> Vec<Rental> {
        self.with(|s| s.rentals.clone())
    }

    pub fn update_rental(&self, code: &str, f: impl FnOnce(&mut Rental)) {
        self.with(|s| {
            if let Some(r) = s.rentals.iter_mut().find(|r| r.rental_code == code) {
                f(r);
            }
        });
    }
}

pub fn sample_license(renter_id: Uuid, issued: NaiveDate, valid_until: NaiveDate) -> DriverLicense {
    DriverLicense {
        id: Uuid::new_v4(),
        renter_id,
        first_name: "ada".into(),
        last_name: "yilmaz".into(),
        born_date: NaiveDate::from_ymd_opt(1990, 2, 1).unwrap(),
        born_place: "istanbul".into(),
        drivers_license_date: issued,
        licence_validity_period: valid_until,
        identity_number: "12345678901".into(),
        blood_group: "0 rh+".into(),
        front_side_image: "https://cdn.test/front".into(),
        back_side_image: "https://cdn.test/back".into(),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl AccountRepository for MemoryDb {
    async fn create(&self, new: &NewAccount) -> anyhow::Result<Account> {
        self.with(|s| {
            if s.accounts
                .iter()
                .any(|a| a.role == new.role && a.email == new.email)
            {
                return Err(ConstraintViolation::Unique("email".into()).into());
            }
            let now = Utc::now();
            let account = Account {
                id: Uuid::new_v4(),
                account_code: new.account_code.clone(),
                role: new.role,
                first_name: new.first_name.clone(),
                last_name: new.last_name.clone(),
                full_name: new.full_name.clone(),
                phone: new.phone.clone(),
                email: new.email.clone(),
                password_hash: new.password_hash.clone(),
                is_account_active: true,
                is_account_approved: false,
                is_account_blocked: false,
                is_account_deleted: false,
                is_2fa_enabled: false,
                account_approved_at: None,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            };
            s.accounts.push(account.clone());
            Ok(account)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        Ok(self.account(id))
    }

    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Account>> {
        Ok(self.with(|s| s.accounts.iter().find(|a| a.account_code == code).cloned()))
    }

    async fn find_by_email(&self, role: Role, email: &str) -> anyhow::Result<Option<Account>> {
        Ok(self.with(|s| {
            s.accounts
                .iter()
                .find(|a| a.role == role && a.email == email)
                .cloned()
        }))
    }

    async fn approve(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<bool> {
        Ok(self.with(|s| {
            match s
                .accounts
                .iter_mut()
                .find(|a| a.id == id && !a.is_account_approved)
            {
                Some(a) => {
                    a.is_account_approved = true;
                    a.account_approved_at = Some(at);
                    true
                }
                None => false,
            }
        }))
    }

    async fn set_two_factor(&self, id: Uuid, enabled: bool) -> anyhow::Result<Account> {
        self.with(|s| {
            let a = s
                .accounts
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| anyhow::anyhow!("account missing"))?;
            a.is_2fa_enabled = enabled;
            Ok(a.clone())
        })
    }

    async fn update_password(&self, id: Uuid, hash: &str) -> anyhow::Result<()> {
        self.with(|s| {
            if let Some(a) = s.accounts.iter_mut().find(|a| a.id == id) {
                a.password_hash = hash.to_string();
                a.updated_at = Utc::now();
            }
        });
        Ok(())
    }
}

fn range_value(car: &Car, field: RangeField) -> f64 {
    match field {
        RangeField::HorsePower => car.horse_power as f64,
        RangeField::PricePerMin => car.price_per_min,
        RangeField::PricePerDay => car.price_per_day,
        RangeField::FuelPrice => car.fuel_price,
        RangeField::FuelLevel => car.fuel_level as f64,
        RangeField::Year => car.year as f64,
    }
}

fn eq_value(car: &Car, field: EqField) -> &str {
    match field {
        EqField::Brand => &car.brand,
        EqField::Transmission => &car.transmission,
        EqField::Model => &car.model,
    }
}

fn sort_value(car: &Car, column: &str) -> f64 {
    match column {
        "price_per_min" => car.price_per_min,
        "price_per_day" => car.price_per_day,
        "horse_power" => car.horse_power as f64,
        "fuel_level" => car.fuel_level as f64,
        _ => car.created_at.timestamp_millis() as f64,
    }
}

#[async_trait]
impl CarRepository for MemoryDb {
    async fn create(&self, new: &NewCar) -> anyhow::Result<Car> {
        self.with(|s| {
            if s.cars.iter().any(|c| c.plate_number == new.plate_number) {
                return Err(ConstraintViolation::Unique("plateNumber".into()).into());
            }
            let now = Utc::now();
            let car = Car {
                id: Uuid::new_v4(),
                car_code: new.car_code.clone(),
                car_owner_id: new.car_owner_id,
                brand: new.brand.clone(),
                model: new.model.clone(),
                model_detail: new.model_detail.clone(),
                year: new.year,
                plate_number: new.plate_number.clone(),
                color: new.color.clone(),
                horse_power: new.horse_power,
                transmission: new.transmission.clone(),
                fuel_level: new.fuel_level,
                latitude: new.latitude,
                longitude: new.longitude,
                price_per_day: new.price_per_day,
                price_per_min: new.price_per_min,
                fuel_price: new.fuel_price,
                is_rentable: true,
                is_publish: true,
                is_deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
                images: new.images.clone(),
            };
            s.cars.push(car.clone());
            Ok(car)
        })
    }

    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Car>> {
        Ok(self.with(|s| s.cars.iter().find(|c| c.car_code == code).cloned()))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Car>> {
        Ok(self.car(id))
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
        self.with(|s| {
            if let Some(c) = s.cars.iter_mut().find(|c| c.id == id) {
                c.is_deleted = true;
                c.deleted_at = Some(at);
                c.is_publish = false;
            }
        });
        Ok(())
    }

    async fn update(&self, id: Uuid, ch: &CarChanges) -> anyhow::Result<Car> {
        self.with(|s| {
            let c = s
                .cars
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| anyhow::anyhow!("car missing"))?;
            if let Some(v) = &ch.brand {
                c.brand = v.clone();
            }
            if let Some(v) = &ch.model {
                c.model = v.clone();
            }
            if let Some(v) = &ch.model_detail {
                c.model_detail = v.clone();
            }
            if let Some(v) = ch.year {
                c.year = v;
            }
            if let Some(v) = &ch.plate_number {
                c.plate_number = v.clone();
            }
            if let Some(v) = &ch.color {
                c.color = v.clone();
            }
            if let Some(v) = ch.horse_power {
                c.horse_power = v;
            }
            if let Some(v) = &ch.transmission {
                c.transmission = v.clone();
            }
            if let Some(v) = ch.fuel_level {
                c.fuel_level = v;
            }
            if let Some(v) = ch.latitude {
                c.latitude = v;
            }
            if let Some(v) = ch.longitude {
                c.longitude = v;
            }
            if let Some(v) = ch.price_per_day {
                c.price_per_day = v;
            }
            if let Some(v) = ch.price_per_min {
                c.price_per_min = v;
            }
            if let Some(v) = ch.fuel_price {
                c.fuel_price = v;
            }
            c.updated_at = Utc::now();
            Ok(c.clone())
        })
    }

    async fn add_images(&self, car_id: Uuid, urls: &[String]) -> anyhow::Result<()> {
        self.with(|s| {
            if let Some(c) = s.cars.iter_mut().find(|c| c.id == car_id) {
                c.images.extend(urls.iter().cloned());
            }
        });
        Ok(())
    }

    async fn replace_images(&self, car_id: Uuid, urls: &[String]) -> anyhow::Result<Vec<String>> {
        Ok(self.with(|s| match s.cars.iter_mut().find(|c| c.id == car_id) {
            Some(c) => std::mem::replace(&mut c.images, urls.to_vec()),
            None => vec![],
        }))
    }

    async fn list_rentable(&self, filter: &CarFilter) -> anyhow::Result<CarPage> {
        let mut cars: Vec<Car> = self.with(|s| {
            s.cars
                .iter()
                .filter(|c| c.is_rentable && !c.is_deleted)
                .filter(|c| {
                    filter
                        .ranges
                        .iter()
                        .all(|(f, b)| b.contains(range_value(c, *f)))
                })
                .filter(|c| filter.equals.iter().all(|(f, v)| eq_value(c, *f) == v))
                .cloned()
                .collect()
        });
        if let Some(sort) = filter.sort {
            cars.sort_by(|a, b| {
                let ord = sort_value(a, sort.column())
                    .partial_cmp(&sort_value(b, sort.column()))
                    .unwrap_or(Ordering::Equal);
                if sort.descending() { ord.reverse() } else { ord }
            });
        }
        let total_length = cars.len() as i64;
        let page = Pagination::compute(filter.page, total_length);
        let cars = cars
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect();
        Ok(CarPage { total_length, cars })
    }
}

#[async_trait]
impl DriverLicenseRepository for MemoryDb {
    async fn create(&self, new: &NewDriverLicense) -> anyhow::Result<DriverLicense> {
        self.with(|s| {
            if s.licenses.iter().any(|l| l.renter_id == new.renter_id) {
                return Err(ConstraintViolation::Unique("driverLicense".into()).into());
            }
            let license = DriverLicense {
                id: Uuid::new_v4(),
                renter_id: new.renter_id,
                first_name: new.first_name.clone(),
                last_name: new.last_name.clone(),
                born_date: new.born_date,
                born_place: new.born_place.clone(),
                drivers_license_date: new.drivers_license_date,
                licence_validity_period: new.licence_validity_period,
                identity_number: new.identity_number.clone(),
                blood_group: new.blood_group.clone(),
                front_side_image: new.front_side_image.clone(),
                back_side_image: new.back_side_image.clone(),
                created_at: Utc::now(),
            };
            s.licenses.push(license.clone());
            Ok(license)
        })
    }

    async fn find_by_renter(&self, renter_id: Uuid) -> anyhow::Result<Option<DriverLicense>> {
        Ok(self.with(|s| s.licenses.iter().find(|l| l.renter_id == renter_id).cloned()))
    }

    async fn delete_by_renter(&self, renter_id: Uuid) -> anyhow::Result<bool> {
        Ok(self.with(|s| {
            let before = s.licenses.len();
            s.licenses.retain(|l| l.renter_id != renter_id);
            s.licenses.len() != before
        }))
    }
}

#[async_trait]
impl RentalRepository for MemoryDb {
    async fn start(&self, new: &NewRental) -> anyhow::Result<Option<Rental>> {
        self.with(|s| {
            if s
                .rentals
                .iter()
                .any(|r| r.renter_id == new.renter_id && r.rent_status == RentStatus::Active)
            {
                return Err(ConstraintViolation::Unique("activeRental".into()).into());
            }
            let Some(car) = s
                .cars
                .iter_mut()
                .find(|c| c.id == new.car_id && c.is_rentable && !c.is_deleted)
            else {
                return Ok(None);
            };
            car.is_rentable = false;
            let rental = Rental {
                id: Uuid::new_v4(),
                rental_code: new.rental_code.clone(),
                renter_id: new.renter_id,
                car_id: new.car_id,
                rent_type: new.rent_type,
                starting_date: new.starting_date,
                ending_date: new.ending_date,
                total_fee: new.total_fee,
                rent_status: RentStatus::Active,
                payment_status: PaymentStatus::Pending,
                is_images_uploaded: false,
                created_at: new.starting_date,
            };
            s.rentals.push(rental.clone());
            Ok(Some(rental))
        })
    }

    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Rental>> {
        Ok(self.rental(code))
    }

    async fn find_active_by_renter(&self, renter_id: Uuid) -> anyhow::Result<Option<Rental>> {
        Ok(self.with(|s| {
            s.rentals
                .iter()
                .find(|r| r.renter_id == renter_id && r.rent_status == RentStatus::Active)
                .cloned()
        }))
    }

    async fn mark_images_uploaded(&self, id: Uuid) -> anyhow::Result<()> {
        self.with(|s| {
            if let Some(r) = s.rentals.iter_mut().find(|r| r.id == id) {
                r.is_images_uploaded = true;
            }
        });
        Ok(())
    }

    async fn terminate(&self, t: &Termination) -> anyhow::Result<Rental> {
        self.with(|s| {
            if let Some(c) = s.cars.iter_mut().find(|c| c.id == t.car_id) {
                c.is_rentable = true;
                c.latitude = t.latitude;
                c.longitude = t.longitude;
                c.fuel_level = t.fuel_level;
            }
            let r = s
                .rentals
                .iter_mut()
                .find(|r| r.id == t.rental_id)
                .ok_or_else(|| anyhow::anyhow!("rental missing"))?;
            r.rent_status = RentStatus::Terminated;
            r.payment_status = PaymentStatus::Paid;
            r.ending_date = Some(t.ending_date);
            r.total_fee = t.total_fee;
            Ok(r.clone())
        })
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<OutgoingEmail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("smtp unavailable");
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCdn {
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeCdn {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageCdn for FakeCdn {
    async fn upload(
        &self,
        folder: &str,
        public_id: &str,
        _image: &ImageUpload,
    ) -> anyhow::Result<String> {
        let url = format!("https://cdn.test/{folder}/{public_id}");
        self.uploaded.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Returns canned text keyed by upload file name.
#[derive(Default)]
pub struct FakeOcr {
    pub texts: HashMap<String, String>,
}

impl FakeOcr {
    pub fn with(mut self, file_name: &str, text: &str) -> Self {
        self.texts.insert(file_name.into(), text.into());
        self
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn recognize(&self, image: &ImageUpload) -> anyhow::Result<String> {
        self.texts
            .get(&image.file_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no text for {}", image.file_name))
    }
}

#[derive(Default)]
pub struct RecordingRequestLog {
    entries: Mutex<Vec<RequestLogEntry>>,
}

impl RecordingRequestLog {
    pub fn entries(&self) -> Vec<RequestLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestLogRepository for RecordingRequestLog {
    async fn insert(&self, entry: &RequestLogEntry) -> anyhow::Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

pub fn image(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.into(),
        content_type: Some("image/jpeg".into()),
        bytes: vec![0xff, 0xd8, 0xff],
    }
}
