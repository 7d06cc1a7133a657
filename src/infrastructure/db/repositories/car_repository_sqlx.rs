use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::application::ports::car_repository::{CarChanges, CarPage, CarRepository, NewCar};
use crate::domain::cars::Car;
use crate::domain::cars::filter::CarFilter;
use crate::infrastructure::db::{PgPool, map_db_error};

const CAR_COLUMNS: &str = r#"id, car_code, car_owner_id, brand, model, model_detail, year,
    plate_number, color, horse_power, transmission, fuel_level, latitude, longitude,
    price_per_day, price_per_min, fuel_price, is_rentable, is_publish, is_deleted,
    deleted_at, created_at, updated_at"#;

pub struct SqlxCarRepository {
    pub pool: PgPool,
}

impl SqlxCarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn images_for(&self, car_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, Vec<String>>> {
        if car_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            r#"SELECT car_id, url FROM car_images WHERE car_id = ANY($1)
               ORDER BY car_id, position, created_at"#,
        )
        .bind(car_ids)
        .fetch_all(&self.pool)
        .await?;
        let mut out: HashMap<Uuid, Vec<String>> = HashMap::new();
        for r in rows {
            out.entry(r.get("car_id")).or_default().push(r.get("url"));
        }
        Ok(out)
    }

    async fn with_images(&self, row: Option<PgRow>) -> anyhow::Result<Option<Car>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let mut car = car_from_row(&row);
        car.images = self
            .images_for(&[car.id])
            .await?
            .remove(&car.id)
            .unwrap_or_default();
        Ok(Some(car))
    }
}

fn car_from_row(r: &PgRow) -> Car {
    Car {
        id: r.get("id"),
        car_code: r.get("car_code"),
        car_owner_id: r.get("car_owner_id"),
        brand: r.get("brand"),
        model: r.get("model"),
        model_detail: r.get("model_detail"),
        year: r.get("year"),
        plate_number: r.get("plate_number"),
        color: r.get("color"),
        horse_power: r.get("horse_power"),
        transmission: r.get("transmission"),
        fuel_level: r.get("fuel_level"),
        latitude: r.get("latitude"),
        longitude: r.get("longitude"),
        price_per_day: r.get("price_per_day"),
        price_per_min: r.get("price_per_min"),
        fuel_price: r.get("fuel_price"),
        is_rentable: r.get("is_rentable"),
        is_publish: r.get("is_publish"),
        is_deleted: r.get("is_deleted"),
        deleted_at: r.get("deleted_at"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        images: Vec::new(),
    }
}

/// Appends the WHERE clause shared by the listing and its count.
fn push_listing_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CarFilter) {
    qb.push(" WHERE is_rentable = TRUE AND is_deleted = FALSE");
    for (field, bounds) in &filter.ranges {
        // Integer and float columns compare fine against a float8 bind.
        qb.push(format!(" AND {}::float8 BETWEEN ", field.column()))
            .push_bind(bounds.gte)
            .push(" AND ")
            .push_bind(bounds.lte);
    }
    for (field, value) in &filter.equals {
        qb.push(format!(" AND {} = ", field.column()))
            .push_bind(value.clone());
    }
}

async fn insert_images<'e, E>(
    executor: E,
    car_id: Uuid,
    urls: &[String],
    first: i32,
) -> anyhow::Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    if urls.is_empty() {
        return Ok(());
    }
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO car_images (car_id, url, position) ");
    qb.push_values(urls.iter().enumerate(), |mut b, (i, url)| {
        b.push_bind(car_id)
            .push_bind(url.clone())
            .push_bind(first + i as i32);
    });
    qb.build().execute(executor).await?;
    Ok(())
}

#[async_trait]
impl CarRepository for SqlxCarRepository {
    async fn create(&self, new: &NewCar) -> anyhow::Result<Car> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            r#"INSERT INTO cars (car_code, car_owner_id, brand, model, model_detail, year, plate_number,
                   color, horse_power, transmission, fuel_level, latitude, longitude,
                   price_per_day, price_per_min, fuel_price)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
               RETURNING {CAR_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&new.car_code)
            .bind(new.car_owner_id)
            .bind(&new.brand)
            .bind(&new.model)
            .bind(&new.model_detail)
            .bind(new.year)
            .bind(&new.plate_number)
            .bind(&new.color)
            .bind(new.horse_power)
            .bind(&new.transmission)
            .bind(new.fuel_level)
            .bind(new.latitude)
            .bind(new.longitude)
            .bind(new.price_per_day)
            .bind(new.price_per_min)
            .bind(new.fuel_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;
        let mut car = car_from_row(&row);
        insert_images(&mut *tx, car.id, &new.images, 0).await?;
        tx.commit().await?;
        car.images = new.images.clone();
        Ok(car)
    }

    async fn find_by_code(&self, car_code: &str) -> anyhow::Result<Option<Car>> {
        let sql = format!("SELECT {CAR_COLUMNS} FROM cars WHERE car_code = $1");
        let row = sqlx::query(&sql)
            .bind(car_code)
            .fetch_optional(&self.pool)
            .await?;
        self.with_images(row).await
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Car>> {
        let sql = format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_images(row).await
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE cars SET is_deleted = TRUE, deleted_at = $2, is_publish = FALSE, updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, ch: &CarChanges) -> anyhow::Result<Car> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE cars SET updated_at = now()");
        macro_rules! set {
            ($col:literal, $val:expr) => {
                if let Some(v) = $val {
                    qb.push(concat!(", ", $col, " = ")).push_bind(v);
                }
            };
        }
        set!("brand", ch.brand.clone());
        set!("model", ch.model.clone());
        set!("model_detail", ch.model_detail.clone());
        set!("year", ch.year);
        set!("plate_number", ch.plate_number.clone());
        set!("color", ch.color.clone());
        set!("horse_power", ch.horse_power);
        set!("transmission", ch.transmission.clone());
        set!("fuel_level", ch.fuel_level);
        set!("latitude", ch.latitude);
        set!("longitude", ch.longitude);
        set!("price_per_day", ch.price_per_day);
        set!("price_per_min", ch.price_per_min);
        set!("fuel_price", ch.fuel_price);
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {CAR_COLUMNS}"));
        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        self.with_images(row)
            .await?
            .ok_or_else(|| anyhow::anyhow!("car {id} vanished during update"))
    }

    async fn add_images(&self, car_id: Uuid, urls: &[String]) -> anyhow::Result<()> {
        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM car_images WHERE car_id = $1",
        )
        .bind(car_id)
        .fetch_one(&self.pool)
        .await?;
        insert_images(&self.pool, car_id, urls, next).await
    }

    async fn replace_images(&self, car_id: Uuid, urls: &[String]) -> anyhow::Result<Vec<String>> {
        let mut tx = self.pool.begin().await?;
        let removed: Vec<String> =
            sqlx::query_scalar("DELETE FROM car_images WHERE car_id = $1 RETURNING url")
                .bind(car_id)
                .fetch_all(&mut *tx)
                .await?;
        insert_images(&mut *tx, car_id, urls, 0).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn list_rentable(&self, filter: &CarFilter) -> anyhow::Result<CarPage> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM cars");
        push_listing_filter(&mut count, filter);
        let total_length: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {CAR_COLUMNS} FROM cars"));
        push_listing_filter(&mut qb, filter);
        match filter.sort {
            Some(sort) => {
                let dir = if sort.descending() { "DESC" } else { "ASC" };
                qb.push(format!(" ORDER BY {} {dir}, id", sort.column()));
            }
            None => {
                qb.push(" ORDER BY created_at ASC, id");
            }
        }
        qb.push(" LIMIT ")
            .push_bind(filter.page.limit)
            .push(" OFFSET ")
            .push_bind(filter.page.skip());
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut cars: Vec<Car> = rows.iter().map(car_from_row).collect();
        let ids: Vec<Uuid> = cars.iter().map(|c| c.id).collect();
        let mut images = self.images_for(&ids).await?;
        for car in &mut cars {
            car.images = images.remove(&car.id).unwrap_or_default();
        }
        Ok(CarPage { total_length, cars })
    }
}
