use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::rental_repository::{NewRental, RentalRepository, Termination};
use crate::domain::rentals::{PaymentStatus, RentStatus, RentType, Rental};
use crate::infrastructure::db::{PgPool, map_db_error};

const RENTAL_COLUMNS: &str = r#"id, rental_code, renter_id, car_id, rent_type, starting_date,
    ending_date, total_fee, rent_status, payment_status, is_images_uploaded, created_at"#;

pub struct SqlxRentalRepository {
    pub pool: PgPool,
}

impl SqlxRentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn rental_from_row(r: &PgRow) -> anyhow::Result<Rental> {
    let rent_type: String = r.get("rent_type");
    let rent_status: String = r.get("rent_status");
    let payment_status: String = r.get("payment_status");
    Ok(Rental {
        id: r.get("id"),
        rental_code: r.get("rental_code"),
        renter_id: r.get("renter_id"),
        car_id: r.get("car_id"),
        rent_type: RentType::parse(&rent_type)
            .ok_or_else(|| anyhow::anyhow!("unknown rent type {rent_type}"))?,
        starting_date: r.get("starting_date"),
        ending_date: r.get("ending_date"),
        total_fee: r.get("total_fee"),
        rent_status: RentStatus::parse(&rent_status)
            .ok_or_else(|| anyhow::anyhow!("unknown rent status {rent_status}"))?,
        payment_status: PaymentStatus::parse(&payment_status)
            .ok_or_else(|| anyhow::anyhow!("unknown payment status {payment_status}"))?,
        is_images_uploaded: r.get("is_images_uploaded"),
        created_at: r.get("created_at"),
    })
}

#[async_trait]
impl RentalRepository for SqlxRentalRepository {
    async fn start(&self, new: &NewRental) -> anyhow::Result<Option<Rental>> {
        let mut tx = self.pool.begin().await?;
        // Conditional flip: only one concurrent renter sees a row come back.
        let claimed = sqlx::query(
            r#"UPDATE cars SET is_rentable = FALSE, updated_at = now()
               WHERE id = $1 AND is_rentable = TRUE AND is_deleted = FALSE"#,
        )
        .bind(new.car_id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!(
            r#"INSERT INTO rentals (rental_code, renter_id, car_id, rent_type, starting_date, ending_date, total_fee)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {RENTAL_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&new.rental_code)
            .bind(new.renter_id)
            .bind(new.car_id)
            .bind(new.rent_type.as_str())
            .bind(new.starting_date)
            .bind(new.ending_date)
            .bind(new.total_fee)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;
        let rental = rental_from_row(&row)?;
        tx.commit().await?;
        Ok(Some(rental))
    }

    async fn find_by_code(&self, rental_code: &str) -> anyhow::Result<Option<Rental>> {
        let sql = format!("SELECT {RENTAL_COLUMNS} FROM rentals WHERE rental_code = $1");
        let row = sqlx::query(&sql)
            .bind(rental_code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rental_from_row).transpose()
    }

    async fn find_active_by_renter(&self, renter_id: Uuid) -> anyhow::Result<Option<Rental>> {
        let sql = format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals WHERE renter_id = $1 AND rent_status = $2"
        );
        let row = sqlx::query(&sql)
            .bind(renter_id)
            .bind(RentStatus::Active.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rental_from_row).transpose()
    }

    async fn mark_images_uploaded(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE rentals SET is_images_uploaded = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn terminate(&self, t: &Termination) -> anyhow::Result<Rental> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            r#"UPDATE rentals
               SET rent_status = $2, payment_status = $3, ending_date = $4, total_fee = $5
               WHERE id = $1 AND rent_status = $6
               RETURNING {RENTAL_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(t.rental_id)
            .bind(RentStatus::Terminated.as_str())
            .bind(PaymentStatus::Paid.as_str())
            .bind(t.ending_date)
            .bind(t.total_fee)
            .bind(RentStatus::Active.as_str())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| anyhow::anyhow!("rental {} is no longer active", t.rental_id))?;
        let rental = rental_from_row(&row)?;

        sqlx::query(
            r#"UPDATE cars SET is_rentable = TRUE, latitude = $2, longitude = $3, fuel_level = $4,
                   updated_at = now()
               WHERE id = $1"#,
        )
        .bind(t.car_id)
        .bind(t.latitude)
        .bind(t.longitude)
        .bind(t.fuel_level)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;
        tx.commit().await?;
        Ok(rental)
    }
}
