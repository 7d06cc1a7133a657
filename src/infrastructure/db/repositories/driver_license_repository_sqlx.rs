use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::driver_license_repository::{
    DriverLicenseRepository, NewDriverLicense,
};
use crate::domain::licenses::DriverLicense;
use crate::infrastructure::db::{PgPool, map_db_error};

const LICENSE_COLUMNS: &str = r#"id, renter_id, first_name, last_name, born_date, born_place,
    drivers_license_date, licence_validity_period, identity_number, blood_group,
    front_side_image, back_side_image, created_at"#;

pub struct SqlxDriverLicenseRepository {
    pub pool: PgPool,
}

impl SqlxDriverLicenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn license_from_row(r: &PgRow) -> DriverLicense {
    DriverLicense {
        id: r.get("id"),
        renter_id: r.get("renter_id"),
        first_name: r.get("first_name"),
        last_name: r.get("last_name"),
        born_date: r.get("born_date"),
        born_place: r.get("born_place"),
        drivers_license_date: r.get("drivers_license_date"),
        licence_validity_period: r.get("licence_validity_period"),
        identity_number: r.get("identity_number"),
        blood_group: r.get("blood_group"),
        front_side_image: r.get("front_side_image"),
        back_side_image: r.get("back_side_image"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl DriverLicenseRepository for SqlxDriverLicenseRepository {
    async fn create(&self, new: &NewDriverLicense) -> anyhow::Result<DriverLicense> {
        let sql = format!(
            r#"INSERT INTO driver_licenses (renter_id, first_name, last_name, born_date, born_place,
                   drivers_license_date, licence_validity_period, identity_number, blood_group,
                   front_side_image, back_side_image)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING {LICENSE_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(new.renter_id)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(new.born_date)
            .bind(&new.born_place)
            .bind(new.drivers_license_date)
            .bind(new.licence_validity_period)
            .bind(&new.identity_number)
            .bind(&new.blood_group)
            .bind(&new.front_side_image)
            .bind(&new.back_side_image)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(license_from_row(&row))
    }

    async fn find_by_renter(&self, renter_id: Uuid) -> anyhow::Result<Option<DriverLicense>> {
        let sql = format!("SELECT {LICENSE_COLUMNS} FROM driver_licenses WHERE renter_id = $1");
        let row = sqlx::query(&sql)
            .bind(renter_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(license_from_row))
    }

    async fn delete_by_renter(&self, renter_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM driver_licenses WHERE renter_id = $1")
            .bind(renter_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
