use sqlx::{Pool, Postgres};

use crate::application::errors::ConstraintViolation;

pub type PgPool = Pool<Postgres>;

pub async fn connect_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    // Uses compile-time embedded migrations under ./migrations
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Field name reported to clients for a named table constraint.
fn constraint_field(constraint: &str) -> &'static str {
    match constraint {
        "accounts_role_email_key" => "email",
        "accounts_account_code_key" => "accountCode",
        "cars_plate_number_key" => "plateNumber",
        "cars_car_code_key" => "carCode",
        "driver_licenses_renter_id_key" => "driverLicense",
        "rentals_rental_code_key" => "rentalCode",
        "rentals_renter_active_key" => "activeRental",
        c if c.contains("car_id") => "car",
        c if c.contains("renter_id") || c.contains("owner_id") => "account",
        _ => "value",
    }
}

/// Turns Postgres constraint failures into [`ConstraintViolation`] so use cases
/// can answer with 409/400 instead of 500. Other errors pass through.
pub fn map_db_error(err: sqlx::Error) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        let field = constraint_field(db.constraint().unwrap_or_default()).to_string();
        let violation = match db.code().as_deref() {
            Some("23505") => Some(ConstraintViolation::Unique(field)),
            Some("23503") => Some(ConstraintViolation::ForeignKey(field)),
            Some("23514") | Some("22001") => Some(ConstraintViolation::InvalidValue(field)),
            _ => None,
        };
        if let Some(v) = violation {
            tracing::debug!(error = %db, "db_constraint_violation");
            return v.into();
        }
    }
    err.into()
}

pub mod repositories;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_map_to_client_fields() {
        assert_eq!(constraint_field("accounts_role_email_key"), "email");
        assert_eq!(constraint_field("cars_plate_number_key"), "plateNumber");
        assert_eq!(constraint_field("rentals_car_id_fkey"), "car");
        assert_eq!(constraint_field("rentals_renter_active_key"), "activeRental");
        assert_eq!(constraint_field("something_else"), "value");
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_db_error(sqlx::Error::RowNotFound);
        assert!(err.downcast_ref::<ConstraintViolation>().is_none());
    }
}
