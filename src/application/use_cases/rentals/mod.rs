pub mod rent;
pub mod status_images;
pub mod terminate;

use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::rental_repository::RentalRepository;
use crate::domain::accounts::Account;
use crate::domain::rentals::Rental;

pub const WRONG_RENTAL_CODE: &str = "Wrong rental code. We cannot find it.";
pub const ALREADY_TERMINATED: &str = "This rent has already been terminated.";

/// An active rental that belongs to `renter`. Someone else's code reads as unknown.
pub(crate) async fn own_active_rental<R: RentalRepository + ?Sized>(
    rentals: &R,
    renter: &Account,
    rental_code: &str,
) -> ServiceResult<Rental> {
    let rental = rentals
        .find_by_code(rental_code)
        .await?
        .filter(|r| r.renter_id == renter.id)
        .ok_or_else(|| ServiceError::bad_request(WRONG_RENTAL_CODE))?;
    if !rental.is_active() {
        return Err(ServiceError::bad_request(ALREADY_TERMINATED));
    }
    Ok(rental)
}
