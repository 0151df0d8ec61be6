//! Side effect applied when an application is finalized Approved: every pet
//! the application references leaves the adoptable pool.

use super::domain::PetId;
use super::repository::{PetStore, RepositoryError};

/// Mark every referenced pet as no longer adoptable.
///
/// Applies at the application level, not per decision: once the application
/// is approved, all of its pets are spoken for. Re-invoking against pets that
/// are already off the pool is a no-op, so a repeated reconcile cannot
/// corrupt availability. Store failures propagate to the caller.
pub fn mark_adopted<P>(pets: &P, pet_ids: &[PetId]) -> Result<(), RepositoryError>
where
    P: PetStore + ?Sized,
{
    for pet_id in pet_ids {
        pets.set_adoptable(pet_id, false)?;
    }
    Ok(())
}
