use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Local;

use super::availability;
use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, Decision, DecisionOutcome, Pet, PetId,
};
use super::evaluation;
use super::intake::{IntakeGuard, ValidationError};
use super::repository::{
    ApplicationRecord, ApplicationRepository, ApplicationSnapshot, PetStore, RepositoryError,
};

/// Workflow facade composing the intake guard, the application store, and the
/// pet roster. Status derivation itself lives in [`evaluation`]; this type
/// owns the read-decisions / evaluate / persist / side-effect sequence.
pub struct AdoptionApplicationService<R, P> {
    guard: IntakeGuard,
    applications: Arc<R>,
    pets: Arc<P>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, P> AdoptionApplicationService<R, P>
where
    R: ApplicationRepository + 'static,
    P: PetStore + 'static,
{
    pub fn new(applications: Arc<R>, pets: Arc<P>) -> Self {
        Self {
            guard: IntakeGuard,
            applications,
            pets,
        }
    }

    /// Admit a new application: validate the applicant contact fields, check
    /// every referenced pet is known and still adoptable, then persist the
    /// Pending record with one Undecided decision per pet.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.guard.validate(&submission)?;

        for pet_id in &submission.pet_ids {
            self.require_adoptable(pet_id)?;
        }

        let application_id = next_application_id();
        let record = ApplicationRecord {
            application_id: application_id.clone(),
            applicant: submission.applicant,
            submitted_on: submission
                .submitted_on
                .unwrap_or_else(|| Local::now().date_naive()),
            status: ApplicationStatus::Pending,
        };

        let stored = self.applications.insert(record)?;
        for pet_id in submission.pet_ids {
            self.applications
                .add_decision(&application_id, Decision::undecided(pet_id))?;
        }

        Ok(stored)
    }

    /// Add another pet to an open application, starting it Undecided.
    pub fn attach_pet(
        &self,
        application_id: &ApplicationId,
        pet_id: &PetId,
    ) -> Result<(), ApplicationServiceError> {
        let record = self.require_application(application_id)?;
        if record.status.is_terminal() {
            return Err(ValidationError::ApplicationClosed(application_id.clone()).into());
        }

        self.require_adoptable(pet_id)?;

        let decisions = self.applications.decisions(application_id)?;
        if decisions.iter().any(|decision| &decision.pet_id == pet_id) {
            return Err(ValidationError::DuplicatePet(pet_id.clone()).into());
        }

        self.applications
            .add_decision(application_id, Decision::undecided(pet_id.clone()))?;
        Ok(())
    }

    /// Record a staff outcome for one pet, then re-derive the aggregate
    /// status. Finalized applications refuse further decisions.
    pub fn record_decision(
        &self,
        application_id: &ApplicationId,
        pet_id: &PetId,
        outcome: DecisionOutcome,
    ) -> Result<ApplicationStatus, ApplicationServiceError> {
        let record = self.require_application(application_id)?;
        if record.status.is_terminal() {
            return Err(ValidationError::ApplicationClosed(application_id.clone()).into());
        }

        self.applications
            .record_outcome(application_id, pet_id, outcome)?;
        self.reconcile(application_id)
    }

    /// Re-derive and persist the aggregate status from the current decision
    /// set. The status write is conditional on the status read at the top of
    /// this pass, so a concurrent reconcile surfaces as a Conflict instead of
    /// approving twice. Pets leave the adoptable pool only on the Pending ->
    /// Approved transition.
    pub fn reconcile(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationStatus, ApplicationServiceError> {
        let record = self.require_application(application_id)?;
        let decisions = self.applications.decisions(application_id)?;
        let outcomes: Vec<DecisionOutcome> = decisions
            .iter()
            .map(|decision| decision.outcome)
            .collect();

        let derived = evaluation::evaluate(&outcomes);
        if derived == record.status || derived == ApplicationStatus::Pending {
            return Ok(record.status);
        }

        self.applications
            .update_status(application_id, record.status, derived)?;

        if derived == ApplicationStatus::Approved {
            let pet_ids: Vec<PetId> = decisions
                .into_iter()
                .map(|decision| decision.pet_id)
                .collect();
            availability::mark_adopted(self.pets.as_ref(), &pet_ids)?;
        }

        Ok(derived)
    }

    /// Fetch the record and its decisions for API responses.
    pub fn snapshot(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationSnapshot, ApplicationServiceError> {
        let record = self.require_application(application_id)?;
        let decisions = self.applications.decisions(application_id)?;
        Ok(ApplicationSnapshot { record, decisions })
    }

    pub fn adoptable_pets(&self) -> Result<Vec<Pet>, ApplicationServiceError> {
        Ok(self.pets.adoptable()?)
    }

    fn require_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        Ok(self
            .applications
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn require_adoptable(&self, pet_id: &PetId) -> Result<Pet, ApplicationServiceError> {
        let pet = self
            .pets
            .fetch(pet_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !pet.adoptable {
            return Err(ValidationError::PetUnavailable(pet_id.clone()).into());
        }
        Ok(pet)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
