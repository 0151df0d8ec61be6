use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicantDetails, ApplicationId, ApplicationStatus, Decision, DecisionOutcome, Pet, PetId,
};
use super::evaluation::DecisionTally;

/// Persisted application record. Decisions live beside it in the store and
/// are fetched separately so the aggregation stays explicit about its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    pub applicant: ApplicantDetails,
    pub submitted_on: NaiveDate,
    pub status: ApplicationStatus,
}

/// Record plus its current decision set, as read in one reconcile pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationSnapshot {
    pub record: ApplicationRecord,
    pub decisions: Vec<Decision>,
}

impl ApplicationSnapshot {
    pub fn status_view(&self) -> ApplicationStatusView {
        let outcomes: Vec<_> = self
            .decisions
            .iter()
            .map(|decision| decision.outcome)
            .collect();
        let tally = DecisionTally::count(&outcomes);

        ApplicationStatusView {
            application_id: self.record.application_id.clone(),
            status: self.record.status.label(),
            decision_summary: tally.summary(),
            pets: self
                .decisions
                .iter()
                .map(|decision| decision.pet_id.clone())
                .collect(),
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub decision_summary: String,
    pub pets: Vec<PetId>,
}

/// Storage abstraction over application and decision records so the service
/// module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    /// Conditional status write: fails with `Conflict` when the stored status
    /// no longer matches `expected`, so two racing reconciles cannot both
    /// finalize the application.
    fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<(), RepositoryError>;
    fn add_decision(&self, id: &ApplicationId, decision: Decision) -> Result<(), RepositoryError>;
    fn record_outcome(
        &self,
        id: &ApplicationId,
        pet_id: &PetId,
        outcome: DecisionOutcome,
    ) -> Result<(), RepositoryError>;
    fn decisions(&self, id: &ApplicationId) -> Result<Vec<Decision>, RepositoryError>;
    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Storage abstraction over the shelter's pet roster.
pub trait PetStore: Send + Sync {
    fn insert(&self, pet: Pet) -> Result<Pet, RepositoryError>;
    fn fetch(&self, id: &PetId) -> Result<Option<Pet>, RepositoryError>;
    fn set_adoptable(&self, id: &PetId, adoptable: bool) -> Result<(), RepositoryError>;
    fn adoptable(&self) -> Result<Vec<Pet>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or precondition is stale")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
