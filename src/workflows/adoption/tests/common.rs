use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::adoption::domain::{
    ApplicantDetails, ApplicationId, ApplicationStatus, ApplicationSubmission, Decision,
    DecisionOutcome, Pet, PetId,
};
use crate::workflows::adoption::repository::{
    ApplicationRecord, ApplicationRepository, PetStore, RepositoryError,
};
use crate::workflows::adoption::{adoption_router, AdoptionApplicationService};

pub(super) fn applicant() -> ApplicantDetails {
    ApplicantDetails {
        name: "Dana Whitfield".to_string(),
        street_address: "412 Alder Lane".to_string(),
        city: "Cedar Falls".to_string(),
        state: "Iowa".to_string(),
        zip_code: "50613".to_string(),
        description: "Quiet home with a fenced yard".to_string(),
    }
}

pub(super) fn submission(pet_ids: Vec<PetId>) -> ApplicationSubmission {
    ApplicationSubmission {
        applicant: applicant(),
        pet_ids,
        submitted_on: Some(NaiveDate::from_ymd_opt(2026, 7, 15).expect("valid date")),
    }
}

pub(super) fn pet(id: &str, name: &str) -> Pet {
    Pet {
        id: PetId(id.to_string()),
        name: name.to_string(),
        breed: "Mixed".to_string(),
        age: Some(4),
        adoptable: true,
    }
}

pub(super) fn pet_id(id: &str) -> PetId {
    PetId(id.to_string())
}

/// Service over in-memory stores seeded with two adoptable pets.
pub(super) fn build_service() -> (
    AdoptionApplicationService<MemoryApplications, MemoryPets>,
    Arc<MemoryApplications>,
    Arc<MemoryPets>,
) {
    let applications = Arc::new(MemoryApplications::default());
    let pets = Arc::new(MemoryPets::default());
    pets.insert(pet("pet-buster", "Buster")).expect("seed pet");
    pets.insert(pet("pet-marlowe", "Marlowe")).expect("seed pet");

    let service = AdoptionApplicationService::new(applications.clone(), pets.clone());
    (service, applications, pets)
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
    decisions: Arc<Mutex<HashMap<ApplicationId, Vec<Decision>>>>,
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.application_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if record.status != expected {
            return Err(RepositoryError::Conflict);
        }
        record.status = next;
        Ok(())
    }

    fn add_decision(&self, id: &ApplicationId, decision: Decision) -> Result<(), RepositoryError> {
        let records = self.records.lock().expect("repository mutex poisoned");
        if !records.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }
        let mut guard = self.decisions.lock().expect("decision mutex poisoned");
        guard.entry(id.clone()).or_default().push(decision);
        Ok(())
    }

    fn record_outcome(
        &self,
        id: &ApplicationId,
        pet_id: &PetId,
        outcome: DecisionOutcome,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.decisions.lock().expect("decision mutex poisoned");
        let decisions = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let decision = decisions
            .iter_mut()
            .find(|decision| &decision.pet_id == pet_id)
            .ok_or(RepositoryError::NotFound)?;
        decision.outcome = outcome;
        Ok(())
    }

    fn decisions(&self, id: &ApplicationId) -> Result<Vec<Decision>, RepositoryError> {
        let records = self.records.lock().expect("repository mutex poisoned");
        if !records.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }
        let guard = self.decisions.lock().expect("decision mutex poisoned");
        Ok(guard.get(id).cloned().unwrap_or_default())
    }

    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == ApplicationStatus::Pending)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPets {
    pets: Arc<Mutex<HashMap<PetId, Pet>>>,
    availability_writes: Arc<Mutex<Vec<(PetId, bool)>>>,
}

impl MemoryPets {
    /// Every `set_adoptable` call in order, for asserting the adoption side
    /// effect fires exactly when it should.
    pub(super) fn availability_writes(&self) -> Vec<(PetId, bool)> {
        self.availability_writes
            .lock()
            .expect("write log mutex poisoned")
            .clone()
    }
}

impl PetStore for MemoryPets {
    fn insert(&self, pet: Pet) -> Result<Pet, RepositoryError> {
        let mut guard = self.pets.lock().expect("pet mutex poisoned");
        if guard.contains_key(&pet.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(pet.id.clone(), pet.clone());
        Ok(pet)
    }

    fn fetch(&self, id: &PetId) -> Result<Option<Pet>, RepositoryError> {
        let guard = self.pets.lock().expect("pet mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn set_adoptable(&self, id: &PetId, adoptable: bool) -> Result<(), RepositoryError> {
        let mut guard = self.pets.lock().expect("pet mutex poisoned");
        let pet = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        pet.adoptable = adoptable;
        self.availability_writes
            .lock()
            .expect("write log mutex poisoned")
            .push((id.clone(), adoptable));
        Ok(())
    }

    fn adoptable(&self) -> Result<Vec<Pet>, RepositoryError> {
        let guard = self.pets.lock().expect("pet mutex poisoned");
        Ok(guard.values().filter(|pet| pet.adoptable).cloned().collect())
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _expected: ApplicationStatus,
        _next: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn add_decision(
        &self,
        _id: &ApplicationId,
        _decision: Decision,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_outcome(
        &self,
        _id: &ApplicationId,
        _pet_id: &PetId,
        _outcome: DecisionOutcome,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn decisions(&self, _id: &ApplicationId) -> Result<Vec<Decision>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(
    service: AdoptionApplicationService<MemoryApplications, MemoryPets>,
) -> axum::Router {
    adoption_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
