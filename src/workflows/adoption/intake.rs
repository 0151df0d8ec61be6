use super::domain::{ApplicantDetails, ApplicationId, ApplicationSubmission, PetId};

/// Validation errors raised while admitting a submission into the workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("applicant {field} must be provided")]
    MissingApplicantField { field: &'static str },
    #[error("pet {} is not available for adoption", .0 .0)]
    PetUnavailable(PetId),
    #[error("pet {} is already on this application", .0 .0)]
    DuplicatePet(PetId),
    #[error("application {} has been finalized and no longer accepts changes", .0 .0)]
    ApplicationClosed(ApplicationId),
}

/// Guard responsible for admitting submissions with complete contact details.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Check the applicant contact fields the shelter requires before any
    /// decision work starts. Whitespace-only values count as missing.
    pub fn validate(&self, submission: &ApplicationSubmission) -> Result<(), ValidationError> {
        let ApplicantDetails {
            name,
            street_address,
            city,
            state,
            zip_code,
            description: _,
        } = &submission.applicant;

        for (field, value) in [
            ("name", name),
            ("street address", street_address),
            ("city", city),
            ("state", state),
            ("zip code", zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingApplicantField { field });
            }
        }

        let mut seen: Vec<&PetId> = Vec::with_capacity(submission.pet_ids.len());
        for pet_id in &submission.pet_ids {
            if seen.contains(&pet_id) {
                return Err(ValidationError::DuplicatePet(pet_id.clone()));
            }
            seen.push(pet_id);
        }

        Ok(())
    }
}
