use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted adoption applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for pets in the shelter roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetId(pub String);

/// Contact details collected from a would-be adopter. Every field except
/// `description` must be non-empty at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub description: String,
}

/// Inbound payload for a new adoption application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub applicant: ApplicantDetails,
    #[serde(default)]
    pub pet_ids: Vec<PetId>,
    #[serde(default)]
    pub submitted_on: Option<NaiveDate>,
}

/// A pet in the shelter roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub breed: String,
    pub age: Option<u8>,
    pub adoptable: bool,
}

/// Per-pet outcome recorded by shelter staff. A decision starts out
/// `Undecided` when the pet is attached to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Undecided,
    Approved,
    Rejected,
}

/// Join record tying one pet's outcome to one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub pet_id: PetId,
    pub outcome: DecisionOutcome,
}

impl Decision {
    pub fn undecided(pet_id: PetId) -> Self {
        Self {
            pet_id,
            outcome: DecisionOutcome::Undecided,
        }
    }
}

/// Aggregate status tracked for the whole application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Approved and Rejected are terminal; the workflow never re-derives a
    /// status once one of them is reached.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}
