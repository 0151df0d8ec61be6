use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationSubmission, DecisionOutcome, PetId};
use super::intake::ValidationError;
use super::repository::{ApplicationRepository, PetStore, RepositoryError};
use super::service::{AdoptionApplicationService, ApplicationServiceError};

/// Router builder exposing HTTP endpoints for intake, decisions, and status.
pub fn adoption_router<R, P>(service: Arc<AdoptionApplicationService<R, P>>) -> Router
where
    R: ApplicationRepository + 'static,
    P: PetStore + 'static,
{
    Router::new()
        .route("/api/v1/adoption/applications", post(submit_handler::<R, P>))
        .route(
            "/api/v1/adoption/applications/:application_id",
            get(status_handler::<R, P>),
        )
        .route(
            "/api/v1/adoption/applications/:application_id/pets/:pet_id",
            post(attach_pet_handler::<R, P>),
        )
        .route(
            "/api/v1/adoption/applications/:application_id/decisions",
            post(decision_handler::<R, P>),
        )
        .route("/api/v1/adoption/pets", get(adoptable_pets_handler::<R, P>))
        .with_state(service)
}

/// Staff-recorded outcome for one pet on an application.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub pet_id: PetId,
    pub outcome: DecisionOutcome,
}

pub(crate) async fn submit_handler<R, P>(
    State(service): State<Arc<AdoptionApplicationService<R, P>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PetStore + 'static,
{
    let record = match service.submit(submission) {
        Ok(record) => record,
        Err(error) => return error_response(error),
    };

    match service.snapshot(&record.application_id) {
        Ok(snapshot) => {
            (StatusCode::ACCEPTED, axum::Json(snapshot.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, P>(
    State(service): State<Arc<AdoptionApplicationService<R, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PetStore + 'static,
{
    let id = ApplicationId(application_id);
    match service.snapshot(&id) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn attach_pet_handler<R, P>(
    State(service): State<Arc<AdoptionApplicationService<R, P>>>,
    Path((application_id, pet_id)): Path<(String, String)>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PetStore + 'static,
{
    match service.attach_pet(&ApplicationId(application_id), &PetId(pet_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<R, P>(
    State(service): State<Arc<AdoptionApplicationService<R, P>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PetStore + 'static,
{
    let id = ApplicationId(application_id);
    match service.record_decision(&id, &request.pet_id, request.outcome) {
        Ok(status) => {
            let payload = json!({
                "application_id": id.0,
                "status": status.label(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn adoptable_pets_handler<R, P>(
    State(service): State<Arc<AdoptionApplicationService<R, P>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: PetStore + 'static,
{
    match service.adoptable_pets() {
        Ok(pets) => (StatusCode::OK, axum::Json(pets)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::Validation(ValidationError::ApplicationClosed(_)) => {
            StatusCode::CONFLICT
        }
        ApplicationServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
