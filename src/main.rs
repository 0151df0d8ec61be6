use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

use shelter_desk::config::AppConfig;
use shelter_desk::error::AppError;
use shelter_desk::telemetry;
use shelter_desk::workflows::adoption::{
    adoption_router, AdoptionApplicationService, ApplicantDetails, ApplicationId,
    ApplicationRecord, ApplicationRepository, ApplicationServiceError, ApplicationStatus,
    ApplicationSubmission, Decision, DecisionOutcome, Pet, PetId, PetStore, RepositoryError,
};
use shelter_desk::workflows::roster::PetRosterImporter;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Shelter Desk",
    about = "Track pet adoption applications from intake through placement",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk one application through intake, decisions, and placement
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Optional roster CSV export to seed the pet store at startup
    #[arg(long)]
    roster_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct DemoArgs {
    /// Optional roster CSV export to seed the pet store
    #[arg(long)]
    roster_csv: Option<PathBuf>,
    /// Reject the first pet instead of approving every decision
    #[arg(long)]
    reject_first: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let applications = Arc::new(InMemoryApplicationRepository::default());
    let pets = Arc::new(InMemoryPetStore::default());
    let seeded = seed_roster(pets.as_ref(), args.roster_csv.take())?;
    let service = Arc::new(AdoptionApplicationService::new(applications, pets));

    let app = adoption_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, pets = seeded, "adoption tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        roster_csv,
        reject_first,
    } = args;

    let applications = Arc::new(InMemoryApplicationRepository::default());
    let pets = Arc::new(InMemoryPetStore::default());
    let seeded = seed_roster(pets.as_ref(), roster_csv)?;
    let service = AdoptionApplicationService::new(applications, pets);

    println!("Adoption workflow demo ({seeded} pets on the roster)");

    let adoptable = service.adoptable_pets()?;
    println!("\nAdoptable pets");
    for pet in &adoptable {
        println!("- {} ({}, {})", pet.name, pet.id.0, pet.breed);
    }

    let chosen: Vec<PetId> = adoptable.iter().take(2).map(|pet| pet.id.clone()).collect();
    let record = service.submit(demo_submission(chosen.clone()))?;
    println!(
        "\nReceived application {} for {} pet(s) -> status {}",
        record.application_id.0,
        chosen.len(),
        record.status.label()
    );

    for (index, pet_id) in chosen.iter().enumerate() {
        let outcome = if reject_first && index == 0 {
            DecisionOutcome::Rejected
        } else {
            DecisionOutcome::Approved
        };
        let status = service.record_decision(&record.application_id, pet_id, outcome)?;
        println!(
            "- Recorded {:?} for {} -> application {}",
            outcome,
            pet_id.0,
            status.label()
        );
    }

    let snapshot = service.snapshot(&record.application_id)?;
    let view = snapshot.status_view();
    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("\nPublic status payload:\n{json}"),
        Err(err) => println!("\nPublic status payload unavailable: {err}"),
    }

    let remaining = service.adoptable_pets()?;
    println!("\nPets still adoptable: {}", remaining.len());
    for pet in &remaining {
        println!("- {} ({})", pet.name, pet.id.0);
    }

    Ok(())
}

fn demo_submission(pet_ids: Vec<PetId>) -> ApplicationSubmission {
    ApplicationSubmission {
        applicant: ApplicantDetails {
            name: "Rosa Calloway".to_string(),
            street_address: "88 Birchwood Drive".to_string(),
            city: "Cedar Falls".to_string(),
            state: "Iowa".to_string(),
            zip_code: "50613".to_string(),
            description: "Retired, home most of the day, large fenced yard".to_string(),
        },
        pet_ids,
        submitted_on: None,
    }
}

fn seed_roster<S: PetStore>(store: &S, roster_csv: Option<PathBuf>) -> Result<usize, AppError> {
    match roster_csv {
        Some(path) => Ok(PetRosterImporter::from_path(path, store)?),
        None => {
            let defaults = [
                ("pet-001", "Biscuit", "Basset Hound", 8),
                ("pet-002", "Juniper", "Pembroke Welsh Corgi", 3),
                ("pet-003", "Maple", "Schnauzer mix", 5),
            ];
            for (id, name, breed, age) in defaults {
                store
                    .insert(Pet {
                        id: PetId(id.to_string()),
                        name: name.to_string(),
                        breed: breed.to_string(),
                        age: Some(age),
                        adoptable: true,
                    })
                    .map_err(ApplicationServiceError::from)?;
            }
            Ok(defaults.len())
        }
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Default, Clone)]
struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
    decisions: Arc<Mutex<HashMap<ApplicationId, Vec<Decision>>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
struct InMemoryPetStore {
    pets: Arc<Mutex<HashMap<PetId, Pet>>>,
}

impl PetStore for InMemoryPetStore {
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
        Ok(())
    }

    fn adoptable(&self) -> Result<Vec<Pet>, RepositoryError> {
        let guard = self.pets.lock().expect("pet mutex poisoned");
        Ok(guard.values().filter(|pet| pet.adoptable).cloned().collect())
    }
}
