//! Minimal web front end for the car inventory.
//!
//! # Responsibility
//! - Map HTTP routes onto `CarService` operations.
//! - Render plain HTML pages and a JSON listing.
//!
//! # Invariants
//! - Repository calls run on the blocking pool, never on async workers.
//! - Validation problems answer 400, unknown identifiers answer 404.

mod pages;

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use carstock_core::{Car, CarFields, CarId, CarService, DynCarRepository, ServiceError};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

pub const ADDR_ENV: &str = "CARSTOCK_WEB_ADDR";
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

pub type SharedService = Arc<CarService<DynCarRepository>>;

/// Failure rendered as a plain HTML page.
#[derive(Debug)]
pub enum WebError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, title, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, "Invalid input", message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, "Not found", message),
            Self::Unavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable", message)
            }
        };
        (status, Html(pages::message_page(title, &message))).into_response()
    }
}

impl From<ServiceError> for WebError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::BadRequest(format!(
                "Incomplete or invalid data: {err}. Every field is required to add a car."
            )),
            ServiceError::StorageUnavailable => {
                Self::Unavailable(ServiceError::StorageUnavailable.to_string())
            }
        }
    }
}

type WebResult<T> = Result<T, WebError>;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub value: String,
}

/// Builds the router over a shared service.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/cars", post(create_handler))
        .route("/cars/:id", get(detail_handler).post(update_handler))
        .route("/cars/:id/delete", post(delete_handler))
        .route("/search", get(search_handler))
        .route("/api/cars", get(api_cars_handler))
        .route("/health", get(health_handler))
        .with_state(service)
}

/// Serves the router at `addr` (e.g. `"127.0.0.1:3000"`).
pub async fn serve(service: SharedService, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=web_listen module=web status=ok addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, router(service)).await
}

/// Runs `task` against the service on the blocking pool.
async fn blocking<T, F>(service: SharedService, task: F) -> WebResult<T>
where
    T: Send + 'static,
    F: FnOnce(&CarService<DynCarRepository>) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || task(service.as_ref()))
        .await
        .map_err(|err| {
            error!("event=web_task module=web status=error error={err}");
            WebError::Unavailable("the request could not be completed".to_string())
        })
}

fn parse_id(raw: &str, identifier_label: &str) -> WebResult<CarId> {
    raw.trim().parse::<CarId>().map_err(|_| {
        WebError::NotFound(format!("No car found at {identifier_label} {raw}."))
    })
}

fn fields_from_form(form: &HashMap<String, String>) -> WebResult<CarFields> {
    CarFields::from_pairs(form.iter()).map_err(|err| WebError::BadRequest(err.to_string()))
}

/// `GET /`
async fn index_handler(State(service): State<SharedService>) -> WebResult<Html<String>> {
    blocking(service, |service| {
        let cars = service.list();
        Html(pages::index_page(
            &cars,
            &service.search_attributes(),
            service.identifier_label(),
        ))
    })
    .await
}

/// `GET /cars/:id`
async fn detail_handler(
    State(service): State<SharedService>,
    Path(raw_id): Path<String>,
) -> WebResult<Html<String>> {
    blocking(service, move |service| {
        let label = service.identifier_label();
        let id = parse_id(&raw_id, label)?;
        match service.get(id) {
            Some(car) => Ok(Html(pages::detail_page(&car, label))),
            None => Err(WebError::NotFound(format!("No car found at {label} {id}."))),
        }
    })
    .await?
}

/// `POST /cars`
async fn create_handler(
    State(service): State<SharedService>,
    Form(form): Form<HashMap<String, String>>,
) -> WebResult<Redirect> {
    let fields = fields_from_form(&form)?;
    let car = blocking(service, move |service| service.create(&fields)).await??;
    info!("event=web_create module=web status=ok id={}", car.id);
    Ok(Redirect::to(&format!("/cars/{}", car.id)))
}

/// `POST /cars/:id`; blank form fields keep their stored values.
async fn update_handler(
    State(service): State<SharedService>,
    Path(raw_id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> WebResult<Redirect> {
    let fields = fields_from_form(&form)?;
    blocking(service, move |service| {
        let label = service.identifier_label();
        let id = parse_id(&raw_id, label)?;
        match service.update(id, &fields) {
            Some(car) => Ok(Redirect::to(&format!("/cars/{}", car.id))),
            None => Err(WebError::NotFound(format!("No car found at {label} {id}."))),
        }
    })
    .await?
}

/// `POST /cars/:id/delete`
async fn delete_handler(
    State(service): State<SharedService>,
    Path(raw_id): Path<String>,
) -> WebResult<Redirect> {
    blocking(service, move |service| {
        let label = service.identifier_label();
        let id = parse_id(&raw_id, label)?;
        match service.delete(id) {
            Some(_) => Ok(Redirect::to("/")),
            None => Err(WebError::NotFound(format!("No car found at {label} {id}."))),
        }
    })
    .await?
}

/// `GET /search?attribute=&value=`
async fn search_handler(
    State(service): State<SharedService>,
    Query(params): Query<SearchParams>,
) -> WebResult<Html<String>> {
    blocking(service, move |service| {
        let cars = service.search(&params.attribute, params.value.trim());
        Html(pages::search_page(
            &params.attribute,
            &params.value,
            &cars,
            service.identifier_label(),
        ))
    })
    .await
}

/// `GET /api/cars`
async fn api_cars_handler(State(service): State<SharedService>) -> WebResult<Json<Vec<Car>>> {
    blocking(service, |service| Json(service.list())).await
}

/// `GET /health` returns `{ "ok": true, "backend": ... }`.
async fn health_handler(State(service): State<SharedService>) -> impl IntoResponse {
    Json(json!({ "ok": true, "backend": service.backend().as_str() }))
}
