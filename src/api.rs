use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRef, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::{
    Category, CategoryService, Customer, CustomerService, Entity, Invoice, InvoiceService,
    Product, ProductService, Repository, Service, ValidationError,
};

// Shared state of the HTTP server: one service per entity type, each backed
// by a single repository for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct AppState {
    pub products: ProductService,
    pub categories: CategoryService,
    pub customers: CustomerService,
    pub invoices: InvoiceService,
}

impl AppState {
    // Load every collection from the data directory.
    pub fn open(dir: &std::path::Path) -> crate::Result<Self> {
        Ok(Self {
            products: Service::new(Arc::new(Repository::open(dir)?)),
            categories: Service::new(Arc::new(Repository::open(dir)?)),
            customers: Service::new(Arc::new(Repository::open(dir)?)),
            invoices: Service::new(Arc::new(Repository::open(dir)?)),
        })
    }
}

impl FromRef<AppState> for ProductService {
    fn from_ref(state: &AppState) -> Self {
        state.products.clone()
    }
}

impl FromRef<AppState> for CategoryService {
    fn from_ref(state: &AppState) -> Self {
        state.categories.clone()
    }
}

impl FromRef<AppState> for CustomerService {
    fn from_ref(state: &AppState) -> Self {
        state.customers.clone()
    }
}

impl FromRef<AppState> for InvoiceService {
    fn from_ref(state: &AppState) -> Self {
        state.invoices.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new();
    let router = routes::<Category>(router);
    let router = routes::<Customer>(router);
    let router = routes::<Invoice>(router);
    let router = routes::<Product>(router);
    router.with_state(state)
}

// Mount the five CRUD endpoints for T under /api/{collection}.
fn routes<T: Entity>(router: Router<AppState>) -> Router<AppState>
where
    Service<T>: FromRef<AppState>,
{
    let base = format!("/api/{}", T::COLLECTION);
    router
        .route(&base, get(list::<T>).post(create::<T>))
        .route(
            &format!("{base}/:id"),
            get(get_one::<T>).put(update::<T>).delete(remove::<T>),
        )
}

// Run a store call on the blocking pool. Saves fsync and readers may wait
// on a writer's lock; neither should park an async worker.
async fn blocking<R: Send + 'static>(
    f: impl FnOnce() -> R + Send + 'static,
) -> Result<R, ApiError> {
    Ok(tokio::task::spawn_blocking(f).await?)
}

async fn list<T: Entity>(State(service): State<Service<T>>) -> Result<Json<Vec<T>>, ApiError> {
    Ok(Json(blocking(move || service.get_all()).await?))
}

async fn get_one<T: Entity>(
    State(service): State<Service<T>>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<T>, ApiError> {
    let Path(id) = id?;
    blocking(move || service.get_by_id(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(T::NAME))
}

async fn create<T: Entity>(
    State(service): State<Service<T>>,
    body: Result<Json<T>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(entity) = body?;
    entity.validate()?;
    let created = blocking(move || service.add(entity)).await??;
    let location = format!("/api/{}/{}", T::COLLECTION, created.id());
    log::info!("Created {} at {location}", T::NAME);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

async fn update<T: Entity>(
    State(service): State<Service<T>>,
    id: Result<Path<u32>, PathRejection>,
    body: Result<Json<T>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(entity) = body?;
    if entity.id() != id {
        return Err(ApiError::IdMismatch(T::NAME));
    }
    entity.validate()?;
    match blocking(move || service.update(entity)).await?? {
        Some(_) => {
            log::info!("Updated {} {id}", T::NAME);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(T::NAME)),
    }
}

async fn remove<T: Entity>(
    State(service): State<Service<T>>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    match blocking(move || service.delete(id)).await?? {
        Some(_) => {
            log::info!("Deleted {} {id}", T::NAME);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(T::NAME)),
    }
}

// Every failure a request can end in. Rendered as a JSON body with a
// "message" field.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} ID mismatch")]
    IdMismatch(&'static str),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] crate::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::IdMismatch(_) | ApiError::Invalid(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Invalid(e) => json!({
                "message": "Validation failed",
                "errors": e.0,
            }),
            e @ (ApiError::Store(_) | ApiError::Task(_)) => {
                log::error!("Request failed: {e}");
                json!({ "message": "Storage error" })
            }
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[test]
fn test_api_error_status() {
    let io = || std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    let cases = [
        (ApiError::NotFound("Product"), 404, "Product not found"),
        (ApiError::IdMismatch("Invoice"), 400, "Invoice ID mismatch"),
        (
            ApiError::Invalid(ValidationError(vec!["name: is required".into()])),
            400,
            "validation failed: name: is required",
        ),
        (ApiError::BadRequest("bad json".into()), 400, "bad json"),
        (
            ApiError::Store(crate::Error::WriteFailed {
                path: "x.json".into(),
                source: io(),
            }),
            500,
            "failed to write \"x.json\": disk on fire",
        ),
    ];
    for (err, status, message) in cases {
        assert_eq!(err.status().as_u16(), status);
        assert_eq!(err.to_string(), message);
    }
}

#[tokio::test]
async fn test_blocking_task_failure() {
    assert_eq!(blocking(|| 7).await.unwrap(), 7);

    let err = blocking(|| -> u32 { panic!("store call panicked") })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Task(_)), "{err:?}");
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let res = err.into_response();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
