use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::{self, HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use platform_api::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult, internal_error};
use platform_db::{self, DbPool};
use products_hr::{
    Assembler, CollectionModel, EmployeeDto, EmployeeReply, EmployeeService, EntityModel,
    HalAssembler, HrError, PlainAssembler, Routes, SeaOrmEmployeeRepository,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub employees: EmployeeService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Arc<AppConfig>) -> Self {
        let repo = Arc::new(SeaOrmEmployeeRepository::new(pool.clone()));
        let routes = Routes::new(config.public_base_url.clone());
        let assembler: Arc<dyn Assembler> = if config.hypermedia {
            Arc::new(HalAssembler)
        } else {
            Arc::new(PlainAssembler)
        };
        Self {
            pool,
            employees: EmployeeService::new(repo, routes, assembler),
            config,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "employees server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .expose_headers([http::header::LOCATION])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee).put(replace_employee).delete(delete_employee),
        )
        .route("/employees/search/by-email", get(find_by_email))
        .route("/employees/search/by-name", get(find_by_name))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct EmailQuery {
    email: String,
}

#[derive(Deserialize)]
struct NameQuery {
    prefix: String,
}

async fn list_employees(
    State(state): State<AppState>,
) -> ApiResult<Json<CollectionModel<EmployeeDto>>> {
    let collection = state.employees.find_all().await.map_err(hr_error)?;
    Ok(Json(collection))
}

async fn create_employee(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<EmployeeDto>,
) -> ApiResult<Response> {
    let reply = state.employees.new_employee(dto).await.map_err(hr_error)?;
    render(reply)
}

async fn get_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Response> {
    let reply = state.employees.find_by_id(id).await.map_err(hr_error)?;
    render(reply)
}

async fn replace_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(dto): ApiJson<EmployeeDto>,
) -> ApiResult<Response> {
    let reply = state.employees.save(dto, id).await.map_err(hr_error)?;
    render(reply)
}

async fn delete_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Response> {
    let reply = state.employees.delete_by_id(id).await.map_err(hr_error)?;
    render(reply)
}

async fn find_by_email(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> ApiResult<Json<EntityModel<EmployeeDto>>> {
    let model = state
        .employees
        .find_by_email(&query.email)
        .await
        .map_err(hr_error)?;
    Ok(Json(model))
}

async fn find_by_name(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> ApiResult<Json<CollectionModel<EmployeeDto>>> {
    let collection = state
        .employees
        .find_by_name_starting_with(&query.prefix)
        .await
        .map_err(hr_error)?;
    Ok(Json(collection))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = platform_db::ping(&state.pool).await;
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

fn render(reply: EmployeeReply) -> ApiResult<Response> {
    match reply {
        EmployeeReply::Found(model) => Ok((StatusCode::OK, Json(model)).into_response()),
        EmployeeReply::Created { location, body } => Ok((
            StatusCode::CREATED,
            [(header::LOCATION, location)],
            Json(body),
        )
            .into_response()),
        EmployeeReply::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        EmployeeReply::NotFound { id } => {
            Err(ApiError::not_found(format!("employee {id} not found")))
        }
    }
}

fn hr_error(err: HrError) -> ApiError {
    match err {
        HrError::Validation(message) => ApiError::InvalidInput(message),
        HrError::EmailNotFound(_) => ApiError::not_found(err.to_string()),
        HrError::Storage(db) => internal_error(db),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
