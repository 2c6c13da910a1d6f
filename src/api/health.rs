//! Health check endpoints for Kubernetes liveness and readiness probes

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessStatus {
    pub status: String,
    pub version: String,
    pub dependencies: DependencyHealth,
}

#[derive(Serialize, ToSchema)]
pub struct DependencyHealth {
    pub language_model: String,
    pub inference_api: String,
}

/// Liveness probe endpoint
///
/// Always returns 200 OK if the service is running.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe endpoint
///
/// The pipeline has no local dependencies; readiness reports whether the
/// upstream model credentials are configured. A missing inference key is
/// non-critical (the verifier degrades), so it never fails the probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessStatus),
        (status = 503, description = "Service is not ready", body = ReadinessStatus)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness() -> impl Responder {
    let llm_status = if std::env::var("OPENAI_API_KEY").is_ok() {
        "configured"
    } else {
        "missing"
    };

    let inference_status = if std::env::var("HF_API_KEY").is_ok() {
        "configured"
    } else {
        "unauthenticated"
    };

    let ready = llm_status == "configured";

    let status = ReadinessStatus {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies: DependencyHealth {
            language_model: llm_status.to_string(),
            inference_api: inference_status.to_string(),
        },
    };

    if ready {
        HttpResponse::Ok().json(status)
    } else {
        HttpResponse::ServiceUnavailable().json(status)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(readiness);
}
