//! REST API endpoint for content analysis

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};

use crate::api::error::ApiError;
use crate::model::{Claim, InputKind, Report, Verdict};
use crate::service::AnalysisService;

/// Request body for content analysis
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Kind of the submitted payload
    #[serde(rename = "type")]
    pub input_kind: InputKind,
    /// Raw text, a URL, or a base64-encoded image
    pub data: String,
}

/// Analyze submitted content and produce a credibility report
#[utoipa::path(
    post,
    path = "/v1/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Credibility report produced", body = Report),
        (status = 400, description = "No usable text in the input"),
        (status = 502, description = "URL retrieval failed")
    ),
    tag = "analysis"
)]
#[post("/v1/analyze")]
pub async fn analyze(
    service: web::Data<AnalysisService>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();

    tracing::info!(
        kind = ?request.input_kind,
        payload_length = request.data.len(),
        "Analysis request received"
    );

    let report = service.run(request.input_kind, &request.data).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze);
}

/// OpenAPI document for the service
#[derive(OpenApi)]
#[openapi(
    paths(analyze, crate::api::health::liveness, crate::api::health::readiness),
    components(schemas(AnalyzeRequest, Report, Claim, Verdict, InputKind)),
    tags(
        (name = "analysis", description = "Content credibility analysis"),
        (name = "health", description = "Service health probes")
    )
)]
pub struct ApiDoc;
