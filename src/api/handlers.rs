//! HTTP request handlers for the attendance engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::generate_monthly_report;
use crate::ingest::ingest_tables;
use crate::models::ReportingPeriod;

use super::request::ReportRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reports", post(report_handler))
        .with_state(state)
}

fn rejection_to_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::malformed_json("Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Handler for POST /reports endpoint.
///
/// Normalizes the raw tables, runs the monthly pipeline and returns the
/// report.
async fn report_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing report request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return ApiErrorResponse::bad_request(rejection_to_error(rejection, correlation_id))
                .into_response();
        }
    };

    let period = match ReportingPeriod::new(request.month, request.year, request.holidays.clone())
    {
        Ok(period) => period,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                month = request.month,
                year = request.year,
                "Invalid reporting period"
            );
            return ApiErrorResponse::from(err).into_response();
        }
    };

    if let Err(error) = request.validate() {
        warn!(
            correlation_id = %correlation_id,
            error = %error.message,
            "Request validation failed"
        );
        return ApiErrorResponse::bad_request(error).into_response();
    }

    let config = state.config().config();
    let start_time = Instant::now();
    let (tables, manual_assignments) = request.into_tables();
    let inputs = ingest_tables(&tables, manual_assignments, config);

    match generate_monthly_report(&inputs, &period, config) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                report_id = %report.report_id,
                rows = report.rows.len(),
                warnings = report.audit_trace.warnings.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Report generated successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(report),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Report generation failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}
