use std::fmt::Display;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::rules::{RegistrationOutcome, Rule, RuleId, SubscriptionRequest};
use crate::wire::{Envelope, PutEventsRequest};
use crate::EventBridge;

/// `GET /subscriptions` - every registered rule.
pub(super) async fn list_rules(State(bridge): State<Arc<EventBridge>>) -> Response {
    match bridge.rules() {
        Ok(rules) => {
            let rules: Vec<&Rule> = rules.iter().map(|rule| rule.as_ref()).collect();
            Json(Envelope::ok(rules)).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// `POST /subscriptions` - one rule per `eventBridge` event of the body.
pub(super) async fn create_rules(State(bridge): State<Arc<EventBridge>>, body: Bytes) -> Response {
    let request = match SubscriptionRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting subscription request");
            return error_response(StatusCode::BAD_REQUEST, e);
        }
    };
    tracing::debug!(
        function = %request.name,
        lambda_port = request.lambda_port,
        events = %serde_json::Value::Array(request.events.clone()),
        "new subscription"
    );

    match bridge.subscribe(&request) {
        Ok(results) => {
            let outcomes: Vec<RegistrationOutcome> =
                results.into_iter().map(RegistrationOutcome::from).collect();
            Json(outcomes).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// `DELETE /subscriptions/:id` - unknown ids are fine.
pub(super) async fn delete_rule(
    State(bridge): State<Arc<EventBridge>>,
    Path(id): Path<String>,
) -> Response {
    match bridge.remove(&RuleId::from(id)) {
        Ok(_) => Json(Envelope::ok("OK")).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// `POST /` - PutEvents.
pub(super) async fn put_events(State(bridge): State<Arc<EventBridge>>, body: Bytes) -> Response {
    let request = match PutEventsRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting publish request");
            return error_response(StatusCode::BAD_REQUEST, e);
        }
    };

    match bridge.publish_values(request.entries).await {
        Ok(report) => {
            tracing::debug!(
                report = %serde_json::to_string(&report).unwrap_or_default(),
                "delivered events"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "publish failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

fn error_response(status: StatusCode, error: impl Display) -> Response {
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
