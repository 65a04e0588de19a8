use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::bed::{MockState, parse_command};

const FORCED_FAILURE_BODY: &str = "Forced failure";

pub async fn probe(State(state): State<MockState>) -> Response {
    if let Some(status) = state.forced_status().await {
        return (status, FORCED_FAILURE_BODY).into_response();
    }

    (StatusCode::OK, "SmartBed").into_response()
}

pub async fn set_motor_state(
    State(state): State<MockState>,
    RawQuery(raw): RawQuery,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    tracing::debug!("Set request: {:?}", raw);
    state.record_query(raw).await;

    if let Some(status) = state.forced_status().await {
        return (status, FORCED_FAILURE_BODY).into_response();
    }

    match parse_command(&params) {
        Ok(drives) => {
            state.apply(&drives).await;
            (StatusCode::OK, "OK").into_response()
        }
        Err(message) => {
            tracing::warn!("Rejected motor command: {}", message);
            (StatusCode::BAD_REQUEST, message).into_response()
        }
    }
}

pub async fn get_status(State(state): State<MockState>) -> Response {
    if let Some(status) = state.forced_status().await {
        return (status, FORCED_FAILURE_BODY).into_response();
    }

    if state.is_status_corrupt().await {
        return (StatusCode::OK, "{\"headPosition\": ").into_response();
    }

    Json(state.bed().await).into_response()
}
