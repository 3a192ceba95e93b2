//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

use super::AppState;
use super::types::{
    BatteryStatusResponse, ConfigureRequest, ConfigureResponse, ErrorResponse, OptimizeRequest,
    OptimizeResponse,
};
use crate::config::MAX_HORIZON_HOURS;
use crate::dispatch::GreedyDispatch;
use crate::generator::{Scenario, generate_market_data};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Generates synthetic market data and runs a dispatch over it.
///
/// `POST /api/optimize` → 200 + `OptimizeResponse` JSON, or 400 on invalid
/// parameters. Each request builds its own `Battery` from the stored
/// defaults, so concurrent requests never share mutable state.
pub async fn optimize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let run = &state.run;
    let horizon_hours = req.horizon_hours.unwrap_or(run.horizon_hours);
    let interval_minutes = req.interval_minutes.unwrap_or(run.interval_minutes);

    if horizon_hours == 0 || horizon_hours > MAX_HORIZON_HOURS {
        return Err(bad_request(format!(
            "horizon_hours must be in [1, {MAX_HORIZON_HOURS}]"
        )));
    }
    if interval_minutes == 0 || 60 % interval_minutes != 0 {
        return Err(bad_request("interval_minutes must be > 0 and divide 60"));
    }

    let scenario: Scenario = req
        .scenario
        .as_deref()
        .unwrap_or(&run.scenario)
        .parse()
        .map_err(bad_request)?;
    let seed = req.seed.unwrap_or(run.seed);
    let start = req
        .start_time
        .unwrap_or_else(|| Utc::now().naive_utc());

    let battery_config = *state.battery.read().await;
    let dt_hours = f64::from(interval_minutes) / 60.0;
    let mut battery = battery_config.build(dt_hours).map_err(bad_request)?;

    let data = generate_market_data(start, horizon_hours, interval_minutes, scenario, seed);
    let schedule = GreedyDispatch
        .optimize(&mut battery, &data.prices, &data.forecasts)
        .map_err(bad_request)?;

    Ok(Json(OptimizeResponse::from(&schedule)))
}

/// Returns the stored battery configuration plus current availability.
///
/// `GET /api/battery/status` → 200 + `BatteryStatusResponse` JSON
pub async fn battery_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BatteryStatusResponse>, ApiError> {
    let config = *state.battery.read().await;
    // The stored config is always valid, but build() re-checks anyway.
    let battery = config.build(state.run.dt_hours()).map_err(bad_request)?;
    Ok(Json(BatteryStatusResponse::from(&battery.state())))
}

/// Updates the stored battery defaults.
///
/// `POST /api/battery/configure` → 200 on success; 400 leaves the stored
/// configuration untouched. Fields omitted from the body keep their current
/// values.
pub async fn configure_battery(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfigureRequest>,
) -> impl IntoResponse {
    let mut guard = state.battery.write().await;

    let mut candidate = *guard;
    if let Some(capacity_mwh) = req.capacity_mwh {
        candidate.capacity_mwh = capacity_mwh;
    }
    if let Some(max_power_mw) = req.max_power_mw {
        candidate.max_power_mw = max_power_mw;
    }
    if let Some(round_trip_efficiency) = req.round_trip_efficiency {
        candidate.round_trip_efficiency = round_trip_efficiency;
    }
    if let Some(initial_soc) = req.initial_soc {
        candidate.initial_soc = initial_soc;
    }

    // Validate the whole candidate before committing anything.
    if let Err(e) = candidate.build(state.run.dt_hours()) {
        return Err(bad_request(e));
    }

    *guard = candidate;
    Ok(Json(ConfigureResponse {
        success: true,
        message: "battery configuration updated".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::SimulatorConfig;

    fn make_test_state() -> Arc<AppState> {
        Arc::new(AppState::new(SimulatorConfig::baseline()))
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn optimize_returns_columnar_schedule() {
        let state = make_test_state();
        let app = router(state);

        let body = r#"{"horizon_hours": 1, "interval_minutes": 5, "seed": 7,
                       "start_time": "2024-01-01T00:00:00"}"#;
        let resp = app.oneshot(json_post("/api/optimize", body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["schedule"]["index"].as_array().map(Vec::len), Some(12));
        assert_eq!(json["schedule"]["power_mw"].as_array().map(Vec::len), Some(12));
        assert!(json["metrics"]["total_profit"].is_number());
        assert!(json["metrics"]["final_soc"].is_number());
        assert_eq!(json["schedule"]["index"][0], "2024-01-01T00:00:00");
    }

    #[tokio::test]
    async fn optimize_is_deterministic_for_pinned_seed_and_start() {
        let state = make_test_state();
        let body = r#"{"horizon_hours": 2, "seed": 42, "start_time": "2024-01-01T00:00:00"}"#;

        let resp_a = router(state.clone())
            .oneshot(json_post("/api/optimize", body))
            .await
            .unwrap();
        let resp_b = router(state)
            .oneshot(json_post("/api/optimize", body))
            .await
            .unwrap();

        let bytes_a = axum::body::to_bytes(resp_a.into_body(), usize::MAX)
            .await
            .unwrap();
        let bytes_b = axum::body::to_bytes(resp_b.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[tokio::test]
    async fn optimize_unknown_scenario_returns_400() {
        let state = make_test_state();
        let app = router(state);

        let resp = app
            .oneshot(json_post("/api/optimize", r#"{"scenario": "stormy"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn optimize_rejects_oversized_horizon() {
        let state = make_test_state();
        let app = router(state);

        let resp = app
            .oneshot(json_post(
                "/api/optimize",
                r#"{"horizon_hours": 4294967295}"#,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"].as_str().unwrap_or("").contains("horizon_hours"));
    }

    #[tokio::test]
    async fn optimize_rejects_interval_not_dividing_an_hour() {
        let state = make_test_state();
        let app = router(state);

        let resp = app
            .oneshot(json_post("/api/optimize", r#"{"interval_minutes": 7}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_reports_configured_battery() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder()
            .uri("/api/battery/status")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["capacity_mwh"], 100.0);
        assert_eq!(json["max_power_mw"], 20.0);
        assert_eq!(json["current_soc"], 0.5);
        assert_eq!(json["available_charge_mw"], 20.0);
        assert_eq!(json["available_discharge_mw"], 20.0);
    }

    #[tokio::test]
    async fn configure_updates_subsequent_status() {
        let state = make_test_state();

        let resp = router(state.clone())
            .oneshot(json_post(
                "/api/battery/configure",
                r#"{"capacity_mwh": 80.0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::builder()
            .uri("/api/battery/status")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["capacity_mwh"], 80.0);
        // Untouched fields keep their values
        assert_eq!(json["max_power_mw"], 20.0);
    }

    #[tokio::test]
    async fn configure_rejects_invalid_efficiency_without_committing() {
        let state = make_test_state();

        let resp = router(state.clone())
            .oneshot(json_post(
                "/api/battery/configure",
                r#"{"round_trip_efficiency": 1.5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .uri("/api/battery/status")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["round_trip_efficiency"], 0.92);
    }
}
