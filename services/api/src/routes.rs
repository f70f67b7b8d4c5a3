use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use ems_routing::error::AppError;
use ems_routing::routing::{
    Complaint, GeoPoint, HospitalId, RegionQuery, ReservationReceipt, RoutingResponse, TriageError,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::infra::{AppState, TriageApi};

#[derive(Debug, Deserialize)]
pub(crate) struct TriageCandidatesRequest {
    pub(crate) severity: u8,
    pub(crate) chief_complaint: String,
    /// Hospital the patient is in follow-up care with: either a facility
    /// code or a (possibly spaced) hospital name.
    #[serde(default)]
    pub(crate) followup: Option<String>,
    #[serde(default)]
    pub(crate) province: Option<String>,
    #[serde(default)]
    pub(crate) district: Option<String>,
    #[serde(default)]
    pub(crate) origin: Option<OriginParams>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OriginParams {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    #[serde(default = "default_shortlist_limit")]
    pub(crate) limit: usize,
}

fn default_shortlist_limit() -> usize {
    3
}

#[derive(Debug, Deserialize)]
pub(crate) struct NearestRequest {
    pub(crate) severity: u8,
    pub(crate) chief_complaint: String,
    #[serde(default)]
    pub(crate) followup: Option<String>,
    #[serde(default)]
    pub(crate) province: Option<String>,
    #[serde(default)]
    pub(crate) district: Option<String>,
    pub(crate) origin: OriginParams,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ReservationRequest {
    pub(crate) hospital_id: String,
    pub(crate) complaint: String,
    #[serde(default = "default_patients")]
    pub(crate) patients: u32,
}

fn default_patients() -> u32 {
    1
}

pub(crate) fn triage_router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/triage/candidates",
            axum::routing::post(triage_candidates_endpoint),
        )
        .route(
            "/api/v1/triage/nearest",
            axum::routing::post(nearest_endpoint),
        )
        .route(
            "/api/v1/triage/reservations",
            axum::routing::post(reserve_endpoint),
        )
        .route(
            "/api/v1/triage/reservations/release",
            axum::routing::post(release_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn triage_candidates_endpoint(
    Extension(api): Extension<Arc<TriageApi>>,
    Json(payload): Json<TriageCandidatesRequest>,
) -> Result<Json<RoutingResponse>, AppError> {
    Ok(Json(rank_request(&api, payload)?))
}

/// Like the candidates endpoint, but the incident origin is mandatory
/// and the result is cut down to the closest few.
pub(crate) async fn nearest_endpoint(
    Extension(api): Extension<Arc<TriageApi>>,
    Json(payload): Json<NearestRequest>,
) -> Result<Json<RoutingResponse>, AppError> {
    let NearestRequest {
        severity,
        chief_complaint,
        followup,
        province,
        district,
        origin,
    } = payload;
    let request = TriageCandidatesRequest {
        severity,
        chief_complaint,
        followup,
        province,
        district,
        origin: Some(origin),
    };
    Ok(Json(rank_request(&api, request)?))
}

fn rank_request(
    api: &TriageApi,
    payload: TriageCandidatesRequest,
) -> Result<RoutingResponse, AppError> {
    let region = request_region(api, payload.province, payload.district);
    let response = api.router.route_by_code(
        payload.severity,
        &payload.chief_complaint,
        payload.followup.as_deref(),
        &region,
    )?;

    let response = match payload.origin {
        Some(origin) => api.router.shortlist_nearest(
            response,
            &api.distances,
            GeoPoint {
                latitude: origin.latitude,
                longitude: origin.longitude,
            },
            origin.limit,
        )?,
        None => response,
    };

    Ok(response)
}

pub(crate) async fn reserve_endpoint(
    Extension(api): Extension<Arc<TriageApi>>,
    Json(payload): Json<ReservationRequest>,
) -> Result<Json<ReservationReceipt>, AppError> {
    let (hospital, complaint) = reservation_target(&payload)?;
    let receipt = api.router.reserve(&hospital, complaint, payload.patients)?;
    Ok(Json(receipt))
}

pub(crate) async fn release_endpoint(
    Extension(api): Extension<Arc<TriageApi>>,
    Json(payload): Json<ReservationRequest>,
) -> Result<Json<ReservationReceipt>, AppError> {
    let (hospital, complaint) = reservation_target(&payload)?;
    let receipt = api.router.release(&hospital, complaint, payload.patients)?;
    Ok(Json(receipt))
}

fn reservation_target(
    payload: &ReservationRequest,
) -> Result<(HospitalId, Complaint), AppError> {
    let complaint = Complaint::from_code(&payload.complaint).ok_or_else(|| {
        AppError::from(TriageError::UnknownComplaintCode {
            code: payload.complaint.clone(),
        })
    })?;
    Ok((HospitalId::from(payload.hospital_id.as_str()), complaint))
}

fn request_region(
    api: &TriageApi,
    province: Option<String>,
    district: Option<String>,
) -> RegionQuery {
    let province = province
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| api.default_region.province.clone());
    let district = match district {
        Some(value) => {
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        }
        None => api.default_region.district.clone(),
    };
    RegionQuery { province, district }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::demo_api;
    use ems_routing::routing::BedType;

    fn api() -> Arc<TriageApi> {
        let region = RegionQuery {
            province: "서울특별시".to_string(),
            district: None,
        };
        Arc::new(demo_api(region).expect("demo api builds"))
    }

    #[tokio::test]
    async fn triage_endpoint_ranks_seeded_hospitals() {
        let request = TriageCandidatesRequest {
            severity: 2,
            chief_complaint: "chest_pain".to_string(),
            followup: None,
            province: None,
            district: None,
            origin: None,
        };

        let Json(body) = triage_candidates_endpoint(Extension(api()), Json(request))
            .await
            .expect("routes");

        assert!(!body.hospitals.is_empty());
        assert_eq!(body.hospitals[0].id.as_str(), "A1100001");
        for pair in body.hospitals.windows(2) {
            assert!(pair[0].priority_score >= pair[1].priority_score);
        }
    }

    #[tokio::test]
    async fn triage_endpoint_shortlists_by_origin() {
        let request = TriageCandidatesRequest {
            severity: 2,
            chief_complaint: "chest_pain".to_string(),
            followup: None,
            province: None,
            district: None,
            origin: Some(OriginParams {
                latitude: 37.54,
                longitude: 126.94,
                limit: 1,
            }),
        };

        let Json(body) = triage_candidates_endpoint(Extension(api()), Json(request))
            .await
            .expect("routes");

        assert_eq!(body.hospitals.len(), 1);
        assert!(body.hospitals[0].distance_km.is_some());
        assert!(body.hospitals[0].duration_secs.is_some());
    }

    #[tokio::test]
    async fn nearest_endpoint_requires_and_uses_the_origin() {
        let request = NearestRequest {
            severity: 2,
            chief_complaint: "chest_pain".to_string(),
            followup: None,
            province: None,
            district: None,
            origin: OriginParams {
                latitude: 37.58,
                longitude: 127.00,
                limit: 2,
            },
        };

        let Json(body) = nearest_endpoint(Extension(api()), Json(request))
            .await
            .expect("routes");

        assert_eq!(body.hospitals.len(), 2);
        assert!(body.hospitals.iter().all(|c| c.distance_km.is_some()));
    }

    #[tokio::test]
    async fn triage_endpoint_rejects_unknown_complaints() {
        let request = TriageCandidatesRequest {
            severity: 2,
            chief_complaint: "hiccups".to_string(),
            followup: None,
            province: None,
            district: None,
            origin: None,
        };

        let result = triage_candidates_endpoint(Extension(api()), Json(request)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn health_route_is_wired() {
        use tower::ServiceExt;

        let app = triage_router().layer(Extension(api()));
        let request = axum::http::Request::builder()
            .uri("/health")
            .body(axum::body::Body::empty())
            .expect("request builds");

        let response = app.oneshot(request).await.expect("request serves");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn triage_route_accepts_json_posts() {
        use tower::ServiceExt;

        let app = triage_router().layer(Extension(api()));
        let body = json!({ "severity": 2, "chief_complaint": "chest_pain" });
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/v1/triage/candidates")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .expect("request builds");

        let response = app.oneshot(request).await.expect("request serves");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn reservation_roundtrip_updates_pending_counters() {
        let api = api();
        let request = ReservationRequest {
            hospital_id: "A1100001".to_string(),
            complaint: "chest_pain".to_string(),
            patients: 2,
        };

        let Json(receipt) = reserve_endpoint(Extension(api.clone()), Json(request))
            .await
            .expect("reserves");
        assert_eq!(receipt.bed_type, BedType::Er);
        assert_eq!(receipt.pending.get(&BedType::Er), Some(&2));

        let release = ReservationRequest {
            hospital_id: "A1100001".to_string(),
            complaint: "chest_pain".to_string(),
            patients: 2,
        };
        let Json(receipt) = release_endpoint(Extension(api), Json(release))
            .await
            .expect("releases");
        assert!(receipt.pending.is_empty());
    }
}
