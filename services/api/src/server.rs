use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ems_routing::config::AppConfig;
use ems_routing::error::AppError;
use ems_routing::routing::{RegionQuery, TriageError};
use ems_routing::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{demo_api, AppState};
use crate::routes::triage_router;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let default_region = RegionQuery {
        province: config.registry.province.clone(),
        district: config.registry.district.clone(),
    };
    let api = Arc::new(demo_api(default_region).map_err(TriageError::from)?);

    let app = triage_router()
        .layer(Extension(app_state))
        .layer(Extension(api))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "emergency routing service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
