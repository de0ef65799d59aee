//! HTTP surface: liveness, service status, and one-shot transaction lookups.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

use crate::config::AppConfig;
use crate::connection::ConnectionState;
use crate::format::format_tx_hash;
use crate::metrics::Metrics;
use crate::poller::{check_once, TxPhase};
use crate::provider::StarknetProvider;

/// Shared application state accessible from HTTP handlers.
pub struct AppState {
    pub config: AppConfig,
    pub provider: Arc<dyn StarknetProvider>,
    pub metrics: Arc<Metrics>,
    pub connection: watch::Receiver<ConnectionState>,
    pub reservoir_count: watch::Receiver<Option<u64>>,
}

#[derive(Debug, Serialize)]
struct TxReport {
    tx_hash: String,
    short_hash: String,
    explorer_url: String,
    status: TxPhase,
    random_value: Option<String>,
    revert_reason: Option<String>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/status", web::get().to(status))
        .route("/tx/{hash}", web::get().to(transaction));
}

/// Liveness probe — returns 200 if the process is running.
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

async fn status(data: web::Data<AppState>) -> HttpResponse {
    let connection = data.connection.borrow().clone();
    let reservoir_count = *data.reservoir_count.borrow();

    HttpResponse::Ok().json(serde_json::json!({
        "status": "running",
        "connection": connection,
        "reservoir_count": reservoir_count,
        "metrics": data.metrics.to_json(),
    }))
}

async fn transaction(path: web::Path<String>, data: web::Data<AppState>) -> HttpResponse {
    let tx_hash = path.into_inner();
    data.metrics.record_poll();

    match check_once(data.provider.as_ref(), &tx_hash, &data.config.rand_event_key).await {
        Ok(status) => {
            if status.steps.confirmed {
                data.metrics.record_receipt();
                if status.steps.completed {
                    data.metrics.record_decoded();
                } else {
                    data.metrics.record_miss();
                }
            }
            HttpResponse::Ok().json(TxReport {
                short_hash: format_tx_hash(&tx_hash),
                explorer_url: data.config.explorer_url(&tx_hash),
                status: status.phase(),
                random_value: status.random_value,
                revert_reason: status.revert_reason,
                tx_hash,
            })
        }
        Err(e) => {
            data.metrics.record_failure();
            warn!(tx_hash = %tx_hash, error = %e, "Transaction lookup failed");
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": e.kind().user_message(),
                "kind": e.kind(),
                "detail": e.to_string(),
            }))
        }
    }
}
