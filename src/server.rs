//! HTTP adapter.
//!
//! `POST /run?task=<text>` runs one task and answers with a plain-text
//! message and the task's status. `GET /tasks` lists the routing table in
//! precedence order.

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::dispatch::DispatchEngine;
use crate::engine::{Engine, TaskError};
use crate::handlers::{BindingInfo, TaskReply};

pub fn router(engine: Arc<DispatchEngine>) -> Router {
    Router::new()
        .route("/run", post(run_task))
        .route("/tasks", get(list_tasks))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

async fn run_task(
    State(engine): State<Arc<DispatchEngine>>,
    Query(params): Query<Vec<(String, String)>>,
) -> (StatusCode, String) {
    let reply = match first_task(&params) {
        None => TaskReply::from(TaskError::MissingTask),
        Some(task) => engine.run(task).await.unwrap_or_else(TaskReply::from),
    };
    into_response(reply)
}

async fn list_tasks(State(engine): State<Arc<DispatchEngine>>) -> Json<Vec<BindingInfo>> {
    Json(engine.registry().describe())
}

/// The first `task` value; repeats are ignored.
fn first_task(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "task")
        .map(|(_, value)| value.as_str())
}

fn into_response(reply: TaskReply) -> (StatusCode, String) {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, reply.message)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(engine: Arc<DispatchEngine>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(engine))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
