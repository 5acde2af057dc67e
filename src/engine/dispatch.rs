use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use tracing::{info, warn};

use super::resolver::{Resolution, resolve};
use super::{Engine, TaskError};
use crate::handlers::{Handler, HandlerRegistry, TaskReply};

/// Resolves a task against a fixed registry and runs the chosen handler.
pub struct DispatchEngine {
    registry: Arc<HandlerRegistry>,
}

impl DispatchEngine {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn resolve(&self, description: &str) -> Resolution {
        resolve(&self.registry, description)
    }

    /// Run `handler` behind the failure boundary.
    ///
    /// The handler gets its own task, so both `Err` returns and panics come
    /// back here as [`TaskError::HandlerFault`]. A normal reply passes
    /// through unchanged. Side effects of a failed handler are not undone.
    pub async fn execute(handler: Arc<dyn Handler>) -> Result<TaskReply, TaskError> {
        let name = handler.name().to_string();
        let joined = tokio::spawn(async move { handler.run().await }).await;

        let fault = match joined {
            Ok(Ok(reply)) => {
                info!(handler = %name, status = reply.status, "handler finished");
                return Ok(reply);
            }
            Ok(Err(err)) => format!("{err:#}"),
            Err(join_err) if join_err.is_panic() => {
                format!("handler panicked: {}", panic_message(join_err.into_panic()))
            }
            Err(join_err) => join_err.to_string(),
        };

        warn!(handler = %name, error = %fault, "handler failed");
        Err(TaskError::HandlerFault(fault))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[async_trait]
impl Engine for DispatchEngine {
    async fn run(&self, task: &str) -> Result<TaskReply, TaskError> {
        if task.is_empty() {
            return Err(TaskError::MissingTask);
        }
        match self.resolve(task) {
            Resolution::Matched(handler) => {
                info!(handler = handler.name(), task, "dispatching task");
                Self::execute(handler).await
            }
            Resolution::Unmatched => {
                info!(task, "no handler matched");
                Err(TaskError::UnsupportedTask)
            }
        }
    }
}
