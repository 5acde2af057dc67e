pub mod dispatch;
pub mod resolver;

use async_trait::async_trait;
use thiserror::Error;

use crate::handlers::TaskReply;

/// Why a task did not produce a handler reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Missing task description")]
    MissingTask,
    #[error("Task not supported")]
    UnsupportedTask,
    /// Anything the handler raised, already rendered to text.
    #[error("{0}")]
    HandlerFault(String),
}

impl TaskError {
    /// HTTP-style status for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingTask | Self::UnsupportedTask => 400,
            Self::HandlerFault(_) => 500,
        }
    }
}

impl From<TaskError> for TaskReply {
    fn from(err: TaskError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

/// The outermost boundary. The HTTP adapter and the CLI only know this trait.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn run(&self, task: &str) -> Result<TaskReply, TaskError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_400() {
        assert_eq!(TaskError::MissingTask.status(), 400);
        assert_eq!(TaskError::UnsupportedTask.status(), 400);
    }

    #[test]
    fn faults_are_500_with_their_message() {
        let reply = TaskReply::from(TaskError::HandlerFault("disk full".to_string()));
        assert_eq!(reply.status, 500);
        assert_eq!(reply.message, "disk full");
    }

    #[test]
    fn client_error_messages() {
        assert_eq!(
            TaskReply::from(TaskError::MissingTask).message,
            "Missing task description"
        );
        assert_eq!(
            TaskReply::from(TaskError::UnsupportedTask).message,
            "Task not supported"
        );
    }
}
