use grail_core::PlanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("device error: {0}")]
    Device(String),
    #[error("vision error: {0}")]
    Vision(String),
    #[error("plan error: {0}")]
    Plan(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl From<PlanError> for AgentError {
    fn from(value: PlanError) -> Self {
        Self::Plan(value.to_string())
    }
}

impl From<std::io::Error> for AgentError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
