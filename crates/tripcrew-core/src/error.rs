//! Error taxonomy for trip planning.

/// Errors raised while building inference configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("inference credential missing: set {var}")]
    MissingCredential { var: String },

    #[error("inference credential for {var} is blank")]
    BlankCredential { var: String },

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    #[error("temperature {0} is outside [0.0, 2.0]")]
    TemperatureOutOfRange(f32),

    #[error("model name must not be empty")]
    EmptyModel,
}

/// Errors raised by an execution engine while running a task batch.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("http error: {0}")]
    Http(String),

    #[error("inference service returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("failed to decode inference response: {0}")]
    Decode(String),

    #[error("task {task} produced an empty response")]
    EmptyResponse { task: String },

    #[error("task {task} needs output of {upstream}, which has not run")]
    MissingContext { task: String, upstream: String },

    #[error("task {task} failed: {message}")]
    Inference { task: String, message: String },
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Http(err.to_string())
    }
}

/// Top-level errors surfaced to callers of the crew.
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("invalid trip input: {0}")]
    InvalidInput(String),

    #[error("invalid task batch: {0}")]
    InvalidBatch(String),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Result type for trip planning operations.
pub type Result<T> = std::result::Result<T, TripError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_the_variable() {
        let err = TripError::from(ConfigError::MissingCredential {
            var: "GOOGLE_API_KEY".to_string(),
        });
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_engine_error_is_surfaced_verbatim() {
        let err = TripError::from(EngineError::Status {
            code: 503,
            body: "overloaded".to_string(),
        });
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
    }

    #[test]
    fn test_missing_context_error_names_both_tasks() {
        let err = EngineError::MissingContext {
            task: "budget".to_string(),
            upstream: "itinerary".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("budget"));
        assert!(msg.contains("itinerary"));
    }
}
