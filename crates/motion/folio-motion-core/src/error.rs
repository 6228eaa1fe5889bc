//! Error type for authoring-time failures (parsing and validating specs).
//!
//! Runtime problems never surface here: a missing element or a degenerate
//! trigger region degrades to a static appearance instead.

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionError {
    #[error("unknown ease '{0}'")]
    UnknownEase(String),

    #[error("invalid trigger edge '{0}' (expected e.g. \"top 85%\")")]
    InvalidEdge(String),

    #[error("invalid timeline position '{0}'")]
    InvalidPosition(String),

    #[error("invalid stagger: {0}")]
    InvalidStagger(String),

    #[error("tween duration must be finite and >= 0 (got {0})")]
    InvalidDuration(f32),

    #[error("section '{0}' is already mounted")]
    DuplicateSection(String),

    #[error("section spec '{section}': {reason}")]
    InvalidSection { section: String, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = MotionError> = std::result::Result<T, E>;
