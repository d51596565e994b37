//! Error types for stepgen
//!
//! Two families of failure exist. Descriptor and I/O errors mean the input
//! could not be read at all. Validation errors are structural defects in an
//! otherwise well-formed unit; each one names a [`ErrorKind`] from a fixed
//! catalog and the element it was found on.

use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// stepgen errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Descriptor error: {0}")]
    Descriptor(String),

    #[error("Type parse error: {0}")]
    TypeParse(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl Error {
    /// The validation kind, if this is a validation failure
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Validation(v) => Some(v.kind),
            _ => None,
        }
    }
}

/// A structural defect bound to one offending element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ErrorKind,
    /// Human-readable path of the element, e.g. `Cube#<init>(String)`
    pub element: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, element: impl Into<String>) -> Self {
        Self {
            kind,
            element: element.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.element, self.kind.message())
    }
}

impl std::error::Error for ValidationError {}

/// Shorthand for failing with a validation error
pub(crate) fn invalid<T>(kind: ErrorKind, element: impl Into<String>) -> Result<T> {
    Err(Error::Validation(ValidationError::new(kind, element)))
}

/// Catalog of validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PrivateMethod,
    PrivateType,
    NestingKind,
    NotEnoughParameters,
    GoalNotInBuild,
    DuplicateGoalName,
    InvalidGoalName,
    AbstractConstructor,
    NoProjection,
    UpdaterInstanceMethod,
    UpdaterVoidGoal,
    StepPosition,
    BeanCouldNotFindSetter,
    BeanGetterException,
    BeanSetterException,
    BeanGetterSetterTypeMismatch,
    BeanIgnoreAndStep,
    BeanNoAccessorPairs,
    BeanNoDefaultConstructor,
    BeanPrivateClass,
    StepOnSetter,
    IgnoreOnSetter,
    DuplicateGeneratedType,
}

impl ErrorKind {
    /// Fixed message template
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::PrivateMethod => "goal may not be private",
            ErrorKind::PrivateType => "class may not be private",
            ErrorKind::NestingKind => "nested class must be static",
            ErrorKind::NotEnoughParameters => "goal must have at least one parameter",
            ErrorKind::GoalNotInBuild => "goal is not in a class marked for building",
            ErrorKind::DuplicateGoalName => "duplicate goal name",
            ErrorKind::InvalidGoalName => "goal name is not a valid identifier",
            ErrorKind::AbstractConstructor => "abstract type has no constructor goal",
            ErrorKind::NoProjection => "could not find projection",
            ErrorKind::UpdaterInstanceMethod => {
                "updater is not available for instance method goals"
            }
            ErrorKind::UpdaterVoidGoal => "updater is not available for void goals",
            ErrorKind::StepPosition => "step positions must be unique and within range",
            ErrorKind::BeanCouldNotFindSetter => "could not find setter",
            ErrorKind::BeanGetterException => "getter declares exceptions",
            ErrorKind::BeanSetterException => "setter declares exceptions",
            ErrorKind::BeanGetterSetterTypeMismatch => "getter and setter types differ",
            ErrorKind::BeanIgnoreAndStep => "property may not be both ignored and a step",
            ErrorKind::BeanNoAccessorPairs => "no accessor pairs found",
            ErrorKind::BeanNoDefaultConstructor => {
                "bean needs a visible no-argument constructor"
            }
            ErrorKind::BeanPrivateClass => "bean class may not be private",
            ErrorKind::StepOnSetter => "step marker belongs on the getter",
            ErrorKind::IgnoreOnSetter => "ignore marker belongs on the getter",
            ErrorKind::DuplicateGeneratedType => "generated type name already used in this build",
        }
    }
}
