//! Drop-target validation.
//!
//! [`BasicConnectionValidator`] enforces the structural rules every pipe
//! must satisfy. Applications layer extra rules (type compatibility, no
//! duplicate pipes, ...) on top through [`ConnectionValidator`] and
//! [`CompositeValidator`]; the interaction controller always runs the basic
//! rules first.

use crate::graph::NodeGraph;
use crate::port::Port;
use std::fmt;

/// Result of link validation with optional rejection reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }

    pub fn err(self) -> Option<ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// Reasons a drop target is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Dropped back onto the port the drag started from
    SamePort,
    /// Both ports are inputs or both are outputs
    IncompatibleDirection,
    /// Both ports belong to one node
    SameNode,
    /// The two ports are already joined by a pipe
    DuplicatePipe,
    Custom(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SamePort => write!(f, "Cannot connect a port to itself"),
            Self::IncompatibleDirection => write!(f, "Must connect input to output"),
            Self::SameNode => write!(f, "Cannot connect ports on the same node"),
            Self::DuplicatePipe => write!(f, "Ports are already connected"),
            Self::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Rule deciding whether a pipe may run from `start` to `target`.
///
/// Closures of the shape `Fn(&NodeGraph, &Port, &Port) -> ValidationResult`
/// implement this trait.
pub trait ConnectionValidator {
    fn validate(&self, graph: &NodeGraph, start: &Port, target: &Port) -> ValidationResult;
}

impl<F> ConnectionValidator for F
where
    F: Fn(&NodeGraph, &Port, &Port) -> ValidationResult,
{
    fn validate(&self, graph: &NodeGraph, start: &Port, target: &Port) -> ValidationResult {
        self(graph, start, target)
    }
}

/// Structural rules, checked in order: same port, same direction, same node
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicConnectionValidator;

impl ConnectionValidator for BasicConnectionValidator {
    fn validate(&self, _graph: &NodeGraph, start: &Port, target: &Port) -> ValidationResult {
        if start.id() == target.id() {
            return ValidationResult::Invalid(ValidationError::SamePort);
        }
        if start.direction() == target.direction() {
            return ValidationResult::Invalid(ValidationError::IncompatibleDirection);
        }
        if start.node() == target.node() {
            return ValidationResult::Invalid(ValidationError::SameNode);
        }
        ValidationResult::Valid
    }
}

/// Rejects a second pipe between the same two ports
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(&self, graph: &NodeGraph, start: &Port, target: &Port) -> ValidationResult {
        let joined = start
            .attached_pipes()
            .iter()
            .filter_map(|&pipe| graph.pipe(pipe))
            .any(|pipe| pipe.other_end(start.id()) == Some(target.id()));
        if joined {
            ValidationResult::Invalid(ValidationError::DuplicatePipe)
        } else {
            ValidationResult::Valid
        }
    }
}

/// All validators must return Valid (AND logic); the first error wins.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validators are checked in the order they were added.
    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, graph: &NodeGraph, start: &Port, target: &Port) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(graph, start, target);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

/// Run the structural rules, then `extra`.
pub fn validate_drop(
    graph: &NodeGraph,
    start: &Port,
    target: &Port,
    extra: &dyn ConnectionValidator,
) -> ValidationResult {
    let basic = BasicConnectionValidator.validate(graph, start, target);
    if !basic.is_valid() {
        return basic;
    }
    extra.validate(graph, start, target)
}
