use crate::error::DomainResult;

/// Boundary validation for payloads whose shape serde alone cannot express.
///
/// Implemented by the typed document shapes and by request DTOs; callers run
/// it once, right after deserialization.
pub trait Validate {
    fn validate(&self) -> DomainResult<()>;
}
