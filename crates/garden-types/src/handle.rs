use crate::error::GardenError;

/// An opaque, non-empty, unique-across-live-containers identifier.
///
/// Plain `String` rather than a newtype: a handle has no format beyond
/// uniqueness and case-sensitivity, and every collaborator trait already
/// deals in owned strings, so a wrapper type would only add `.0` noise at
/// every call site.
pub type Handle = String;

/// Rejects the empty handle. Callers that let the orchestrator generate a
/// handle never hit this path; it only guards the case where a caller
/// explicitly supplies one.
pub fn validate_handle(handle: &str) -> Result<(), GardenError> {
    if handle.is_empty() {
        return Err(GardenError::invalid_input("handle must not be empty"));
    }
    Ok(())
}
