use std::fmt;

/// Errors surfaced by the orchestrator and its collaborators.
///
/// `Collaborator` is the catch-all: it carries whatever error a downstream
/// component produced, tagged with the call site that observed it, so the
/// orchestrator never has to know the concrete error type of any of its
/// five capability traits.
#[derive(Debug, thiserror::Error)]
pub enum GardenError {
    #[error("handle '{handle}' is already in use")]
    HandleConflict { handle: String },

    #[error("no such container: {handle}")]
    NotFound { handle: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("{location}: {source}")]
    Collaborator {
        location: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl GardenError {
    pub fn handle_conflict(handle: impl Into<String>) -> Self {
        GardenError::HandleConflict {
            handle: handle.into(),
        }
    }

    pub fn not_found(handle: impl Into<String>) -> Self {
        GardenError::NotFound {
            handle: handle.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        GardenError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn collaborator<E>(location: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GardenError::Collaborator {
            location,
            source: Box::new(source),
        }
    }
}

/// Extension trait used at every collaborator call site to attach a
/// location tag without writing `.map_err(|e| GardenError::collaborator(...))`
/// out by hand each time.
pub trait CollaboratorResultExt<T> {
    fn at(self, location: &'static str) -> Result<T, GardenError>;
}

impl<T, E> CollaboratorResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn at(self, location: &'static str) -> Result<T, GardenError> {
        self.map_err(|e| GardenError::collaborator(location, e))
    }
}

/// A boxed, string-only error for test doubles and the mount helper, where a
/// full [`std::error::Error`] impl would be pure ceremony.
#[derive(Debug)]
pub struct SimpleError(pub String);

impl fmt::Display for SimpleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

impl SimpleError {
    pub fn new(message: impl Into<String>) -> Self {
        SimpleError(message.into())
    }
}
