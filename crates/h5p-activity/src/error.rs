use site_ws::WsError;

/// Convenience alias for activity operation results.
pub type ActivityResult<T> = Result<T, ActivityError>;

// Error type for activity lookups and file resolution
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    /// A lookup matched no activity. Carries the user-facing message,
    /// already localized.
    #[error("{0}")]
    NotFound(String),

    /// The activity record has no package file to deploy. This is a
    /// broken record, not a transient site problem.
    #[error("Activity carries no H5P package file")]
    MissingPackage,

    /// Failure in the underlying web service stack, passed through
    /// unchanged.
    #[error("Web service error: {0}")]
    Ws(#[from] WsError),
}

impl ActivityError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ActivityError::NotFound(_))
    }
}
