use thiserror::Error;

/// Failure taxonomy of the report core. Handlers map each variant to a
/// distinct HTTP response; none of these are retried.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested department does not exist. Distinct from an existing
    /// department that merely has nothing to report.
    #[error("department '{0}' not found")]
    DepartmentNotFound(String),

    /// Queries succeeded but produced nothing to render.
    #[error("no attendance or leave data for the requested period")]
    NoData,

    #[error("store query failed: {0}")]
    Store(#[from] sqlx::Error),

    #[error("document rendering failed: {0}")]
    Render(String),
}
