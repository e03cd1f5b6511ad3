pub mod attendance;
pub mod error;
pub mod grid;
pub mod holidays;
pub mod leave;
pub mod leave_codes;

pub use error::ReportError;
