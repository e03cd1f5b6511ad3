use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of the HR staff table as listed for the calendar grid view.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Staff {
    #[schema(example = "TR001")]
    pub staff_code: String,
    /// Chinese display name, may be blank
    pub cname: String,
    /// English display name, may be blank
    pub ename: String,
    #[schema(example = "TRANS")]
    pub dept: String,
}
