use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Department row of the time-clock store.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    pub id: u64,
    pub name: String,
}
