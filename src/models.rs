use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "TR001")]
    pub staff_code: String,
    #[schema(example = "secret")]
    pub password: String,
}

#[derive(FromRow)]
pub struct StaffSql {
    pub staff_code: String,
    pub password: String,
    pub cname: String,
    pub ename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Staff code, uppercase
    pub sub: String,
    /// Display name shown in the UI after login
    pub name: String,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
