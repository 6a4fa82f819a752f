use serde::{Deserialize, Serialize};
use serde_json::Value;

// GET /auth/login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub auth_url: String,
}

// GET /auth/callback
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// GET /auth/logout
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

// GET /auth/me
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub authenticated: bool,
}

// GET /hubs and the other hierarchy routes
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse {
    pub data: Vec<Value>,
}

// Health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
