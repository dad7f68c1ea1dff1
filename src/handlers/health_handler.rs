use actix_web::{get, HttpResponse};

use crate::models::dto::response::HealthResponse;

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[get("/health/live")]
async fn health_check_live() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive",
        version: env!("CARGO_PKG_VERSION"),
    })
}
