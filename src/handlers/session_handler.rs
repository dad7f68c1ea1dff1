use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{StartSessionRequest, SubmitAnswerRequest, SubmitBatchRequest},
};

#[post("/api/sessions")]
async fn start_session(
    state: web::Data<AppState>,
    request: web::Json<StartSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state
        .session_service
        .start_session(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(session))
}

#[get("/api/sessions/{id}")]
async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = state.session_service.get_session(&id).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// Enters the round on first call; later calls poll it and apply the timeout.
#[get("/api/sessions/{id}/rounds/{round}")]
async fn enter_round(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (id, round) = path.into_inner();
    let view = state.session_service.enter_round(&id, &round).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/rounds/{round}/answer")]
async fn submit_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<SubmitAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let (id, round) = path.into_inner();
    let response = state
        .session_service
        .submit_answer(&id, &round, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/sessions/{id}/rounds/{round}/submit")]
async fn submit_batch(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<SubmitBatchRequest>,
) -> Result<HttpResponse, AppError> {
    let (id, round) = path.into_inner();
    let response = state
        .session_service
        .submit_batch(&id, &round, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/sessions/{id}/rounds/{round}/complete")]
async fn complete_round(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (id, round) = path.into_inner();
    let session = state.session_service.complete_round(&id, &round).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[get("/api/sessions/{id}/report")]
async fn get_report(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let report = state.session_service.report(&id).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("/api/sessions/{id}/restart")]
async fn restart_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = state.session_service.restart(&id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[get("/api/sessions/{id}/audio")]
async fn get_audio(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let asset = state.session_service.audio(&id).await?;
    let bytes = tokio::fs::read(&asset.path).await.map_err(|e| {
        log::warn!("Listening audio {} unreadable: {}", asset.path.display(), e);
        AppError::NotFound(format!("No listening audio for session '{}'", id))
    })?;

    Ok(HttpResponse::Ok()
        .content_type(asset.content_type)
        .body(bytes))
}
