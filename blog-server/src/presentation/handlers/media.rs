use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;
use tracing::info;

use crate::application::ai_service::{AiService, SuggestionKind};
use crate::application::video_service::VideoService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{SuggestionRequest, SuggestionResponse, YoutubeQuery, required};
use crate::presentation::utils::{AdminUser, request_id};

#[get("/youtube")]
async fn latest_videos(
    videos: web::Data<VideoService>,
    query: web::Query<YoutubeQuery>,
) -> Result<HttpResponse, DomainError> {
    let videos = videos.latest(query.max_results).await?;
    Ok(HttpResponse::Ok().json(json!({ "videos": videos })))
}

#[post("/ai/{kind}")]
async fn suggest(
    req: HttpRequest,
    admin: AdminUser,
    ai: web::Data<AiService>,
    kind: web::Path<String>,
    payload: web::Json<SuggestionRequest>,
) -> Result<HttpResponse, DomainError> {
    let kind = kind.into_inner();
    let kind = SuggestionKind::parse(&kind)
        .ok_or_else(|| DomainError::Validation(format!("unknown suggestion kind: {kind}")))?;
    let content = required(payload.into_inner().content, "content")?;
    let suggestion = ai.suggest(kind, &content).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        kind = ?kind,
        "suggestion served"
    );

    Ok(HttpResponse::Ok().json(SuggestionResponse { suggestion }))
}
