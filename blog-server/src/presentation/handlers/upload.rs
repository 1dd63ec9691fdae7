use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use tracing::info;

use crate::application::upload_service::UploadService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{IdQuery, SuccessResponse, UploadQuery, required};
use crate::presentation::utils::{AdminUser, request_id};

#[get("/upload")]
async fn list_files(uploads: web::Data<UploadService>) -> Result<HttpResponse, DomainError> {
    let files = uploads.list().await?;
    Ok(HttpResponse::Ok().json(files))
}

/// Raw-body upload: the file bytes are the request body, the name comes from
/// `?filename=` and the type from `Content-Type`.
#[post("/upload")]
async fn upload_file(
    req: HttpRequest,
    admin: AdminUser,
    uploads: web::Data<UploadService>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, DomainError> {
    let filename = required(query.into_inner().filename, "filename")?;
    let mime_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().trim().to_string())
        .unwrap_or_default();

    let file = uploads.upload(&filename, &mime_type, body.to_vec()).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        file_id = %file.id,
        "file uploaded"
    );

    Ok(HttpResponse::Created().json(file))
}

#[delete("/upload")]
async fn delete_file(
    req: HttpRequest,
    admin: AdminUser,
    uploads: web::Data<UploadService>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, DomainError> {
    let id = required(query.into_inner().id, "id")?;
    uploads.delete(&id).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        file_id = %id,
        "file deleted"
    );

    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}
