use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use tracing::info;

use crate::application::category_service::CategoryService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CategoryRequest, IdQuery, SuccessResponse, required};
use crate::presentation::utils::{AdminUser, request_id};

#[get("/category")]
async fn get_categories(
    categories: web::Data<CategoryService>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, DomainError> {
    match query.into_inner().id {
        Some(id) => Ok(HttpResponse::Ok().json(categories.get(&id).await?)),
        None => Ok(HttpResponse::Ok().json(categories.list().await?)),
    }
}

#[post("/category")]
async fn create_category(
    req: HttpRequest,
    admin: AdminUser,
    categories: web::Data<CategoryService>,
    payload: web::Json<CategoryRequest>,
) -> Result<HttpResponse, DomainError> {
    let name = required(payload.into_inner().name, "name")?;
    let category = categories.create(&name).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        category_id = %category.id,
        "category created"
    );

    Ok(HttpResponse::Created().json(category))
}

#[put("/category")]
async fn update_category(
    req: HttpRequest,
    admin: AdminUser,
    categories: web::Data<CategoryService>,
    payload: web::Json<CategoryRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    let id = required(payload.id, "id")?;
    let name = required(payload.name, "name")?;
    let category = categories.update(&id, &name).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        category_id = %category.id,
        "category updated"
    );

    Ok(HttpResponse::Ok().json(category))
}

#[delete("/category")]
async fn delete_category(
    req: HttpRequest,
    admin: AdminUser,
    categories: web::Data<CategoryService>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, DomainError> {
    let id = required(query.into_inner().id, "id")?;
    categories.delete(&id).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        category_id = %id,
        "category deleted"
    );

    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}
