use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde_json::json;
use tracing::info;

use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::domain::pagination::PAGE_SIZE;
use crate::domain::post::NewPost;
use crate::presentation::dto::{
    CreatePostRequest, IdQuery, LimitQuery, PostDetailResponse, PostsQuery, SearchQuery,
    SuccessResponse, TagsQuery, UpdatePostRequest, required,
};
use crate::presentation::utils::{AdminUser, Caller, request_id};

const DEFAULT_POPULAR: usize = 5;

#[get("/posts")]
async fn get_posts(
    req: HttpRequest,
    caller: Caller,
    posts: web::Data<PostService>,
    query: web::Query<PostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let query = query.into_inner();
    let include_drafts =
        caller.0.is_admin() && query.status.as_deref().is_some_and(|s| s == "all");

    if let Some(id) = query.id {
        let post = posts.get_post(&id).await?;
        if !post.is_published() && !caller.0.is_admin() {
            return Err(DomainError::PostNotFound(id));
        }
        return Ok(HttpResponse::Ok().json(post));
    }

    if let Some(slug) = query.slug {
        let post = posts
            .get_post_by_slug(&slug, caller.0.is_admin())
            .await?;
        let related = match query.related {
            Some(limit) => posts.related_posts(&post, limit).await?,
            None => Vec::new(),
        };
        return Ok(HttpResponse::Ok().json(PostDetailResponse { post, related }));
    }

    let page = query.page.unwrap_or(1);
    let result = match query.category {
        Some(category) => posts.posts_in_category(&category, page).await?,
        None => posts.list_posts(page, include_drafts).await?,
    };

    info!(
        request_id = %request_id(&req),
        page = result.page,
        returned = result.posts.len(),
        total = result.total,
        "posts retrieved"
    );

    Ok(HttpResponse::Ok().json(result))
}

#[post("/posts")]
async fn create_post(
    req: HttpRequest,
    admin: AdminUser,
    posts: web::Data<PostService>,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.create_post(NewPost::from(payload.into_inner())).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        post_id = %post.id,
        slug = %post.slug,
        "post created"
    );

    Ok(HttpResponse::Created().json(post))
}

#[put("/posts")]
async fn update_post(
    req: HttpRequest,
    admin: AdminUser,
    posts: web::Data<PostService>,
    payload: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let (id, patch) = payload.into_inner().into_parts();
    let id = required(id, "id")?;
    let post = posts.update_post(&id, patch).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        post_id = %post.id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(post))
}

#[delete("/posts")]
async fn delete_post(
    req: HttpRequest,
    admin: AdminUser,
    posts: web::Data<PostService>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, DomainError> {
    let id = required(query.into_inner().id, "id")?;
    posts.delete_post(&id).await?;

    info!(
        request_id = %request_id(&req),
        user = %admin.0.email,
        post_id = %id,
        "post deleted"
    );

    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}

#[get("/posts/search")]
async fn search_posts(
    req: HttpRequest,
    posts: web::Data<PostService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, DomainError> {
    let q = required(query.into_inner().q, "q")?;
    let results = posts.search_posts(&q).await?;

    info!(
        request_id = %request_id(&req),
        returned = results.len(),
        "search served"
    );

    Ok(HttpResponse::Ok().json(json!({ "posts": results, "total": results.len() })))
}

#[get("/posts/tags")]
async fn get_tags(
    posts: web::Data<PostService>,
    query: web::Query<TagsQuery>,
) -> Result<HttpResponse, DomainError> {
    let query = query.into_inner();
    match query.tag.filter(|t| !t.trim().is_empty()) {
        Some(tag) => {
            let page = posts
                .posts_by_tag(
                    &tag,
                    query.page.unwrap_or(1),
                    query.limit.unwrap_or(PAGE_SIZE),
                )
                .await?;
            Ok(HttpResponse::Ok().json(page))
        }
        None => Ok(HttpResponse::Ok().json(json!({ "tags": posts.tags().await? }))),
    }
}

#[get("/posts/popular")]
async fn popular_posts(
    posts: web::Data<PostService>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, DomainError> {
    let popular = posts
        .popular_posts(query.limit.unwrap_or(DEFAULT_POPULAR))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "posts": popular })))
}
