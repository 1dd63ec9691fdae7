use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::application::access_service::AccessService;
use crate::application::ai_service::AiService;
use crate::application::category_service::CategoryService;
use crate::application::post_service::PostService;
use crate::application::upload_service::UploadService;
use crate::application::video_service::VideoService;
use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::PostRepository;
use crate::data::store::{DocumentStore, FileStorage, SessionProvider};
use crate::domain::error::{DomainError, ErrorBody};
use crate::domain::session::SessionUser;
use crate::infrastructure::analytics::AnalyticsClient;
use crate::infrastructure::appwrite::AppwriteClient;
use crate::infrastructure::config::{AppConfig, BackendKind};
use crate::infrastructure::memory::InMemoryBackend;
use crate::infrastructure::youtube::YoutubeClient;
use crate::presentation::handlers;
use crate::presentation::middleware::{AccessMiddleware, RequestIdMiddleware, TimingMiddleware};

/// The three backend seams, backed by one provider.
#[derive(Clone)]
pub struct Backend {
    pub documents: Arc<dyn DocumentStore>,
    pub files: Arc<dyn FileStorage>,
    pub sessions: Arc<dyn SessionProvider>,
}

impl Backend {
    pub fn appwrite(client: AppwriteClient) -> Self {
        let client = Arc::new(client);
        Self {
            documents: client.clone(),
            files: client.clone(),
            sessions: client,
        }
    }

    pub fn in_memory(store: Arc<InMemoryBackend>) -> Self {
        Self {
            documents: store.clone(),
            files: store.clone(),
            sessions: store,
        }
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        match (config.backend, &config.appwrite) {
            (BackendKind::Appwrite, Some(appwrite)) => {
                info!(endpoint = %appwrite.endpoint, "using appwrite backend");
                Ok(Self::appwrite(AppwriteClient::new(appwrite.clone())?))
            }
            (BackendKind::Appwrite, None) => Err(DomainError::Upstream(
                "appwrite backend selected without appwrite settings".into(),
            )),
            (BackendKind::Memory, _) => {
                info!("using in-memory backend");
                let store = Arc::new(InMemoryBackend::new());
                if let Ok(token) = std::env::var("DEV_ADMIN_TOKEN") {
                    store
                        .add_session(
                            &token,
                            SessionUser {
                                id: "dev-admin".into(),
                                email: "admin@localhost".into(),
                                email_verified: true,
                            },
                            vec![config.admin_team_id.clone()],
                        )
                        .await;
                }
                Ok(Self::in_memory(store))
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub posts: web::Data<PostService>,
    pub categories: web::Data<CategoryService>,
    pub uploads: web::Data<UploadService>,
    pub access: web::Data<AccessService>,
    pub videos: web::Data<VideoService>,
    pub ai: web::Data<AiService>,
}

impl AppState {
    pub fn new(backend: Backend, config: &AppConfig) -> Self {
        let posts = PostRepository::new(backend.documents.clone(), &config.posts_collection);
        let categories =
            CategoryRepository::new(backend.documents.clone(), &config.categories_collection);

        Self {
            posts: web::Data::new(PostService::new(
                posts,
                categories.clone(),
                config.analytics.clone().map(AnalyticsClient::new),
            )),
            categories: web::Data::new(CategoryService::new(categories)),
            uploads: web::Data::new(UploadService::new(backend.files)),
            access: web::Data::new(AccessService::new(
                backend.sessions,
                config.admin_team_id.clone(),
                config.policy.clone(),
            )),
            videos: web::Data::new(VideoService::new(
                config.youtube.clone().map(YoutubeClient::new),
            )),
            ai: web::Data::new(AiService::new(config.ai.clone())),
        }
    }

    /// Registers shared services, extractor error handling and every `/api` route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.posts.clone())
            .app_data(self.categories.clone())
            .app_data(self.uploads.clone())
            .app_data(self.access.clone())
            .app_data(self.videos.clone())
            .app_data(self.ai.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                DomainError::Validation(format!("invalid JSON body: {err}")).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                DomainError::Validation(format!("invalid query: {err}")).into()
            }))
            .app_data(web::PayloadConfig::new(
                crate::application::upload_service::MAX_UPLOAD_BYTES + 1024,
            ))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health))
                    .service(handlers::post::search_posts)
                    .service(handlers::post::get_tags)
                    .service(handlers::post::popular_posts)
                    .service(handlers::post::get_posts)
                    .service(handlers::post::create_post)
                    .service(handlers::post::update_post)
                    .service(handlers::post::delete_post)
                    .service(handlers::category::get_categories)
                    .service(handlers::category::create_category)
                    .service(handlers::category::update_category)
                    .service(handlers::category::delete_category)
                    .service(handlers::upload::list_files)
                    .service(handlers::upload::upload_file)
                    .service(handlers::upload::delete_file)
                    .service(handlers::media::latest_videos)
                    .service(handlers::media::suggest),
            );
    }
}

/// The full application: middleware stack, routes and the 404 fallback.
pub fn build_app(
    config: &AppConfig,
    state: &AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .wrap(AccessMiddleware::new(&config.session_cookie))
        .wrap(TimingMiddleware)
        .wrap(RequestIdMiddleware)
        .wrap(
            DefaultHeaders::new()
                .add(("X-Content-Type-Options", "nosniff"))
                .add(("Referrer-Policy", "no-referrer"))
                .add(("Permissions-Policy", "geolocation=()"))
                .add(("Cross-Origin-Opener-Policy", "same-origin")),
        )
        .wrap(build_cors(config))
        .configure(|cfg| state.configure(cfg))
        .default_service(web::to(not_found))
}

pub async fn start_rest_server(config: AppConfig, state: AppState) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);
    info!(
        host = %bind_address.0,
        port = bind_address.1,
        "HTTP server starting"
    );

    HttpServer::new(move || build_app(&config, &state))
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody { error: "not found" })
}
