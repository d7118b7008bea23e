use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    database::Database,
    http_server::{
        routes::{
            dashboard, files, media, members, personal_logs, practice_logs, songs, suggestions,
        },
        schema::MessageResponse,
        state::AppState,
    },
    uploads::UploadStore,
};

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Database,
    pub uploads: UploadStore,
    pub config: Config,
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Band Archive API is running!"))
}

fn cors_layer(config: &Config) -> color_eyre::Result<CorsLayer> {
    let origins = config.cors_origins();
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .wrap_err_with(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect::<color_eyre::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

pub fn router(app_state: Arc<AppState>) -> color_eyre::Result<Router> {
    let cors_layer = cors_layer(&app_state.config)?;
    let body_limit = app_state.config.max_upload_bytes();

    let app = Router::new()
        .route("/", get(root))
        .route(
            "/songs",
            get(songs::list_songs).post(songs::create_song),
        )
        .route(
            "/songs/{id}",
            get(songs::get_song)
                .put(songs::update_song)
                .delete(songs::delete_song),
        )
        .route("/songs/{id}/upload", post(songs::upload_sheet_music))
        .route(
            "/songs/{id}/media",
            get(songs::list_media).post(songs::add_media),
        )
        .route("/media/{id}/rename", put(media::rename_media))
        .route("/media/{id}", delete(media::delete_media))
        .route(
            "/songs/{song_id}/practice-logs",
            get(practice_logs::list_practice_logs).post(practice_logs::create_practice_log),
        )
        .route(
            "/practice-logs/{id}",
            get(practice_logs::get_practice_log)
                .put(practice_logs::update_practice_log)
                .delete(practice_logs::delete_practice_log),
        )
        .route(
            "/practice-logs/{id}/upload",
            post(practice_logs::upload_recording),
        )
        .route(
            "/members",
            get(members::list_members).post(members::create_member),
        )
        .route(
            "/members/{id}",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        .route(
            "/members/{id}/logs",
            get(personal_logs::list_personal_logs).post(personal_logs::create_personal_log),
        )
        .route(
            "/personal-logs/{id}",
            delete(personal_logs::delete_personal_log),
        )
        .route(
            "/suggestions",
            get(suggestions::list_suggestions).post(suggestions::create_suggestion),
        )
        .route(
            "/suggestions/{id}",
            delete(suggestions::delete_suggestion),
        )
        .route("/suggestions/{id}/vote", post(suggestions::vote_suggestion))
        .route("/dashboard/stats", get(dashboard::dashboard_stats))
        .route("/uploads/personal_logs/{filename}", get(files::personal_log_file))
        .route("/uploads/{filename}", get(files::upload_file))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state);

    Ok(app)
}

pub async fn start(
    HttpServerConfig {
        port,
        database,
        uploads,
        config,
    }: HttpServerConfig,
) -> color_eyre::Result<()> {
    let app_state = Arc::new(AppState {
        db: Arc::new(database),
        uploads: Arc::new(uploads),
        config,
    });

    let app = router(app_state)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
