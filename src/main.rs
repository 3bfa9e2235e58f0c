//src/main.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;

use crate::config::AppState;
use crate::middleware::{auth::auth_guard, tenancy::tenant_guard};
use crate::services::attachment_service::MAX_UPLOAD_BYTES;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas que precisam só de autenticação (ainda sem tenant resolvido)
    let auth_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .route("/tenants/current", get(handlers::tenancy::get_current_tenant))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas de tenant: auth_guard + tenant_guard, nessa ordem
    let tenant_routes = Router::new()
        .route("/locations"
               ,post(handlers::tenancy::create_location)
               .get(handlers::tenancy::list_locations)
        )
        .route("/posts"
               ,post(handlers::posts::create_post)
               .get(handlers::posts::list_posts)
        )
        .route("/posts/{postId}", get(handlers::posts::get_post))
        .route("/posts/{postId}/comments"
               ,post(handlers::posts::create_comment)
               .get(handlers::posts::list_comments)
        )
        .route("/posts/{postId}/reactions", post(handlers::posts::react))
        .route("/posts/{postId}/read", post(handlers::posts::mark_read))
        .route("/requests"
               ,post(handlers::requests::create_request)
               .get(handlers::requests::list_requests)
        )
        .route("/requests/{requestId}/submissions"
               ,post(handlers::requests::submit_request)
        )
        .route(
            "/attachments/{attachmentId}/download",
            get(handlers::attachments::download),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Upload em rota própria por causa do limite de corpo maior
    let upload_routes = Router::new()
        .route("/uploads", post(handlers::attachments::upload))
        // Folga sobre os 50MB do arquivo para os demais campos do multipart
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Endpoints de processo: autenticados por segredo compartilhado,
    // sem passar pelos guards de usuário/tenant
    let internal_routes = Router::new()
        .route("/internal/scan-results", post(handlers::internal::scan_results))
        .route("/internal/overdue-sweep", post(handlers::internal::overdue_sweep));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", auth_routes)
        .nest("/api", tenant_routes)
        .nest("/api", upload_routes)
        .nest("/api", internal_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
