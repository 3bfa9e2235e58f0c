// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::get_me,

        // --- Tenancy ---
        handlers::tenancy::get_current_tenant,
        handlers::tenancy::list_locations,
        handlers::tenancy::create_location,

        // --- Posts ---
        handlers::posts::list_posts,
        handlers::posts::create_post,
        handlers::posts::get_post,
        handlers::posts::create_comment,
        handlers::posts::list_comments,
        handlers::posts::react,
        handlers::posts::mark_read,

        // --- Requests ---
        handlers::requests::list_requests,
        handlers::requests::create_request,
        handlers::requests::submit_request,

        // --- Attachments ---
        handlers::attachments::upload,
        handlers::attachments::download,

        // --- Internal ---
        handlers::internal::scan_results,
        handlers::internal::overdue_sweep,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::CurrentUser,

            // --- Tenancy ---
            models::tenancy::TenantStatus,
            models::tenancy::Tenant,
            models::tenancy::MembershipRole,
            models::tenancy::MembershipStatus,
            models::tenancy::Membership,
            models::tenancy::LocationStatus,
            models::tenancy::Location,
            handlers::tenancy::CreateLocationPayload,

            // --- Posts ---
            models::posts::PostType,
            models::posts::PostStatus,
            models::posts::Targeting,
            models::posts::Post,
            models::posts::Comment,
            models::posts::ReactionType,
            models::posts::Reaction,
            models::posts::ReadReceipt,
            handlers::posts::CreatePostPayload,
            handlers::posts::CreateCommentPayload,
            handlers::posts::ReactionPayload,

            // --- Requests ---
            models::requests::FieldType,
            models::requests::RequestFieldDef,
            models::requests::CompletionStats,
            models::requests::RequestStatus,
            models::requests::DataRequest,
            models::requests::RequestSubmission,
            handlers::requests::CreateRequestPayload,
            handlers::requests::SubmitRequestPayload,

            // --- Attachments ---
            models::attachments::VirusScanStatus,
            models::attachments::Attachment,

            // --- Internal ---
            handlers::internal::ScanResultPayload,
            handlers::internal::OverdueSweepPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Perfil do usuário autenticado"),
        (name = "Tenancy", description = "Tenants, memberships e unidades"),
        (name = "Posts", description = "Feed, comentários, reações e recibos de leitura"),
        (name = "Requests", description = "Coleta estruturada de dados das unidades"),
        (name = "Attachments", description = "Upload e download gateado por antivírus"),
        (name = "Internal", description = "Callbacks de processos (scanner e agendador)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
