pub mod attachment_service;
pub mod auth;
pub mod post_service;
pub mod request_service;
pub mod targeting;
pub mod tenancy_service;
