pub mod attachments;
pub mod auth;
pub mod posts;
pub mod requests;
pub mod tenancy;
