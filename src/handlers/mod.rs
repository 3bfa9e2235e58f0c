// src/handlers/mod.rs

pub mod attachments;
pub mod auth;
pub mod internal;
pub mod posts;
pub mod requests;
pub mod tenancy;
