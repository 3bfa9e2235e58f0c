pub mod attachment_repo;
pub use attachment_repo::AttachmentRepository;
pub mod post_repo;
pub use post_repo::PostRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenancyRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
