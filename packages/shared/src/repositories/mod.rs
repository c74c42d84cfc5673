pub mod admin_repository;
pub mod api_client;
pub mod auth_repository;
pub mod category_repository;
pub mod errors;
pub mod expense_repository;
pub mod linking_repository;
pub mod profile_repository;
pub mod salary_repository;
pub mod storage;
