pub mod admin_service;
pub mod category_service;
pub mod context;
pub mod errors;
pub mod expense_service;
pub mod ledger_views;
pub mod navigation;
pub mod preferences_service;
pub mod profile_service;
pub mod session_service;
