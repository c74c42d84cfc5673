pub mod category_service_errors;
pub mod ledger_service_errors;
pub mod profile_service_errors;
pub mod session_service_errors;
