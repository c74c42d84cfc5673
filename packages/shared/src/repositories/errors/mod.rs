pub mod api_client_errors;
pub mod storage_errors;
