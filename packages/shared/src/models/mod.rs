pub mod auth;
pub mod category;
pub mod expense;
pub mod formats;
pub mod month;
pub mod salary;
pub mod user;
