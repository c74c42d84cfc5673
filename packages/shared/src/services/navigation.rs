#[cfg(test)]
use mockall::automock;

pub const PUBLIC_ROUTES: [&str; 2] = ["/login", "/register"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
        }
    }
}

pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path)
}

pub fn is_admin_route(path: &str) -> bool {
    path.starts_with("/admin")
}

/// Moves the front end to another page.
#[cfg_attr(test, automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
