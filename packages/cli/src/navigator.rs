use std::sync::{Mutex, PoisonError};
use tracing::debug;

use shared::services::navigation::{Navigator, Route};

/// Terminal stand-in for page navigation: remembers the last route so
/// commands can tell the user where the session ended up.
#[derive(Default)]
pub struct CliNavigator {
    last_route: Mutex<Option<Route>>,
}

impl CliNavigator {
    pub fn last_route(&self) -> Option<Route> {
        *self.last_route.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for CliNavigator {
    fn navigate(&self, route: Route) {
        debug!("Navigating to {}", route.path());
        *self.last_route.lock().unwrap_or_else(PoisonError::into_inner) = Some(route);
    }
}
