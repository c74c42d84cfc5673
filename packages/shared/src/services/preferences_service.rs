use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::repositories::errors::storage_errors::StorageError;
use crate::repositories::storage::{ClientStorage, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

pub struct Preferences {
    storage: Arc<dyn ClientStorage>,
}

impl Preferences {
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Preferences { storage }
    }

    /// Stored theme, falling back to light for missing or unknown values.
    pub fn theme(&self) -> Result<Theme, StorageError> {
        let stored = self.storage.get(THEME_KEY)?;
        Ok(stored
            .and_then(|value| value.parse().ok())
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        debug!("Theme set to {}", theme);
        self.storage.set(THEME_KEY, &theme.to_string())
    }
}
