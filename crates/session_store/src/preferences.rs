use crate::error::SessionStoreError;
use crate::store::SessionStore;

/// Persisted key holding the light/dark preference.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Only the exact value `"dark"` selects the dark theme.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl SessionStore {
    #[must_use]
    pub fn theme(&self) -> Theme {
        Theme::from_stored(self.kv.get(THEME_KEY).as_deref())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), SessionStoreError> {
        self.kv.set(THEME_KEY, theme.as_str())
    }

    /// Flips the stored theme and returns the new value.
    pub fn toggle_theme(&mut self) -> Result<Theme, SessionStoreError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}
