use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interface {
    #[default]
    Public,
    Management,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub current_interface: Interface,
    pub theme: Theme,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            current_interface: Interface::Public,
            theme: Theme::Light,
            language: "en".to_string(),
        }
    }
}

/// Partial update; fields left out keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub current_interface: Option<Interface>,
    pub theme: Option<Theme>,
    pub language: Option<String>,
}

impl Preferences {
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(interface) = patch.current_interface {
            self.current_interface = interface;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(language) = patch.language.filter(|l| !l.trim().is_empty()) {
            self.language = language;
        }
    }
}
