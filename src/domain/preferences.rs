use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        f.write_str(name)
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub theme: Theme,
    pub haptics: bool,
    /// Reserved for ranking; nothing reads it yet.
    pub interests: Vec<String>,
    pub skipped_ids: Vec<String>,
    pub liked_ids: Vec<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            haptics: true,
            interests: Vec::new(),
            skipped_ids: Vec::new(),
            liked_ids: Vec::new(),
        }
    }
}

impl UserPreferences {
    /// Apply a partial update; every field present in `update` wins.
    pub fn merge(&mut self, update: PreferencesUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(haptics) = update.haptics {
            self.haptics = haptics;
        }
        if let Some(interests) = update.interests {
            self.interests = interests;
        }
        if let Some(skipped_ids) = update.skipped_ids {
            self.skipped_ids = skipped_ids;
        }
        if let Some(liked_ids) = update.liked_ids {
            self.liked_ids = liked_ids;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreferencesUpdate {
    pub theme: Option<Theme>,
    pub haptics: Option<bool>,
    pub interests: Option<Vec<String>>,
    pub skipped_ids: Option<Vec<String>>,
    pub liked_ids: Option<Vec<String>>,
}

/// Insert `id` keeping first-insertion order. Returns false if already present.
pub fn insert_unique(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        return false;
    }
    ids.push(id.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.theme, Theme::System);
        assert!(prefs.haptics);
        assert!(prefs.interests.is_empty());
        assert!(prefs.skipped_ids.is_empty());
        assert!(prefs.liked_ids.is_empty());
    }

    #[test]
    fn test_merge_only_touches_given_fields() {
        let mut prefs = UserPreferences {
            liked_ids: vec!["1".into()],
            ..Default::default()
        };
        prefs.merge(PreferencesUpdate {
            theme: Some(Theme::Dark),
            ..Default::default()
        });
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.haptics);
        assert_eq!(prefs.liked_ids, vec!["1".to_string()]);
    }

    #[test]
    fn test_insert_unique() {
        let mut ids = Vec::new();
        assert!(insert_unique(&mut ids, "a"));
        assert!(insert_unique(&mut ids, "b"));
        assert!(!insert_unique(&mut ids, "a"));
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_theme_parse_and_display() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(Theme::Light.to_string(), "light");
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_theme_serde_lowercase() {
        let json = serde_json::to_string(&Theme::System).unwrap();
        assert_eq!(json, "\"system\"");
    }
}
