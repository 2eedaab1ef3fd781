use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PREFECTURE;
use crate::error::ValidationError;

/// Account settings edited on the settings page.  Missing fields in a
/// stored document fall back to [`UserSettings::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub nickname: String,
    pub email: String,
    pub avatar_url: String,
    pub bio: String,
    pub pref: String,
    pub city: String,
    pub interests: Vec<String>,
    pub notify_email: bool,
    pub notify_push: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            email: String::new(),
            avatar_url: String::new(),
            bio: String::new(),
            pref: DEFAULT_PREFECTURE.to_string(),
            city: String::new(),
            interests: Vec::new(),
            notify_email: true,
            notify_push: true,
        }
    }
}

impl UserSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.nickname.trim().is_empty() {
            return Err(ValidationError::MissingNickname);
        }
        if self.pref.trim().is_empty() || self.city.trim().is_empty() {
            return Err(ValidationError::MissingLocation);
        }
        Ok(())
    }

    pub fn nickname(&self) -> Option<&str> {
        non_blank(&self.nickname)
    }

    pub fn avatar_url(&self) -> Option<&str> {
        non_blank(&self.avatar_url)
    }

    pub fn bio(&self) -> Option<&str> {
        non_blank(&self.bio)
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_merges_over_defaults() {
        let settings: UserSettings = serde_json::from_str(r#"{"nickname":"Taro"}"#).unwrap();
        assert_eq!(settings.nickname, "Taro");
        assert_eq!(settings.pref, DEFAULT_PREFECTURE);
        assert!(settings.notify_email);
        assert!(settings.notify_push);
    }

    #[test]
    fn validate_requires_nickname_and_location() {
        let mut settings = UserSettings::default();
        assert_eq!(settings.validate(), Err(ValidationError::MissingNickname));

        settings.nickname = "Taro".into();
        assert_eq!(settings.validate(), Err(ValidationError::MissingLocation));

        settings.city = "渋谷区".into();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn blank_profile_fields_read_as_none() {
        let settings = UserSettings { nickname: "  ".into(), bio: " hi ".into(), ..Default::default() };
        assert_eq!(settings.nickname(), None);
        assert_eq!(settings.bio(), Some("hi"));
        assert_eq!(settings.avatar_url(), None);
    }
}
