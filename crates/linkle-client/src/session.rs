//! Authentication adapter.
//!
//! Sign-in happens outside Linkle; this module only holds the session the
//! provider handed over.  Nothing here is persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::StoreKey;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Session {
    /// Build a session from an OAuth profile document.
    ///
    /// The display name comes from `name`, else `screen_name`; the image from
    /// `picture`, else `avatar_url`, else `profile_image_url`.
    pub fn from_oauth_profile(sub: &str, profile: &Value) -> Self {
        let field = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| profile.get(*k).and_then(Value::as_str))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            id: sub.to_string(),
            name: field(&["name", "screen_name"]),
            email: field(&["email"]),
            image: field(&["picture", "avatar_url", "profile_image_url"]),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "session", rename_all = "lowercase")]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(s) => Some(s),
            Self::Unauthenticated => None,
        }
    }
}

impl AppState {
    pub fn sign_in(&mut self, session: Session) {
        tracing::info!(user = %session.id, "signed in");
        self.auth = AuthStatus::Authenticated(session);
        self.events.publish(StoreKey::Session);
    }

    pub fn sign_out(&mut self) {
        if self.auth.is_authenticated() {
            tracing::info!("signed out");
        }
        self.auth = AuthStatus::Unauthenticated;
        self.events.publish(StoreKey::Session);
    }

    pub fn auth(&self) -> &AuthStatus {
        &self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn oauth_profile_fallbacks() {
        let google = json!({ "name": "Hanako", "email": "h@example.com", "picture": "https://g/p.png" });
        let s = Session::from_oauth_profile("g-1", &google);
        assert_eq!(s.name.as_deref(), Some("Hanako"));
        assert_eq!(s.image.as_deref(), Some("https://g/p.png"));

        let x = json!({ "screen_name": "taro_x", "profile_image_url": "https://x/p.jpg" });
        let s = Session::from_oauth_profile("x-1", &x);
        assert_eq!(s.id, "x-1");
        assert_eq!(s.name.as_deref(), Some("taro_x"));
        assert_eq!(s.email, None);
        assert_eq!(s.image.as_deref(), Some("https://x/p.jpg"));

        let blank = json!({ "name": "  ", "screen_name": "fallback", "avatar_url": "https://a/p" });
        let s = Session::from_oauth_profile("gh-1", &blank);
        assert_eq!(s.name.as_deref(), Some("fallback"));
        assert_eq!(s.image.as_deref(), Some("https://a/p"));
    }

    #[test]
    fn sign_in_and_out() {
        let mut state = AppState::in_memory().unwrap();
        assert!(!state.is_authenticated());

        state.sign_in(Session {
            id: "u1".into(),
            name: Some("Taro".into()),
            email: None,
            image: None,
        });
        assert!(state.is_authenticated());
        assert_eq!(state.auth().session().and_then(Session::display_name), Some("Taro"));

        state.sign_out();
        assert_eq!(state.auth(), &AuthStatus::Unauthenticated);
    }
}
