use std::env;
use std::thread;

use crate::config::TokenWaitConfig;
use crate::error::ApiError;

/// Profile of the signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Anonymous")
    }
}

/// An established identity session: the bearer token plus who it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Seam for the external identity SDK. The session may not exist yet when a
/// request wants a token; callers go through [`wait_for_session`] rather than
/// assuming availability.
pub trait SessionProvider: Send + Sync {
    fn session(&self) -> Option<Session>;
}

/// Stand-in provider that sources the session from the environment, where a
/// real identity SDK would hold it. No `PHOTOWALL_AUTH_TOKEN` means signed out.
#[derive(Debug, Default)]
pub struct EnvSessionProvider {
    // The key a real identity SDK is initialised with. The environment
    // stand-in carries it so the wiring stays in place for a real provider.
    publishable_key: Option<String>,
}

impl EnvSessionProvider {
    pub fn new(publishable_key: Option<String>) -> Self {
        Self { publishable_key }
    }

    pub fn publishable_key(&self) -> Option<&str> {
        self.publishable_key.as_deref()
    }
}

impl SessionProvider for EnvSessionProvider {
    fn session(&self) -> Option<Session> {
        let token = env::var("PHOTOWALL_AUTH_TOKEN").ok()?;
        let user = UserProfile {
            id: env::var("PHOTOWALL_USER_ID").unwrap_or_else(|_| "local-user".to_string()),
            name: env::var("PHOTOWALL_USER_NAME").ok(),
            email: env::var("PHOTOWALL_USER_EMAIL").ok(),
            image_url: env::var("PHOTOWALL_USER_AVATAR").ok(),
        };
        Some(Session { token, user })
    }
}

/// Polls the provider until a session shows up, bounded by the configured
/// attempt count. The identity SDK establishes its session asynchronously, so
/// the first requests after startup may legitimately have to wait; an
/// unbounded poll would hang forever when sign-in never happens.
pub fn wait_for_session(
    provider: &dyn SessionProvider,
    config: TokenWaitConfig,
) -> Result<Session, ApiError> {
    let attempts = config.max_attempts.max(1);
    for attempt in 0..attempts {
        if let Some(session) = provider.session() {
            return Ok(session);
        }
        if attempt + 1 < attempts && !config.interval.is_zero() {
            thread::sleep(config.interval);
        }
    }
    Err(ApiError::AuthUnavailable { attempts })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    struct NeverSignedIn;

    impl SessionProvider for NeverSignedIn {
        fn session(&self) -> Option<Session> {
            None
        }
    }

    struct SignsInAfter {
        remaining: Mutex<u32>,
    }

    impl SessionProvider for SignsInAfter {
        fn session(&self) -> Option<Session> {
            let mut remaining = self.remaining.lock().unwrap();
            if *remaining == 0 {
                Some(Session {
                    token: "tok".into(),
                    user: UserProfile {
                        id: "u1".into(),
                        name: Some("Ada".into()),
                        email: None,
                        image_url: None,
                    },
                })
            } else {
                *remaining -= 1;
                None
            }
        }
    }

    fn instant_wait(max_attempts: u32) -> TokenWaitConfig {
        TokenWaitConfig {
            interval: Duration::ZERO,
            max_attempts,
        }
    }

    #[test]
    fn wait_gives_up_after_bounded_attempts() {
        let err = wait_for_session(&NeverSignedIn, instant_wait(3)).unwrap_err();
        match err {
            ApiError::AuthUnavailable { attempts } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wait_succeeds_once_session_appears() {
        let provider = SignsInAfter {
            remaining: Mutex::new(2),
        };
        let session = wait_for_session(&provider, instant_wait(5)).unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.user.display_name(), "Ada");
    }

    #[test]
    fn env_provider_carries_the_publishable_key() {
        let provider = EnvSessionProvider::new(Some("pk_test_123".into()));
        assert_eq!(provider.publishable_key(), Some("pk_test_123"));
        assert_eq!(EnvSessionProvider::default().publishable_key(), None);
    }

    #[test]
    fn display_name_falls_back_to_anonymous() {
        let user = UserProfile {
            id: "u1".into(),
            name: None,
            email: None,
            image_url: None,
        };
        assert_eq!(user.display_name(), "Anonymous");
    }
}
