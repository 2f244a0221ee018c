//! Session handling. There is no authentication service behind this:
//! login accepts any email/password pair and just records who is signed
//! in for the current process.

use log::info;
use shared::User;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SessionService {
    user: Arc<Mutex<Option<User>>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self {
            user: Arc::new(Mutex::new(None)),
        }
    }

    /// Sign in. The display name falls back to the local part of the
    /// email when none was given.
    pub fn login(&self, name: &str, email: &str) -> User {
        let display_name = if name.trim().is_empty() {
            email.split('@').next().unwrap_or(email).to_string()
        } else {
            name.to_string()
        };
        let user = User {
            name: display_name,
            email: email.to_string(),
            is_logged_in: true,
        };
        info!("Session: '{}' logged in", user.name);
        *self.user.lock().unwrap() = Some(user.clone());
        user
    }

    pub fn logout(&self) {
        info!("Session: logged out");
        *self.user.lock().unwrap() = None;
    }

    pub fn current(&self) -> Option<User> {
        self.user.lock().unwrap().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.lock().unwrap().is_some()
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_accepts_any_credentials() {
        let service = SessionService::new();
        let user = service.login("慧心", "huixin@example.com");
        assert!(user.is_logged_in);
        assert_eq!(user.name, "慧心");
        assert!(service.is_logged_in());
    }

    #[test]
    fn test_name_falls_back_to_email_local_part() {
        let service = SessionService::new();
        let user = service.login("", "huixin@example.com");
        assert_eq!(user.name, "huixin");
    }

    #[test]
    fn test_logout_clears_session() {
        let service = SessionService::new();
        service.login("慧心", "huixin@example.com");
        service.logout();
        assert!(service.current().is_none());
    }
}
