// src/auth.rs

use crate::error::{KeepError, Result};
use axum::http::HeaderMap;

pub const PASSWORD_HEADER: &str = "x-password";

/// Shared-secret gate in front of every data endpoint.
#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    secret: Option<String>,
}

impl AuthGate {
    /// An empty secret leaves the gate open.
    pub fn new(secret: &str) -> Self {
        Self {
            secret: (!secret.is_empty()).then(|| secret.to_string()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.secret.is_none()
    }

    /// Plain string equality against the `X-Password` header.
    pub fn check(&self, headers: &HeaderMap) -> Result<()> {
        let Some(secret) = &self.secret else {
            return Ok(());
        };
        let provided = headers
            .get(PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided == secret {
            Ok(())
        } else {
            Err(KeepError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(password: Option<&'static str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(p) = password {
            map.insert(PASSWORD_HEADER, HeaderValue::from_static(p));
        }
        map
    }

    #[test]
    fn open_gate_admits_everyone() {
        let gate = AuthGate::new("");
        assert!(gate.is_open());
        assert!(gate.check(&headers(None)).is_ok());
        assert!(gate.check(&headers(Some("anything"))).is_ok());
    }

    #[test]
    fn closed_gate_requires_exact_secret() {
        let gate = AuthGate::new("hunter2");
        assert!(gate.check(&headers(Some("hunter2"))).is_ok());
        for bad in [None, Some(""), Some("hunter"), Some("Hunter2"), Some("hunter2 ")] {
            assert!(
                matches!(gate.check(&headers(bad)), Err(KeepError::Unauthorized)),
                "{bad:?} should be refused"
            );
        }
    }
}
