//! Login credentials and the providers that supply them.
//!
//! A provider is asked for credentials with a short context string naming what
//! they are for (e.g. `"Webmail login"`). Stored credentials, an interactive
//! terminal prompt and plain closures all implement [`CredentialProvider`].
//! Wrap a prompting provider in [`CachedProvider`] to ask only once per process.

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::{MailError, Result};

/// A username and secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials on demand.
pub trait CredentialProvider {
    /// Obtain credentials for `context`. May block, e.g. on user input.
    fn credentials(&self, context: &str) -> Result<Credentials>;
}

impl<F> CredentialProvider for F
where
    F: Fn(&str) -> Result<Credentials>,
{
    fn credentials(&self, context: &str) -> Result<Credentials> {
        self(context)
    }
}

/// Always returns the same credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn credentials(&self, _context: &str) -> Result<Credentials> {
        Ok(self.0.clone())
    }
}

/// Asks on the terminal: username on stdin, secret without echo.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt {
    username: Option<String>,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only prompt for the secret; use `username` as given.
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }
}

impl CredentialProvider for TerminalPrompt {
    fn credentials(&self, context: &str) -> Result<Credentials> {
        let failed = |reason: String| MailError::Credentials {
            context: context.to_string(),
            reason,
        };

        let username = match &self.username {
            Some(user) => user.clone(),
            None => {
                let mut stderr = std::io::stderr();
                write!(stderr, "{context} username: ")
                    .and_then(|_| stderr.flush())
                    .map_err(|e| failed(e.to_string()))?;
                read_username(&mut std::io::stdin().lock()).map_err(|e| failed(e.to_string()))?
            }
        };

        let secret = rpassword::prompt_password(format!("{context} password: "))
            .map_err(|e| failed(e.to_string()))?;

        debug!(context, username = %username, "Read credentials from terminal");
        validated(context, Credentials::new(username, secret))
    }
}

/// Asks `inner` once per context and replays the answer afterwards.
///
/// Failed lookups are not remembered, so the next call asks again.
pub struct CachedProvider<P> {
    inner: P,
    answers: Mutex<HashMap<String, Credentials>>,
}

impl<P: CredentialProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            answers: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every remembered answer, e.g. after a rejected login.
    pub fn forget(&self) {
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<P: CredentialProvider> CredentialProvider for CachedProvider<P> {
    fn credentials(&self, context: &str) -> Result<Credentials> {
        let mut answers = self.answers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(known) = answers.get(context) {
            debug!(context, "Reusing cached credentials");
            return Ok(known.clone());
        }
        let fresh = self.inner.credentials(context)?;
        answers.insert(context.to_string(), fresh.clone());
        Ok(fresh)
    }
}

/// Read one line, trimmed.
fn read_username(input: &mut impl BufRead) -> std::io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Refuse blank usernames or secrets.
pub(crate) fn validated(context: &str, credentials: Credentials) -> Result<Credentials> {
    let reason = if credentials.username.trim().is_empty() {
        "username is empty"
    } else if credentials.secret.is_empty() {
        "password is empty"
    } else {
        return Ok(credentials);
    };
    Err(MailError::Credentials {
        context: context.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("jane", "hunter2");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("jane"));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn test_closure_provider_sees_context() {
        let provider = |context: &str| -> Result<Credentials> { Ok(Credentials::new(context, "pw")) };
        let creds = provider.credentials("Proxy login (proxy.local)").expect("creds");
        assert_eq!(creds.username(), "Proxy login (proxy.local)");
    }

    #[test]
    fn test_static_provider() {
        let provider = StaticCredentials(Credentials::new("jane", "pw"));
        assert_eq!(provider.credentials("any").unwrap().secret(), "pw");
    }

    #[test]
    fn test_read_username_trims() {
        let mut input = std::io::Cursor::new("  jane@example.com \n");
        assert_eq!(read_username(&mut input).unwrap(), "jane@example.com");
    }

    #[test]
    fn test_validated_rejects_blanks() {
        assert!(validated("x", Credentials::new(" ", "pw")).is_err());
        let err = validated("Webmail login", Credentials::new("jane", "")).unwrap_err();
        assert!(err.to_string().contains("Webmail login"));
        assert!(err.to_string().contains("password is empty"));
        assert!(validated("x", Credentials::new("jane", "pw")).is_ok());
    }

    #[test]
    fn test_cached_provider_asks_once_per_context() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let counting = |context: &str| -> Result<Credentials> {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Credentials::new(context, "pw"))
        };
        let cached = CachedProvider::new(counting);

        let first = cached.credentials("Webmail login").unwrap();
        let second = cached.credentials("Webmail login").unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        let proxy = cached.credentials("Proxy login (proxy.local)").unwrap();
        assert_eq!(proxy.username(), "Proxy login (proxy.local)");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);

        cached.forget();
        cached.credentials("Webmail login").unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cached_provider_does_not_remember_failures() {
        let attempts = std::sync::atomic::AtomicUsize::new(0);
        let flaky = |context: &str| -> Result<Credentials> {
            if attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                Err(MailError::Credentials {
                    context: context.to_string(),
                    reason: "cancelled".to_string(),
                })
            } else {
                Ok(Credentials::new("jane", "pw"))
            }
        };
        let cached = CachedProvider::new(flaky);
        assert!(cached.credentials("Webmail login").is_err());
        assert_eq!(cached.credentials("Webmail login").unwrap().username(), "jane");
    }
}
