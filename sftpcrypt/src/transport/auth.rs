//! Credential selection and keyboard-interactive challenge answering.

use std::future::Future;

use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};

use super::config::{Credentials, PrivateKeySource, SshConfig};
use crate::error::{Result, TransportError};

/// Maximum number of keyboard-interactive info requests answered per attempt.
pub const MAX_CHALLENGE_ROUNDS: usize = 8;

/// The single authentication method offered for one connection attempt.
///
/// Precedence is private key, then password, then keyboard-interactive.
/// A configured private key always wins; the password is never sent
/// alongside it.
#[derive(Debug, Clone, Copy)]
pub enum AuthPlan<'a> {
    /// Public key authentication.
    PublicKey(&'a PrivateKeySource),

    /// Password authentication, optionally followed by keyboard-interactive.
    Password {
        password: &'a SecretString,
        interactive_fallback: bool,
    },

    /// Keyboard-interactive with no password to answer prompts.
    Interactive,

    /// The `none` method.
    None,
}

impl<'a> AuthPlan<'a> {
    /// Pick the method to offer from the configured credentials.
    pub fn select(credentials: &'a Credentials) -> Self {
        if let Some(key) = &credentials.private_key {
            return AuthPlan::PublicKey(key);
        }
        match &credentials.password {
            Some(password) => AuthPlan::Password {
                password,
                interactive_fallback: credentials.interactive_fallback,
            },
            None if credentials.interactive_fallback => AuthPlan::Interactive,
            None => AuthPlan::None,
        }
    }

    /// Short method name for logging.
    pub fn method_name(&self) -> &'static str {
        match self {
            AuthPlan::PublicKey(_) => "publickey",
            AuthPlan::Password { .. } => "password",
            AuthPlan::Interactive => "keyboard-interactive",
            AuthPlan::None => "none",
        }
    }
}

/// One prompt of a keyboard-interactive info request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Prompt text sent by the server.
    pub prompt: String,
    /// Whether the server asks for the response to be echoed.
    pub echo: bool,
}

/// Answers keyboard-interactive prompts synchronously.
///
/// Implementations must never block on terminal input.
pub trait ChallengeResponder: Send + Sync {
    /// Produce the response for a single prompt.
    fn answer(&self, challenge: &Challenge) -> std::result::Result<String, TransportError>;
}

/// Responder that answers every prompt with the configured password.
#[derive(Debug, Clone, Default)]
pub struct PasswordResponder {
    password: Option<SecretString>,
}

impl PasswordResponder {
    /// Create a responder for an optional password.
    pub fn new(password: Option<SecretString>) -> Self {
        Self { password }
    }

    /// Create a responder from the password in `credentials`.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(credentials.password.clone())
    }
}

impl ChallengeResponder for PasswordResponder {
    fn answer(&self, _challenge: &Challenge) -> std::result::Result<String, TransportError> {
        self.password
            .as_ref()
            .map(|p| p.expose_secret().to_string())
            .ok_or(TransportError::InteractiveAuthUnavailable)
    }
}

/// Answer every prompt of one info request, in order.
pub fn answer_all(
    responder: &dyn ChallengeResponder,
    challenges: &[Challenge],
) -> std::result::Result<Vec<String>, TransportError> {
    challenges.iter().map(|c| responder.answer(c)).collect()
}

/// Server reply during keyboard-interactive authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveStep {
    Success,
    Failure,
    /// Info request carrying zero or more prompts.
    Prompts(Vec<Challenge>),
}

/// The server side of user authentication, one method call per attempt.
///
/// Each `auth_*` method reports whether the server accepted the attempt.
pub trait Authenticator: Send {
    /// Loaded private key type.
    type Key: Send;

    fn auth_none(&mut self, user: &str) -> impl Future<Output = Result<bool>> + Send;

    fn auth_password(
        &mut self,
        user: &str,
        password: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn auth_publickey(
        &mut self,
        user: &str,
        key: Self::Key,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn interactive_start(
        &mut self,
        user: &str,
    ) -> impl Future<Output = Result<InteractiveStep>> + Send;

    fn interactive_respond(
        &mut self,
        answers: Vec<String>,
    ) -> impl Future<Output = Result<InteractiveStep>> + Send;
}

/// Authenticate `config.username` with the method [`AuthPlan::select`] picks.
///
/// `key` must hold the already-loaded private key when the plan is
/// [`AuthPlan::PublicKey`]; it is ignored otherwise.
pub async fn authenticate<A: Authenticator>(
    auth: &mut A,
    config: &SshConfig,
    key: Option<A::Key>,
    responder: &dyn ChallengeResponder,
) -> Result<()> {
    let plan = AuthPlan::select(&config.credentials);
    debug!("Offering {} authentication", plan.method_name());

    let user = config.username.as_str();
    let success = match plan {
        AuthPlan::None => auth.auth_none(user).await?,
        AuthPlan::Password {
            password,
            interactive_fallback,
        } => {
            let accepted = auth.auth_password(user, password.expose_secret()).await?;
            if !accepted && interactive_fallback {
                debug!("Password rejected, trying keyboard-interactive");
                keyboard_interactive(auth, user, responder).await?
            } else {
                accepted
            }
        }
        AuthPlan::Interactive => keyboard_interactive(auth, user, responder).await?,
        AuthPlan::PublicKey(source) => {
            let key = key.ok_or_else(|| TransportError::KeyLoad {
                source_name: source.describe(),
                message: "key was not loaded before authentication".to_string(),
            })?;
            auth.auth_publickey(user, key).await?
        }
    };

    if !success {
        return Err(TransportError::AuthenticationFailed {
            user: config.username.clone(),
        }
        .into());
    }

    Ok(())
}

/// Run keyboard-interactive, answering each info request via `responder`.
pub async fn keyboard_interactive<A: Authenticator>(
    auth: &mut A,
    user: &str,
    responder: &dyn ChallengeResponder,
) -> Result<bool> {
    let mut step = auth.interactive_start(user).await?;

    for _ in 0..MAX_CHALLENGE_ROUNDS {
        match step {
            InteractiveStep::Success => return Ok(true),
            InteractiveStep::Failure => return Ok(false),
            InteractiveStep::Prompts(challenges) => {
                let answers = answer_all(responder, &challenges)?;
                step = auth.interactive_respond(answers).await?;
            }
        }
    }

    warn!("Giving up after {} keyboard-interactive rounds", MAX_CHALLENGE_ROUNDS);
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;
    use std::time::Duration;

    /// Server that records every attempt.
    struct ScriptedServer {
        password: &'static str,
        offers_password: bool,
        offers_interactive: bool,
        attempts: Vec<&'static str>,
        answers: Vec<Vec<String>>,
    }

    impl ScriptedServer {
        fn new(password: &'static str) -> Self {
            Self {
                password,
                offers_password: true,
                offers_interactive: true,
                attempts: Vec::new(),
                answers: Vec::new(),
            }
        }

        fn interactive_only(password: &'static str) -> Self {
            Self {
                offers_password: false,
                ..Self::new(password)
            }
        }
    }

    impl Authenticator for ScriptedServer {
        type Key = &'static str;

        async fn auth_none(&mut self, _user: &str) -> Result<bool> {
            self.attempts.push("none");
            Ok(false)
        }

        async fn auth_password(&mut self, _user: &str, password: &str) -> Result<bool> {
            self.attempts.push("password");
            Ok(self.offers_password && password == self.password)
        }

        async fn auth_publickey(&mut self, _user: &str, _key: &'static str) -> Result<bool> {
            self.attempts.push("publickey");
            Ok(true)
        }

        async fn interactive_start(&mut self, _user: &str) -> Result<InteractiveStep> {
            self.attempts.push("keyboard-interactive");
            if !self.offers_interactive {
                return Ok(InteractiveStep::Failure);
            }
            Ok(InteractiveStep::Prompts(vec![Challenge {
                prompt: "Password: ".into(),
                echo: false,
            }]))
        }

        async fn interactive_respond(&mut self, answers: Vec<String>) -> Result<InteractiveStep> {
            let accepted = answers == [self.password];
            self.answers.push(answers);
            Ok(if accepted {
                InteractiveStep::Success
            } else {
                InteractiveStep::Failure
            })
        }
    }

    fn config(credentials: Credentials) -> SshConfig {
        let mut config = SshConfig::new("10.0.0.1", "user");
        config.credentials = credentials;
        config
    }

    fn key_source() -> PrivateKeySource {
        PrivateKeySource::Path {
            path: PathBuf::from("/home/user/.ssh/id_ed25519"),
            passphrase: None,
        }
    }

    #[test]
    fn test_private_key_wins_over_password() {
        let credentials = Credentials {
            private_key: Some(key_source()),
            password: Some(SecretString::from("hunter2")),
            interactive_fallback: true,
        };
        assert!(matches!(
            AuthPlan::select(&credentials),
            AuthPlan::PublicKey(_)
        ));
    }

    #[test]
    fn test_password_keeps_fallback_flag() {
        let credentials = Credentials {
            private_key: None,
            password: Some(SecretString::from("hunter2")),
            interactive_fallback: false,
        };
        match AuthPlan::select(&credentials) {
            AuthPlan::Password {
                password,
                interactive_fallback,
            } => {
                assert_eq!(password.expose_secret(), "hunter2");
                assert!(!interactive_fallback);
            }
            other => panic!("unexpected plan {}", other.method_name()),
        }
    }

    #[test]
    fn test_no_password_selects_interactive_or_none() {
        let mut credentials = Credentials::default();
        assert!(matches!(
            AuthPlan::select(&credentials),
            AuthPlan::Interactive
        ));

        credentials.interactive_fallback = false;
        assert!(matches!(AuthPlan::select(&credentials), AuthPlan::None));
    }

    #[test]
    fn test_password_answers_every_prompt() {
        let responder = PasswordResponder::new(Some(SecretString::from("hunter2")));
        let challenges = vec![
            Challenge {
                prompt: "Password: ".into(),
                echo: false,
            },
            Challenge {
                prompt: "Verification code: ".into(),
                echo: true,
            },
        ];
        let answers = answer_all(&responder, &challenges).unwrap();
        assert_eq!(answers, vec!["hunter2", "hunter2"]);
    }

    #[test]
    fn test_missing_password_is_unavailable() {
        let responder = PasswordResponder::default();
        let challenges = vec![Challenge {
            prompt: "Password: ".into(),
            echo: false,
        }];
        assert!(matches!(
            answer_all(&responder, &challenges),
            Err(TransportError::InteractiveAuthUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_key_and_password_only_tries_publickey() {
        let config = config(Credentials {
            private_key: Some(key_source()),
            password: Some(SecretString::from("hunter2")),
            interactive_fallback: true,
        });
        let mut server = ScriptedServer::new("hunter2");
        let responder = PasswordResponder::from_credentials(&config.credentials);

        authenticate(&mut server, &config, Some("loaded-key"), &responder)
            .await
            .unwrap();
        assert_eq!(server.attempts, vec!["publickey"]);
    }

    #[tokio::test]
    async fn test_interactive_without_password_fails_fast() {
        let config = config(Credentials::default());
        let mut server = ScriptedServer::interactive_only("hunter2");
        let responder = PasswordResponder::from_credentials(&config.credentials);

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            authenticate(&mut server, &config, None, &responder),
        )
        .await
        .expect("authentication must not wait for input");

        assert_eq!(result.unwrap_err().kind(), ErrorKind::InteractiveAuthUnavailable);
        assert_eq!(server.attempts, vec!["keyboard-interactive"]);
        assert!(server.answers.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_password_answers_challenge_with_password() {
        let config = config(Credentials {
            private_key: None,
            password: Some(SecretString::from("hunter2")),
            interactive_fallback: true,
        });
        let mut server = ScriptedServer::interactive_only("hunter2");
        let responder = PasswordResponder::from_credentials(&config.credentials);

        authenticate(&mut server, &config, None, &responder)
            .await
            .unwrap();
        assert_eq!(server.attempts, vec!["password", "keyboard-interactive"]);
        assert_eq!(server.answers, vec![vec!["hunter2".to_string()]]);
    }

    #[tokio::test]
    async fn test_rejected_password_without_fallback_fails() {
        let config = config(Credentials {
            private_key: None,
            password: Some(SecretString::from("wrong")),
            interactive_fallback: false,
        });
        let mut server = ScriptedServer::new("hunter2");
        let responder = PasswordResponder::from_credentials(&config.credentials);

        let err = authenticate(&mut server, &config, None, &responder)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(server.attempts, vec!["password"]);
    }

    #[tokio::test]
    async fn test_public_key_plan_without_loaded_key_is_key_load() {
        let config = config(Credentials {
            private_key: Some(key_source()),
            password: None,
            interactive_fallback: true,
        });
        let mut server = ScriptedServer::new("hunter2");
        let responder = PasswordResponder::default();

        let err = authenticate(&mut server, &config, None, &responder)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyLoad);
        assert!(server.attempts.is_empty());
    }

    #[test]
    fn test_empty_info_request_needs_no_password() {
        let responder = PasswordResponder::default();
        assert!(answer_all(&responder, &[]).unwrap().is_empty());
    }
}
