//! Caller-facing configuration and default resolution.
//!
//! Defaults are captured once, before the core runs, either explicitly or
//! from the process environment via [`Defaults::from_env`]. Nothing below the
//! pipeline reads environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::crypto::DecryptionKey;
use crate::error::ConfigError;
use crate::fetch::RemoteTarget;
use crate::transport::config::{DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::transport::{Credentials, HostKeyVerification, PrivateKeySource, SshConfig};

/// Environment variable holding the default username.
pub const ENV_USERNAME: &str = "SFTPCRYPT_USERNAME";
/// Environment variable holding the default password.
pub const ENV_PASSWORD: &str = "SFTPCRYPT_PASSWORD";
/// Environment variable holding the default remote file path.
pub const ENV_FILE_PATH: &str = "SFTPCRYPT_FILE_PATH";
/// Environment variable holding the default decryption key.
pub const ENV_DECRYPTION_KEY: &str = "KEY_ETCD";

/// Connection settings as supplied by a caller or a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Server hostname or IP address.
    pub host: String,
    /// SSH port, 22 when omitted.
    pub port: Option<u16>,
    /// Username, falls back to [`Defaults::username`].
    pub username: Option<String>,
    /// Password, falls back to [`Defaults::password`].
    #[serde(deserialize_with = "optional_secret")]
    pub password: Option<SecretString>,
    /// Private key file; takes precedence over the password.
    pub private_key_path: Option<PathBuf>,
    /// Passphrase for an encrypted private key.
    #[serde(deserialize_with = "optional_secret")]
    pub private_key_passphrase: Option<SecretString>,
    /// Allow keyboard-interactive, true when omitted.
    pub interactive_fallback: Option<bool>,
    /// Whole-fetch deadline in seconds.
    pub timeout_secs: Option<u64>,
    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,
    /// Custom known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

/// What to decrypt and with which key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DecryptionConfig {
    /// Remote path of the encrypted file.
    pub file_path: Option<String>,
    /// Decryption key text, used as its UTF-8 bytes.
    #[serde(deserialize_with = "optional_secret")]
    pub decryption_key: Option<SecretString>,
}

/// Values used when the caller leaves a field unset.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub file_path: Option<String>,
    pub decryption_key: Option<SecretString>,
}

impl Defaults {
    /// Read defaults from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read defaults through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD).map(SecretString::from),
            file_path: get(ENV_FILE_PATH),
            decryption_key: get(ENV_DECRYPTION_KEY).map(SecretString::from),
        }
    }

    /// Build the SSH configuration, filling username and password from defaults.
    pub fn resolve_ssh(&self, settings: &ConnectionSettings) -> Result<SshConfig, ConfigError> {
        if settings.host.is_empty() {
            return Err(ConfigError::Missing { field: "host" });
        }

        let username = settings
            .username
            .clone()
            .or_else(|| self.username.clone())
            .ok_or(ConfigError::Missing { field: "username" })?;

        let private_key = settings
            .private_key_path
            .clone()
            .map(|path| PrivateKeySource::Path {
                path,
                passphrase: settings.private_key_passphrase.clone(),
            });

        let timeout = match settings.timeout_secs {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    message: "timeout_secs must be greater than zero".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        Ok(SshConfig {
            host: settings.host.clone(),
            port: settings.port.unwrap_or(DEFAULT_PORT),
            username,
            credentials: Credentials {
                private_key,
                password: settings.password.clone().or_else(|| self.password.clone()),
                interactive_fallback: settings.interactive_fallback.unwrap_or(true),
            },
            timeout,
            host_key_verification: settings.host_key_verification.clone(),
            known_hosts_path: settings.known_hosts_path.clone(),
        })
    }

    /// Resolve the remote path to fetch.
    pub fn resolve_target(&self, config: &DecryptionConfig) -> Result<RemoteTarget, ConfigError> {
        config
            .file_path
            .clone()
            .or_else(|| self.file_path.clone())
            .map(RemoteTarget::new)
            .ok_or(ConfigError::Missing { field: "file_path" })
    }

    /// Resolve the decryption key.
    pub fn resolve_key(&self, config: &DecryptionConfig) -> Result<DecryptionKey, ConfigError> {
        config
            .decryption_key
            .as_ref()
            .or(self.decryption_key.as_ref())
            .map(DecryptionKey::from)
            .ok_or(ConfigError::Missing {
                field: "decryption_key",
            })?
            .validated()
    }
}

fn optional_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}
