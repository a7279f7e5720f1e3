//! Fetch an encrypted file over SFTP and print the decrypted content.
//!
//! Unset options fall back to the environment: `SFTPCRYPT_USERNAME`,
//! `SFTPCRYPT_PASSWORD`, `SFTPCRYPT_FILE_PATH` and `KEY_ETCD`.
//!
//! # Usage
//!
//! With password authentication:
//! ```bash
//! cargo run --example fetch_decrypt -- --host 192.168.0.1 --user user --password secret --path /path/to/encrypted/file
//! ```
//!
//! With SSH key authentication:
//! ```bash
//! KEY_ETCD=01234567890123456789012345678901 \
//!     cargo run --example fetch_decrypt -- --host 192.168.0.1 --user user --key ~/.ssh/id_ed25519
//! ```

use std::env;
use std::path::PathBuf;

use secrecy::SecretString;
use sftpcrypt::{ConnectionSettings, DecryptionConfig, Defaults};

#[tokio::main]
async fn main() {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let settings = ConnectionSettings {
        host: args.host,
        port: Some(args.port),
        username: args.user,
        password: args.password.map(SecretString::from),
        private_key_path: args.key,
        timeout_secs: Some(args.timeout),
        ..Default::default()
    };
    let decryption = DecryptionConfig {
        file_path: args.path,
        decryption_key: None,
    };

    match sftpcrypt::run(&settings, &decryption, &Defaults::from_env()).await {
        Some(plaintext) => println!("{}", plaintext),
        None => std::process::exit(1),
    }
}

struct Args {
    host: String,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    key: Option<PathBuf>,
    path: Option<String>,
    timeout: u64,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = None;
        let mut password = None;
        let mut key = None;
        let mut path = None;
        let mut timeout = 30u64;

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--host" | "-h" => {
                    if let Some(v) = value {
                        host = v;
                    }
                    i += 1;
                }
                "--port" | "-p" => {
                    port = value.and_then(|v| v.parse().ok()).unwrap_or(22);
                    i += 1;
                }
                "--user" | "-u" => {
                    user = value;
                    i += 1;
                }
                "--password" | "-P" => {
                    password = value;
                    i += 1;
                }
                "--key" | "-k" => {
                    key = value.map(PathBuf::from);
                    i += 1;
                }
                "--path" | "-f" => {
                    path = value;
                    i += 1;
                }
                "--timeout" | "-t" => {
                    timeout = value.and_then(|v| v.parse().ok()).unwrap_or(30);
                    i += 1;
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {}", other);
                }
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            key,
            path,
            timeout,
        }
    }

    fn print_help() {
        println!(
            r#"sftpcrypt fetch_decrypt example

USAGE:
    cargo run --example fetch_decrypt -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Target host [default: localhost]
    -p, --port <PORT>        SSH port [default: 22]
    -u, --user <USER>        Username [default: $SFTPCRYPT_USERNAME]
    -P, --password <PASS>    Password [default: $SFTPCRYPT_PASSWORD]
    -k, --key <PATH>         Path to SSH private key
    -f, --path <PATH>        Remote encrypted file [default: $SFTPCRYPT_FILE_PATH]
    -t, --timeout <SECS>     Deadline for the fetch [default: 30]
    --help                   Print this help message

The decryption key is read from $KEY_ETCD.
"#
        );
    }
}
