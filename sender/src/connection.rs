//! The single connection credential: `Key=Value` pairs separated by `;`.
//!
//! ```text
//! Endpoint=http://localhost:4566;Region=us-east-1;AccessKeyId=test;SecretAccessKey=test
//! ```

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use aws_config::BehaviorVersion;
use aws_credential_types::{Credentials, provider::SharedCredentialsProvider};
use aws_sdk_sqs as sqs;
use thiserror::Error;

pub const DEFAULT_REGION: &str = "us-east-1";

const MASK: &str = "***";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionStringError {
    #[error("segment '{0}' is not of the form Key=Value")]
    MalformedSegment(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("key '{0}' has an empty value")]
    EmptyValue(String),
    #[error("AccessKeyId and SecretAccessKey must be given together")]
    IncompleteCredentials,
}

#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &MASK)
            .field("session_token", &self.session_token.as_ref().map(|_| MASK))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub endpoint: Option<String>,
    pub region: String,
    /// `None` falls back to the default AWS credential chain.
    pub credentials: Option<StaticCredentials>,
}

impl ConnectionString {
    pub fn parse(s: &str) -> Result<Self, ConnectionStringError> {
        let mut endpoint = None;
        let mut region = None;
        let mut key_id = None;
        let mut secret = None;
        let mut token = None;

        for segment in s.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::MalformedSegment(segment.to_string()))?;
            let (key, value) = (key.trim(), value.trim());
            if value.is_empty() {
                return Err(ConnectionStringError::EmptyValue(key.to_string()));
            }
            let slot = match key.to_ascii_lowercase().as_str() {
                "endpoint" => &mut endpoint,
                "region" => &mut region,
                "accesskeyid" => &mut key_id,
                "secretaccesskey" => &mut secret,
                "sessiontoken" => &mut token,
                _ => return Err(ConnectionStringError::UnknownKey(key.to_string())),
            };
            *slot = Some(value.to_string());
        }

        let credentials = match (key_id, secret) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: token,
            }),
            (None, None) => None,
            _ => return Err(ConnectionStringError::IncompleteCredentials),
        };

        Ok(Self {
            endpoint,
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            credentials,
        })
    }

    /// Canonical form with secrets masked, safe to print.
    pub fn redacted(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ep) = &self.endpoint {
            parts.push(format!("Endpoint={ep}"));
        }
        parts.push(format!("Region={}", self.region));
        if let Some(c) = &self.credentials {
            parts.push(format!("AccessKeyId={}", c.access_key_id));
            parts.push(format!("SecretAccessKey={MASK}"));
            if c.session_token.is_some() {
                parts.push(format!("SessionToken={MASK}"));
            }
        }
        parts.join(";")
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

pub async fn build_sqs_client(conn: &ConnectionString) -> Result<sqs::Client> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(conn.region.clone()));

    // Static keys bypass SSO/profile resolution (LocalStack accepts any pair).
    if let Some(c) = &conn.credentials {
        let creds = Credentials::new(
            c.access_key_id.clone(),
            c.secret_access_key.clone(),
            c.session_token.clone(),
            None,
            "connection-string",
        );
        loader = loader.credentials_provider(SharedCredentialsProvider::new(creds));
    }

    let shared_cfg = loader.load().await;

    let mut b = sqs::config::Builder::from(&shared_cfg);
    if let Some(ep) = &conn.endpoint {
        b = b.endpoint_url(ep.clone());
    }
    Ok(sqs::Client::from_conf(b.build()))
}
