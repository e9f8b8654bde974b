use std::fmt;
use std::fs;
use std::path::Path;

use reqwest::Client;
use serde_json::Value;

use crate::spacetrack::error::AcquisitionError;
use crate::spacetrack::query::{login_url, query_url, QueryParameters};

pub const DEFAULT_BASE_URL: &str = "https://www.space-track.org";
pub const USERNAME_VAR: &str = "SPACETRACK_USERNAME";
pub const PASSWORD_VAR: &str = "SPACETRACK_PASSWORD";

#[derive(Clone)]
pub struct Credentials {
    pub identity: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, AcquisitionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AcquisitionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(AcquisitionError::MissingCredential(key))
        };
        Ok(Self {
            identity: get(USERNAME_VAR)?,
            password: get(PASSWORD_VAR)?,
        })
    }
}

/// Unauthenticated connection to the catalog service.
pub struct SpaceTrackClient {
    http: Client,
    base_url: String,
}

/// Logged-in connection; the session cookie lives in the client's cookie store.
pub struct Session {
    http: Client,
    base_url: String,
}

impl SpaceTrackClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AcquisitionError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn authenticate(self, credentials: &Credentials) -> Result<Session, AcquisitionError> {
        let url = login_url(&self.base_url);
        log::info!("Authenticating with {} as {}", self.base_url, credentials.identity);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("identity", credentials.identity.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                url,
                status: status.as_u16(),
            });
        }
        check_login_body(&response.text().await?)?;

        log::info!("Successfully authenticated");
        Ok(Session {
            http: self.http,
            base_url: self.base_url,
        })
    }
}

impl Session {
    pub async fn query(&self, params: &QueryParameters) -> Result<Vec<Value>, AcquisitionError> {
        if params.is_empty() {
            return Err(AcquisitionError::EmptyQuery);
        }

        let url = query_url(&self.base_url, params);
        log::info!("Getting {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let records = parse_records(&response.text().await?)?;
        log::info!("Received {} records", records.len());
        Ok(records)
    }
}

/// The login endpoint answers 200 even for bad credentials.
fn check_login_body(body: &str) -> Result<(), AcquisitionError> {
    let failed = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("Login").and_then(|l| l.as_str()).map(|l| l == "Failed"))
        .unwrap_or(false);
    if failed {
        return Err(AcquisitionError::AuthenticationRejected);
    }
    Ok(())
}

fn parse_records(body: &str) -> Result<Vec<Value>, AcquisitionError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(records) => Ok(records),
        other => {
            let preview = other.to_string().chars().take(200).collect();
            Err(AcquisitionError::NotAnArray(preview))
        }
    }
}

pub fn save_records(path: &Path, records: &[Value]) -> Result<(), AcquisitionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec(records)?)?;
    Ok(())
}

/// Log in, run one query and write the resulting records to `path`.
/// Nothing is written unless every step succeeds.
pub async fn download(
    base_url: &str,
    credentials: &Credentials,
    params: &QueryParameters,
    path: &Path,
) -> Result<usize, AcquisitionError> {
    let session = SpaceTrackClient::new(base_url)?
        .authenticate(credentials)
        .await?;
    let records = session.query(params).await?;
    save_records(path, &records)?;
    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(records.len())
}
