//! Google Sheets store over the Sheets v4 REST API.
//!
//! Authenticates as a service account: an RS256 assertion signed with the
//! account key is exchanged at the key's `token_uri` for a bearer token,
//! which is cached until shortly before it expires.

use crate::domain::{Row, SheetsConfig, StoreError};
use crate::ports::{a1_row, SheetStore, TimeSource};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

/// Rightmost column touched by append and clear (installment id)
const LAST_COLUMN: &str = "J";

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Deserialize, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

struct CachedToken {
    value: String,
    expires_at: u64,
}

/// Sheet store backed by one Google spreadsheet
pub struct GoogleSheetsStore {
    http: Client,
    api_base: Url,
    spreadsheet_id: String,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    time: Arc<dyn TimeSource>,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsStore {
    /// Read the service account key named in the config and build the store
    pub fn from_config(
        config: &SheetsConfig,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(&config.credentials_path).map_err(|e| {
            StoreError::Credentials(format!(
                "unable to read {}: {e}",
                config.credentials_path.display()
            ))
        })?;
        Self::from_key_json(&raw, config, time)
    }

    /// Build the store from service account key JSON
    pub fn from_key_json(
        raw: &str,
        config: &SheetsConfig,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, StoreError> {
        let key: ServiceAccountKey = serde_json::from_str(raw).map_err(|e| {
            StoreError::Credentials(format!("unable to parse service account key: {e}"))
        })?;
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StoreError::Credentials(format!("invalid private key: {e}")))?;
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| StoreError::Config(format!("{}: {e}", config.api_base)))?;
        if api_base.cannot_be_a_base() {
            return Err(StoreError::Config(config.api_base.clone()));
        }

        info!(
            account = %key.client_email,
            spreadsheet = %config.spreadsheet_id,
            "Google Sheets store configured"
        );

        Ok(Self {
            http: Client::new(),
            api_base,
            spreadsheet_id: config.spreadsheet_id.clone(),
            client_email: key.client_email,
            token_uri: key.token_uri,
            signing_key,
            time,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        let now = self.time.now();

        if let Some(token) = cached.as_ref() {
            if now + TOKEN_REFRESH_MARGIN_SECS < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| StoreError::Credentials(format!("unable to sign assertion: {e}")))?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = check_status(response).await?.json().await?;

        debug!(expires_in = token.expires_in, "Refreshed sheets access token");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        });
        Ok(value)
    }

    fn values_url(&self, range: &str, action: &str) -> Url {
        let mut url = self.api_base.clone();
        // cannot_be_a_base was rejected at construction
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values"])
                .push(&format!("{range}{action}"));
        }
        url
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn fetch_rows(&self, sheet: &str) -> Result<Vec<Row>, StoreError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.values_url(&sheet_ref(sheet), ""))
            .bearer_auth(token)
            .send()
            .await?;
        let range: ValueRange = check_status(response).await?.json().await?;
        Ok(range.values)
    }

    async fn write_cell(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let range = cell_range(sheet, row, col)?;
        let token = self.access_token().await?;
        let response = self
            .http
            .put(self.values_url(&range, ""))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [[value]] }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn append_row(&self, sheet: &str, values: Row) -> Result<(), StoreError> {
        let token = self.access_token().await?;
        let range = format!("{}!A:{LAST_COLUMN}", sheet_ref(sheet));
        let response = self
            .http
            .post(self.values_url(&range, ":append"))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [values] }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn clear_row(&self, sheet: &str, row: usize) -> Result<(), StoreError> {
        let range = row_range(sheet, row)?;
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.values_url(&range, ":clear"))
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

/// A1 column letters for a 0-based column: 0 is `A`, 26 is `AA`
pub fn column_letter(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Sheet name as used in A1 notation, quoted when it has special characters
pub fn sheet_ref(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// A1 range of a single cell; rows are 0-based here, 1-based in A1
pub fn cell_range(sheet: &str, row: usize, col: usize) -> Result<String, StoreError> {
    Ok(format!(
        "{}!{}{}",
        sheet_ref(sheet),
        column_letter(col),
        a1_row(row)?
    ))
}

/// A1 range spanning one full data row
pub fn row_range(sheet: &str, row: usize) -> Result<String, StoreError> {
    let n = a1_row(row)?;
    Ok(format!("{}!A{n}:{LAST_COLUMN}{n}", sheet_ref(sheet)))
}
