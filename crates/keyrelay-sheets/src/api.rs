//! The three Sheets v4 requests the relay needs, behind a trait so the append
//! client can run against an in-memory backend.

use async_trait::async_trait;
use keyrelay_core::GoogleCredentials;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::{ServiceAccountAuth, SheetsError};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Titles of every sheet in the spreadsheet.
    async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError>;

    /// Add a sheet with the given title.
    async fn add_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<(), SheetsError>;

    /// Append one row of values at an A1 range.
    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[String],
    ) -> Result<(), SheetsError>;
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

/// HTTP client for `sheets.googleapis.com`, authenticated as a service account.
pub struct GoogleSheets {
    http: reqwest::Client,
    base_url: Url,
    auth: ServiceAccountAuth,
}

impl GoogleSheets {
    /// Build the client and perform the first token exchange, so bad
    /// credentials surface at startup rather than on the first matched message.
    pub async fn connect(creds: &GoogleCredentials) -> Result<Self, SheetsError> {
        let http = reqwest::Client::new();
        let auth = ServiceAccountAuth::new(http.clone(), creds)?;
        auth.access_token().await?;
        info!(client_email = %creds.client_email, "connected to google sheets");
        Self::with_base_url(http, auth, SHEETS_BASE_URL)
    }

    /// Client against a non-default endpoint. `base_url` is the
    /// `.../v4/spreadsheets` collection URL.
    pub fn with_base_url(
        http: reqwest::Client,
        auth: ServiceAccountAuth,
        base_url: &str,
    ) -> Result<Self, SheetsError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// `<base>/<segment>`, with the segment percent-encoded as a path component.
    fn url(&self, segment: &str) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.to_string()))?
            .push(segment);
        Ok(url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl SheetsApi for GoogleSheets {
    async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError> {
        let url = self.url(spreadsheet_id)?;
        let token = self.auth.access_token().await?;

        debug!(url = %url, "fetching spreadsheet metadata");
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(resp).await?.json().await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    async fn add_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<(), SheetsError> {
        let url = self.url(&format!("{spreadsheet_id}:batchUpdate"))?;
        let token = self.auth.access_token().await?;
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });

        info!(title, "creating sheet");
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[String],
    ) -> Result<(), SheetsError> {
        let mut url = self.url(spreadsheet_id)?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.to_string()))?
            .push("values")
            .push(&format!("{range}:append"));
        let token = self.auth.access_token().await?;
        let body = json!({ "majorDimension": "ROWS", "values": [values] });

        debug!(range, columns = values.len(), "appending row");
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
