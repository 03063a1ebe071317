//! Form API source
//!
//! `GET <base>/form/2/<account>/<form>/list?page_number=N&page_size=S`
//! with access-key headers; the body is `{ "Data": [...] }`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::source::RecordSource;

/// Access-key pair sent with every request
#[derive(Debug, Clone, Default)]
pub(crate) struct Credentials {
    pub(crate) key_id: Option<String>,
    pub(crate) key_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(rename = "Data", default)]
    data: Option<Vec<Value>>,
}

/// One form of one account on the form API
#[derive(Debug, Clone)]
pub(crate) struct FormApiSource {
    base_url: String,
    account_id: String,
    form_id: String,
    page_size: u32,
    credentials: Credentials,
}

impl FormApiSource {
    pub(crate) fn new(
        base_url: &str,
        account_id: &str,
        form_id: &str,
        page_size: u32,
        credentials: Credentials,
    ) -> Self {
        FormApiSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
            form_id: form_id.to_string(),
            page_size: page_size.max(1),
            credentials,
        }
    }

    pub(crate) fn list_url(&self) -> String {
        format!(
            "{}/form/2/{}/{}/list",
            self.base_url, self.account_id, self.form_id
        )
    }
}

impl RecordSource for FormApiSource {
    fn describe(&self) -> String {
        format!("form {}", self.form_id)
    }

    fn fetch_page(&self, page: u32) -> Result<Vec<Value>, FetchError> {
        let mut request = ureq::get(&self.list_url())
            .query("page_number", page.to_string())
            .query("page_size", self.page_size.to_string())
            .header("accept", "application/json");
        if let Some(id) = &self.credentials.key_id {
            request = request.header("X-Access-Key-Id", id);
        }
        if let Some(secret) = &self.credentials.key_secret {
            request = request.header("X-Access-Key-Secret", secret);
        }

        let mut response = request.call().map_err(|e| match e {
            ureq::Error::StatusCode(code) => FetchError::Status(code),
            other => FetchError::Transport(other),
        })?;

        let body: Page = response
            .body_mut()
            .read_json()
            .map_err(|e| FetchError::Decode {
                context: format!("page {page} of {}", self.describe()),
                message: e.to_string(),
            })?;
        Ok(body.data.unwrap_or_default())
    }
}

/// Decode a page body the way the API returns it (used by file snapshots too)
pub(crate) fn decode_page(body: &str) -> Result<Vec<Value>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Array(items) => Ok(items),
        other => {
            let page: Page = serde_json::from_value(other)?;
            Ok(page.data.unwrap_or_default())
        }
    }
}
