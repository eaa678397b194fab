//! Upload destination: storage account, container and SAS credential.
//!
//! Blob URLs follow the Azure Blob REST layout:
//!
//! ```text
//! https://{account}.blob.core.windows.net/{container}/{url-encoded-blob-name}?{sas-token}
//! ```
//!
//! The blob name is escaped with the same character set as JavaScript's
//! `encodeURIComponent`, so a name like `a b.png` becomes `a%20b.png` and a `/`
//! in a name never creates a virtual directory.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::config::StorageConfig;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const BLOB_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Static description of where uploads go.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadTarget {
    account_name: String,
    container_name: String,
    sas_token: String,
    endpoint: Option<Url>,
}

impl UploadTarget {
    pub fn new(account_name: impl Into<String>, container_name: impl Into<String>, sas_token: impl Into<String>) -> Self {
        let sas_token = sas_token.into();
        Self {
            account_name: account_name.into(),
            container_name: container_name.into(),
            sas_token: sas_token.trim_start_matches('?').to_string(),
            endpoint: None,
        }
    }

    /// Replace the public `blob.core.windows.net` host with another service endpoint
    /// (Azurite, sovereign clouds, a local mock).
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Base URL of the blob service, without a trailing slash.
    pub fn service_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.as_str().trim_end_matches('/').to_string(),
            None => format!("https://{}.blob.core.windows.net", self.account_name),
        }
    }

    /// Full PUT URL for a blob named `file_name`, SAS token appended as the query string.
    pub fn blob_url(&self, file_name: &str) -> String {
        let encoded = utf8_percent_encode(file_name, BLOB_NAME_ENCODE_SET);
        let mut url = format!("{}/{}/{}", self.service_url(), self.container_name, encoded);
        if !self.sas_token.is_empty() {
            url.push('?');
            url.push_str(&self.sas_token);
        }
        url
    }
}

impl From<&StorageConfig> for UploadTarget {
    fn from(config: &StorageConfig) -> Self {
        let target = UploadTarget::new(&config.account_name, &config.container_name, &config.sas_token);
        match &config.endpoint {
            Some(endpoint) => target.with_endpoint(endpoint.clone()),
            None => target,
        }
    }
}

// The SAS token is a bearer credential; keep it out of debug output and logs.
impl std::fmt::Debug for UploadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTarget")
            .field("account_name", &self.account_name)
            .field("container_name", &self.container_name)
            .field("sas_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_public_blob_url() {
        let target = UploadTarget::new("acct", "cont", "sv=2022-11-02&sig=abc");
        assert_eq!(
            target.blob_url("a b.png"),
            "https://acct.blob.core.windows.net/cont/a%20b.png?sv=2022-11-02&sig=abc"
        );
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        let target = UploadTarget::new("acct", "cont", "sv=1");
        assert_eq!(
            target.blob_url("report (final)!_v1.2~*'.pdf"),
            "https://acct.blob.core.windows.net/cont/report%20(final)!_v1.2~*'.pdf?sv=1"
        );
        assert_eq!(
            target.blob_url("dir/a?b#c&d=e+f.txt"),
            "https://acct.blob.core.windows.net/cont/dir%2Fa%3Fb%23c%26d%3De%2Bf.txt?sv=1"
        );
        assert_eq!(target.blob_url("café.txt"), "https://acct.blob.core.windows.net/cont/caf%C3%A9.txt?sv=1");
    }

    #[test]
    fn file_name_sits_between_container_and_token() {
        let target = UploadTarget::new("acct", "uploads", "sv=x&sig=y");
        let url = target.blob_url("my notes.txt");

        let container_end = url.find("/uploads/").unwrap() + "/uploads/".len();
        let query_start = url.find('?').unwrap();
        assert_eq!(&url[container_end..query_start], "my%20notes.txt");
        assert_eq!(&url[query_start + 1..], "sv=x&sig=y");
    }

    #[test]
    fn leading_question_mark_on_token_is_dropped() {
        let target = UploadTarget::new("acct", "cont", "?sv=1");
        assert_eq!(target.blob_url("f"), "https://acct.blob.core.windows.net/cont/f?sv=1");
    }

    #[test]
    fn endpoint_override_replaces_account_host() {
        let endpoint = Url::parse("http://127.0.0.1:10000/devstoreaccount1/").unwrap();
        let target = UploadTarget::new("devstoreaccount1", "cont", "sv=1").with_endpoint(endpoint);
        assert_eq!(target.blob_url("f.txt"), "http://127.0.0.1:10000/devstoreaccount1/cont/f.txt?sv=1");
    }

    #[test]
    fn debug_output_redacts_token() {
        let target = UploadTarget::new("acct", "cont", "sv=1&sig=secret");
        let debug = format!("{target:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("acct"));
    }
}
