//! HTTP-backed profile page source

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::HttpConfig;
use crate::io::HttpClient;
use crate::source::ProfileSource;

/// Fetches profile pages over HTTP using a URL template
pub struct HttpProfileSource {
    url_template: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for HttpProfileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProfileSource")
            .field("url_template", &self.url_template)
            .finish()
    }
}

impl HttpProfileSource {
    pub fn new(config: &HttpConfig, http: Arc<dyn HttpClient>) -> Self {
        tracing::debug!(
            "Created HttpProfileSource for {}",
            config.profile_url_template
        );

        Self {
            url_template: config.profile_url_template.clone(),
            http,
        }
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    fn profile_url(&self, profile_id: &str) -> String {
        self.url_template.replace("{id}", profile_id)
    }

    async fn fetch_page(&self, profile_id: &str) -> crate::Result<String> {
        let url = self.profile_url(profile_id);
        let response = self.http.get(&url).await?;

        if !response.is_success() {
            return Err(crate::XpSentinelError::Fetch {
                url,
                status: response.status,
            });
        }

        Ok(response.body)
    }
}
