//! Profile page source trait

use async_trait::async_trait;

/// Fetches the raw page for a profile
#[async_trait]
pub trait ProfileSource: Send + Sync + std::fmt::Debug {
    /// Public URL of the profile page
    fn profile_url(&self, profile_id: &str) -> String;

    /// Fetch the page markup for a profile
    async fn fetch_page(&self, profile_id: &str) -> crate::Result<String>;
}
