use crate::error::ClientResult;
use async_trait::async_trait;

/// Supplies bearer tokens for cloud requests. Caching and refresh belong to the
/// implementation; the client asks once per request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> ClientResult<String>;
}

#[async_trait]
impl<T> TokenProvider for std::sync::Arc<T>
where
    T: TokenProvider + ?Sized,
{
    async fn token(&self) -> ClientResult<String> {
        (**self).token().await
    }
}

#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> ClientResult<String> {
        Ok(self.token.clone())
    }
}
