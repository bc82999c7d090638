use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde_json::Value;

/// One JSON POST per operation. Implementations map non-2xx responses to
/// [`ClientError::Status`] and return the parsed body otherwise.
#[async_trait]
pub trait DatastoreTransport: Send + Sync {
    async fn post(&self, url: &str, bearer: Option<&str>, body: &Value) -> ClientResult<Value>;
}

#[async_trait]
impl<T> DatastoreTransport for std::sync::Arc<T>
where
    T: DatastoreTransport + ?Sized,
{
    async fn post(&self, url: &str, bearer: Option<&str>, body: &Value) -> ClientResult<Value> {
        (**self).post(url, bearer, body).await
    }
}

/// Holds one pooled `reqwest::Client` for the life of the transport.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatastoreTransport for ReqwestTransport {
    async fn post(&self, url: &str, bearer: Option<&str>, body: &Value) -> ClientResult<Value> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ClientError::Transport(format!("http post failed: {err}")))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ClientError::Transport(format!("http read body failed: {err}")))?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_body(&text)
    }
}

pub(crate) fn parse_body(text: &str) -> ClientResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(text)
        .map_err(|err| ClientError::Decode(format!("http json decode failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_parses_as_empty_object() {
        assert_eq!(parse_body("").unwrap(), json!({}));
        assert_eq!(parse_body("  \n").unwrap(), json!({}));
        assert_eq!(parse_body(r#"{"transaction":"tx1"}"#).unwrap(), json!({"transaction": "tx1"}));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(parse_body("<html>"), Err(ClientError::Decode(_))));
    }
}
