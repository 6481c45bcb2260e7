use reqwest::{header, Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{ClientError, GENERIC_REQUEST_ERROR};

/// Single chokepoint for talking to the server. Credentials ride on the
/// cookie jar, every request declares a JSON content type, and every
/// response is normalized here: callers never see status codes, only a
/// parsed JSON value or a [`ClientError`].
pub struct Gateway {
    http: Client,
    base_url: String,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base_url })
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.send(self.http.get(self.url(path)), None::<&Value>)
            .await
    }

    pub async fn get_query(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ClientError> {
        self.send(self.http.get(self.url(path)).query(query), None::<&Value>)
            .await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ClientError> {
        self.send(self.http.post(self.url(path)), Some(body)).await
    }

    pub async fn post_empty(&self, path: &str) -> Result<Value, ClientError> {
        self.send(self.http.post(self.url(path)), None::<&Value>)
            .await
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ClientError> {
        self.send(self.http.put(self.url(path)), Some(body)).await
    }

    pub async fn patch<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ClientError> {
        self.send(self.http.patch(self.url(path)), Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.send(self.http.request(Method::DELETE, self.url(path)), None::<&Value>)
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: Serialize>(
        &self,
        request: RequestBuilder,
        body: Option<&T>,
    ) -> Result<Value, ClientError> {
        let request = match body {
            Some(body) => request.json(body),
            None => request.header(header::CONTENT_TYPE, "application/json"),
        };
        let response = request.send().await?;
        let status = response.status();
        // Unusable bodies degrade to an empty object instead of failing.
        let value: Value = response
            .json()
            .await
            .unwrap_or_else(|_| Value::Object(Default::default()));
        if status.is_success() {
            return Ok(value);
        }
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(GENERIC_REQUEST_ERROR)
            .to_string();
        warn!(%status, %message, "request rejected");
        Err(ClientError::Rejected { message })
    }
}
