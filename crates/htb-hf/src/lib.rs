//! HuggingFace-style inference adapter.
//!
//! POSTs `{"inputs": text}` with a bearer key and reads `generated_text` from the
//! first element of the JSON array the endpoint returns.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use htb_core::{
    config::Config,
    errors::Error,
    inference::{InferencePort, InferenceReply},
    Result,
};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct Generation {
    generated_text: String,
}

#[derive(Clone, Debug)]
pub struct HfInferenceClient {
    endpoint: String,
    api_key: String,
    http: reqwest::Client,
}

impl HfInferenceClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("reqwest client build failed: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.inference_url.clone(),
            cfg.inference_api_key.clone(),
            cfg.inference_timeout,
        )
    }

    #[cfg(test)]
    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferencePort for HfInferenceClient {
    async fn get_response(&self, text: &str) -> Result<InferenceReply> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&GenerateRequest { inputs: text })
            .send()
            .await
            .map_err(|e| Error::Inference(format!("request error: {e}")))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %body.chars().take(200).collect::<String>(),
                "inference request failed"
            );
            return Ok(InferenceReply::Fallback {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Inference(format!("body read error: {e}")))?;
        let generations: Vec<Generation> = serde_json::from_slice(&body)?;

        let first = generations
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference("response contained no generations".to_string()))?;

        Ok(InferenceReply::Generated(first.generated_text))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Instant,
    };

    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::post,
        Json, Router,
    };
    use htb_core::inference::FALLBACK_TEXT;

    use super::*;

    #[derive(Clone, Default)]
    struct Seen {
        auth: Arc<Mutex<Option<String>>>,
        body: Arc<Mutex<Option<serde_json::Value>>>,
    }

    /// Serves `status` + `body` on `/model` and records what it was sent.
    async fn mock_endpoint(status: u16, body: &'static str) -> (String, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route(
                "/model",
                post(
                    move |State(seen): State<Seen>,
                          headers: HeaderMap,
                          Json(payload): Json<serde_json::Value>| async move {
                        *seen.auth.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(|s| s.to_string());
                        *seen.body.lock().unwrap() = Some(payload);
                        (AxumStatus::from_u16(status).unwrap(), body)
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/model"), seen)
    }

    fn client(endpoint: String) -> HfInferenceClient {
        HfInferenceClient::new(endpoint, "secret-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_first_generated_text_on_200() {
        let (url, seen) = mock_endpoint(200, r#"[{"generated_text": "hello"}]"#).await;

        let reply = client(url).get_response("hi there").await.unwrap();

        assert_eq!(reply, InferenceReply::Generated("hello".to_string()));
        assert_eq!(reply.text(), "hello");
        assert_eq!(
            seen.auth.lock().unwrap().as_deref(),
            Some("Bearer secret-key")
        );
        assert_eq!(
            seen.body.lock().unwrap().clone(),
            Some(serde_json::json!({ "inputs": "hi there" }))
        );
    }

    #[tokio::test]
    async fn non_200_yields_fallback_text() {
        let (url, _) = mock_endpoint(500, "model is loading").await;

        let reply = client(url).get_response("hi").await.unwrap();

        assert_eq!(reply, InferenceReply::Fallback { status: 500 });
        assert_eq!(reply.text(), FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn other_success_codes_also_fall_back() {
        let (url, _) = mock_endpoint(202, r#"[{"generated_text": "late"}]"#).await;

        let reply = client(url).get_response("hi").await.unwrap();

        assert_eq!(reply, InferenceReply::Fallback { status: 202 });
    }

    #[tokio::test]
    async fn malformed_or_empty_bodies_are_errors() {
        let (url, _) = mock_endpoint(200, r#"{"error": "unexpected"}"#).await;
        assert!(client(url).get_response("hi").await.is_err());

        let (url, _) = mock_endpoint(200, "[]").await;
        let err = client(url).get_response("hi").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn slow_endpoint_hits_the_client_timeout() {
        let app = Router::new().route(
            "/model",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                r#"[{"generated_text": "too late"}]"#
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = HfInferenceClient::new(
            format!("http://{addr}/model"),
            "secret-key",
            Duration::from_secs(1),
        )
        .unwrap();

        let started = Instant::now();
        let err = client.get_response("hi").await.unwrap_err();

        assert!(matches!(err, Error::Inference(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}/model"))
            .get_response("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn builds_from_config() {
        let cfg = Config::from_lookup(|key| match key {
            "AI_API_KEY" => Some("k".to_string()),
            "INFERENCE_URL" => Some("http://localhost:1/m".to_string()),
            _ => None,
        })
        .unwrap();
        let client = HfInferenceClient::from_config(&cfg).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1/m");
    }
}
