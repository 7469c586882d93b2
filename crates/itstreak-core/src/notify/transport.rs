//! Push delivery transport.
//!
//! Fire-and-forget: the scheduler hands over batches and only learns
//! whether the push service accepted the HTTP request. Delivery receipts
//! are not consumed.

use serde::Serialize;

use crate::error::TransportError;

/// Expo push service endpoint.
pub const EXPO_PUSH_API_URL: &str = "https://exp.host/--/api/v2/push/send";

/// One outbound notification, shaped for the Expo push API.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundPush {
    /// Expo push token of the target device.
    pub to: String,
    pub sound: &'static str,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

/// Transport boundary for batched sends.
pub trait PushTransport {
    /// Send one batch; a batch either goes out whole or fails whole.
    fn send_batch(&self, batch: &[OutboundPush]) -> Result<(), TransportError>;
}

/// HTTP client for the Expo push API.
pub struct ExpoPushTransport {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl ExpoPushTransport {
    pub fn new() -> Self {
        Self::with_endpoint(EXPO_PUSH_API_URL)
    }

    /// Point at a non-default endpoint (staging, tests).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for ExpoPushTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PushTransport for ExpoPushTransport {
    fn send_batch(&self, batch: &[OutboundPush]) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(batch)
            .send()?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::BatchRejected {
                status: status.as_u16(),
                detail: response.text().unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn push(token: &str) -> OutboundPush {
        OutboundPush {
            to: token.to_string(),
            sound: "default",
            title: "🌅 おはよう！".to_string(),
            body: "今日も3日目を積み上げよう！".to_string(),
            data: json!({"type": "daily_reminder", "slot": "morning"}),
        }
    }

    #[test]
    fn accepted_batch_is_ok() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/--/api/v2/push/send")
            .match_header("content-type", mockito::Matcher::Regex("application/json".into()))
            .with_status(200)
            .with_body(r#"{"data":[{"status":"ok"}]}"#)
            .create();

        let transport =
            ExpoPushTransport::with_endpoint(format!("{}/--/api/v2/push/send", server.url()));
        transport
            .send_batch(&[push("ExponentPushToken[aaa]")])
            .unwrap();
        mock.assert();
    }

    #[test]
    fn rejected_batch_surfaces_status() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/--/api/v2/push/send")
            .with_status(429)
            .with_body("rate limited")
            .create();

        let transport =
            ExpoPushTransport::with_endpoint(format!("{}/--/api/v2/push/send", server.url()));
        let err = transport
            .send_batch(&[push("ExponentPushToken[aaa]")])
            .unwrap_err();
        match err {
            TransportError::BatchRejected { status, detail } => {
                assert_eq!(status, 429);
                assert_eq!(detail, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn payload_serializes_expo_fields() {
        let value = serde_json::to_value(vec![push("ExponentPushToken[xyz]")]).unwrap();
        assert_eq!(value[0]["to"], "ExponentPushToken[xyz]");
        assert_eq!(value[0]["sound"], "default");
        assert_eq!(value[0]["data"]["slot"], "morning");
    }
}
