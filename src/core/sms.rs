//! HTTP SMS provider speaking the Twilio-style Messages REST API.

use crate::{
    config::provider::SmsCredentials,
    core::notify::{NotificationRequest, NotificationResponse, SmsProvider},
    errors::Result,
};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct MessageCreated {
    #[serde(default)]
    sid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Posts messages to `{api_base}/2010-04-01/Accounts/{sid}/Messages.json`.
#[derive(Debug, Clone)]
pub struct HttpSmsProvider {
    http: reqwest::Client,
    api_base: String,
    credentials: SmsCredentials,
}

impl HttpSmsProvider {
    /// Creates a provider for the given endpoint and account.
    #[must_use]
    pub fn new(api_base: &str, credentials: SmsCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.credentials.account_sid
        )
    }
}

impl SmsProvider for HttpSmsProvider {
    async fn send(&self, request: &NotificationRequest) -> Result<NotificationResponse> {
        let form = [
            ("To", request.phone_number.as_str()),
            ("From", self.credentials.from_number.as_str()),
            ("Body", request.message.as_str()),
        ];

        let res = self
            .http
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&form)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            // Accepted regardless of what the body says
            let sid = res
                .json::<MessageCreated>()
                .await
                .ok()
                .and_then(|created| created.sid);
            return Ok(match sid {
                Some(sid) => {
                    debug!("Provider accepted message {sid}");
                    NotificationResponse::sent(sid)
                }
                None => {
                    warn!("Provider accepted message with {status} but returned no sid");
                    NotificationResponse {
                        success: true,
                        provider_message_id: None,
                        error: None,
                    }
                }
            });
        }

        let error = res
            .json::<ProviderError>()
            .await
            .map(|err| err.message)
            .unwrap_or_else(|_| format!("Provider returned {status}"));
        Ok(NotificationResponse::failed(error))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, header_exists, method, path},
    };

    fn credentials() -> SmsCredentials {
        SmsCredentials {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from_number: "+15550199".to_string(),
        }
    }

    fn request() -> NotificationRequest {
        NotificationRequest {
            phone_number: "+15550100".to_string(),
            message: "Crew at gate".to_string(),
            employee_name: Some("Ana".to_string()),
        }
    }

    #[tokio::test]
    async fn test_accepted_message_returns_sid() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("To=%2B15550100"))
            .and(body_string_contains("From=%2B15550199"))
            .and(body_string_contains("Body=Crew+at+gate"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"sid": "SM42"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = HttpSmsProvider::new(&server.uri(), credentials());
        let response = provider.send(&request()).await?;

        assert_eq!(response, NotificationResponse::sent("SM42"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejection_carries_provider_message() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({"code": 21211, "message": "Invalid 'To' Phone Number"}),
            ))
            .mount(&server)
            .await;

        let provider = HttpSmsProvider::new(&server.uri(), credentials());
        let response = provider.send(&request()).await?;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Invalid 'To' Phone Number"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejection_without_body_reports_status() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = HttpSmsProvider::new(&format!("{}/", server.uri()), credentials());
        let response = provider.send(&request()).await?;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("503"));
        Ok(())
    }

    #[tokio::test]
    async fn test_accepted_message_without_sid_is_still_sent() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let provider = HttpSmsProvider::new(&server.uri(), credentials());
        let response = provider.send(&request()).await?;

        assert!(response.success);
        assert_eq!(response.provider_message_id, None);
        assert_eq!(response.error, None);
        Ok(())
    }
}
