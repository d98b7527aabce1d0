//! Call signaling updates that move a phone leg onto a SIP URI.

use async_trait::async_trait;
use tracing::info;
use url::Url;

use super::{TelephonyError, TelephonyResult};

/// Default Twilio REST endpoint
pub const TWILIO_API_URL: &str = "https://api.twilio.com/2010-04-01";

#[async_trait]
pub trait CallForwarder: Send + Sync {
    /// Redirect the live call `call_id` to `sip_uri`.
    async fn forward_call(&self, call_id: &str, sip_uri: &str) -> TelephonyResult<()>;
}

const MAX_CALL_SID_LEN: usize = 64;

/// Whether `call_sid` can be used as a call identifier.
///
/// Twilio call sids are `CA` followed by 32 hex digits. Anything ASCII
/// alphanumeric up to 64 characters is accepted, which rules out path
/// separators and dot segments.
pub fn is_valid_call_sid(call_sid: &str) -> bool {
    !call_sid.is_empty()
        && call_sid.len() <= MAX_CALL_SID_LEN
        && call_sid.chars().all(|c| c.is_ascii_alphanumeric())
}

/// TwiML that dials the given SIP URI
pub fn dial_sip_twiml(sip_uri: &str) -> String {
    format!("<Response><Dial><Sip>{sip_uri}</Sip></Dial></Response>")
}

/// Updates live Twilio calls through the Calls API
pub struct TwilioCallForwarder {
    client: reqwest::Client,
    api_url: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioCallForwarder {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    /// `{api}/Accounts/{sid}/Calls/{call}.json` with every segment percent-encoded.
    fn call_url(&self, call_id: &str) -> TelephonyResult<Url> {
        let mut url = Url::parse(&self.api_url).map_err(|e| {
            TelephonyError::InvalidConfiguration(format!("Invalid Twilio API URL: {e}"))
        })?;
        let resource = format!("{call_id}.json");
        url.path_segments_mut()
            .map_err(|_| {
                TelephonyError::InvalidConfiguration(format!(
                    "Twilio API URL cannot carry a path: {}",
                    self.api_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "Accounts",
                self.account_sid.as_str(),
                "Calls",
                resource.as_str(),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl CallForwarder for TwilioCallForwarder {
    async fn forward_call(&self, call_id: &str, sip_uri: &str) -> TelephonyResult<()> {
        if !is_valid_call_sid(call_id) {
            return Err(TelephonyError::Forwarding(format!(
                "Invalid call sid: {call_id:?}"
            )));
        }
        let twiml = dial_sip_twiml(sip_uri);

        let response = self
            .client
            .post(self.call_url(call_id)?)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("Twiml", twiml.as_str())])
            .send()
            .await
            .map_err(|e| TelephonyError::Forwarding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TelephonyError::Forwarding(format!(
                "Twilio API error {status}: {error_text}"
            )));
        }

        info!(call_id, sip_uri, "Call updated to dial SIP endpoint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forwarder(server: &MockServer) -> TwilioCallForwarder {
        TwilioCallForwarder::new(reqwest::Client::new(), server.uri(), "AC123", "secret")
    }

    #[test]
    fn test_twiml() {
        assert_eq!(
            dial_sip_twiml("sip:room@sip.daily.co"),
            "<Response><Dial><Sip>sip:room@sip.daily.co</Sip></Dial></Response>"
        );
    }

    #[tokio::test]
    async fn test_forward_posts_twiml() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Accounts/AC123/Calls/CA999.json"))
            .and(header_exists("authorization"))
            // Form-encoded `<Response><Dial>`
            .and(body_string_contains("Twiml=%3CResponse%3E%3CDial%3E"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sid": "CA999"
            })))
            .expect(1)
            .mount(&server)
            .await;

        forwarder(&server)
            .forward_call("CA999", "sip:room@sip.daily.co")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_forward_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("call not found"))
            .mount(&server)
            .await;

        match forwarder(&server).forward_call("CA404", "sip:x").await {
            Err(TelephonyError::Forwarding(msg)) => assert!(msg.contains("call not found")),
            other => panic!("Expected Forwarding error, got: {:?}", other),
        }
    }

    #[test]
    fn test_call_sid_validation() {
        assert!(is_valid_call_sid("CA0123456789abcdef0123456789abcdef"));
        assert!(is_valid_call_sid("CA999"));
        assert!(!is_valid_call_sid(""));
        assert!(!is_valid_call_sid("CA1/../../IncomingPhoneNumbers/PN9"));
        assert!(!is_valid_call_sid(".."));
        assert!(!is_valid_call_sid("CA1?x=1"));
        assert!(!is_valid_call_sid(&"A".repeat(65)));
    }

    #[test]
    fn test_call_url_encodes_segments() {
        let forwarder = TwilioCallForwarder::new(
            reqwest::Client::new(),
            "https://api.twilio.com/2010-04-01/",
            "AC123",
            "secret",
        );

        assert_eq!(
            forwarder.call_url("CA999").unwrap().as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Calls/CA999.json"
        );

        let url = forwarder.call_url("CA1/../../IncomingPhoneNumbers/PN9").unwrap();
        assert_eq!(
            url.path(),
            "/2010-04-01/Accounts/AC123/Calls/CA1%2F..%2F..%2FIncomingPhoneNumbers%2FPN9.json"
        );
    }

    #[tokio::test]
    async fn test_forward_rejects_traversal_sid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = forwarder(&server)
            .forward_call("CA1/../../IncomingPhoneNumbers/PN9", "sip:x")
            .await;

        assert!(matches!(result, Err(TelephonyError::Forwarding(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
