//! HTTP implementation of [`RemoteGateway`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::{
    interpret_response, PushOutcome, RegisterPatientRequest, RemoteGateway, VisitRequest,
    VitalsRequest,
};
use crate::models::Endpoint;

/// Connection settings for [`HttpGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

/// Posts JSON bodies to the remote patient API.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            auth_token: settings.auth_token.filter(|t| !t.is_empty()),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    async fn post<T: Serialize + Sync>(&self, endpoint: Endpoint, body: &T) -> PushOutcome {
        let url = self.url(endpoint);
        let mut req = self.client.post(&url).json(body);

        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Remote API unreachable");
                return PushOutcome::Unreachable(e.to_string());
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(endpoint = %endpoint, status, error = %e, "Failed to read response body");
                return PushOutcome::Unreachable(e.to_string());
            }
        };

        let outcome = interpret_response(status, &body);
        debug!(endpoint = %endpoint, status, ok = outcome.is_ok(), "Remote API responded");
        outcome
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn register_patient(&self, request: &RegisterPatientRequest) -> PushOutcome {
        self.post(Endpoint::RegisterPatient, request).await
    }

    async fn add_vitals(&self, request: &VitalsRequest) -> PushOutcome {
        self.post(Endpoint::AddVitals, request).await
    }

    async fn add_visit(&self, request: &VisitRequest) -> PushOutcome {
        self.post(Endpoint::AddVisit, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ServerData;
    use mockito::Matcher;

    fn gateway(base_url: String, token: Option<&str>) -> HttpGateway {
        HttpGateway::new(GatewaySettings {
            base_url,
            auth_token: token.map(str::to_string),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    fn vitals_request() -> VitalsRequest {
        VitalsRequest {
            visit_date: "2024-05-24".into(),
            height: "160".into(),
            weight: "60".into(),
            bmi: "23.4".into(),
            patient_id: "P-001".into(),
        }
    }

    #[tokio::test]
    async fn test_add_vitals_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/vital/add")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "bmi": "23.4",
                "patient_id": "P-001"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"success","success":true,"code":200,"data":{"id":77,"slug":1}}"#)
            .create_async()
            .await;

        // Trailing slash on the base URL is tolerated
        let gw = gateway(format!("{}/", server.url()), Some("secret"));
        let outcome = gw.add_vitals(&vitals_request()).await;

        mock.assert_async().await;
        assert_eq!(
            outcome,
            PushOutcome::Ok(ServerData {
                id: Some(77),
                message: None
            })
        );
    }

    #[tokio::test]
    async fn test_server_error_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/patients/register")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let gw = gateway(server.url(), None);
        let outcome = gw
            .register_patient(&RegisterPatientRequest {
                firstname: "A".into(),
                lastname: "B".into(),
                unique: "P-1".into(),
                dob: String::new(),
                gender: String::new(),
                reg_date: "2024-05-24".into(),
            })
            .await;

        assert!(matches!(outcome, PushOutcome::Rejected(reason) if reason.contains("500")));
    }

    #[tokio::test]
    async fn test_success_false_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/visits/add")
            .with_status(200)
            .with_body(r#"{"success":false,"message":"Invalid vital"}"#)
            .create_async()
            .await;

        let gw = gateway(server.url(), None);
        let outcome = gw
            .add_visit(&VisitRequest {
                general_health: "Good".into(),
                on_diet: "No".into(),
                on_drugs: String::new(),
                comments: "ok".into(),
                visit_date: "2024-05-24".into(),
                patient_id: "P-001".into(),
                vital_id: String::new(),
            })
            .await;

        assert_eq!(outcome, PushOutcome::Rejected("Invalid vital".into()));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Nothing listens on port 9 locally
        let gw = gateway("http://127.0.0.1:9".into(), None);
        let outcome = gw.add_vitals(&vitals_request()).await;
        assert!(matches!(outcome, PushOutcome::Unreachable(_)));
    }
}
