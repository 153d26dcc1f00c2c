//! Delivery of projects to the solver service.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::{Credentials, ServiceConfig};
use crate::errors::SubmitError;
use crate::project::Project;

/// Something that can POST a JSON document and return the JSON answer.
pub trait Transport {
    /// Send `body` to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Transport`] when the exchange fails.
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, SubmitError>;
}

/// Blocking HTTP transport.
pub struct UreqTransport {
    /// Shared connection pool.
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport with ureq's default agent settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, SubmitError> {
        let transport_error = |e: ureq::Error| SubmitError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = self
            .agent
            .post(url)
            .header("User-Agent", concat!("structmesh/", env!("CARGO_PKG_VERSION")))
            .send_json(body)
            .map_err(transport_error)?;
        response.into_body().read_json().map_err(transport_error)
    }
}

/// What the service reported after accepting a project.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionReceipt {
    /// Human readable status message.
    pub message: String,
    /// Session the model was stored in, when reported.
    pub session_id: Option<String>,
    /// Full response body.
    pub response: Value,
}

/// Client for the solver service's function-call API.
pub struct SolverClient<T> {
    /// Underlying HTTP transport.
    transport: T,
    /// API endpoint.
    endpoint: String,
    /// Account used for every request.
    credentials: Credentials,
    /// Whether to request a solve after upload.
    solve: bool,
}

impl<T: Transport> SolverClient<T> {
    /// Create a client from the service configuration.
    pub fn new(transport: T, service: &ServiceConfig, credentials: Credentials) -> Self {
        Self {
            transport,
            endpoint: service.endpoint.clone(),
            credentials,
            solve: service.solve,
        }
    }

    /// Build the API request uploading `project`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Encode`] when the project cannot be encoded.
    pub fn request_body(&self, project: &Project) -> Result<Value, SubmitError> {
        let mut functions = vec![
            json!({
                "function": "S3D.session.start",
                "arguments": { "keep_open": false },
            }),
            json!({
                "function": "S3D.model.set",
                "arguments": { "s3d_model": project.to_value()? },
            }),
        ];
        if self.solve {
            functions.push(json!({
                "function": "S3D.model.solve",
                "arguments": { "analysis_type": "linear" },
            }));
        }
        Ok(json!({
            "auth": {
                "username": self.credentials.username,
                "key": self.credentials.key,
            },
            "functions": functions,
        }))
    }

    /// Upload `project`, and solve it when configured to.
    ///
    /// The request is sent once; failures are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Transport`] when the request fails,
    /// [`SubmitError::MissingStatus`] when the answer has no status and
    /// [`SubmitError::Rejected`] when the service reports a non-zero status.
    pub fn submit(&self, project: &Project) -> Result<SubmissionReceipt, SubmitError> {
        let body = self.request_body(project)?;
        info!(
            endpoint = %self.endpoint,
            solve = self.solve,
            plates = project.plates.len(),
            "submitting project"
        );
        let response = self.transport.post_json(&self.endpoint, &body)?;
        let receipt = interpret_response(response)?;
        info!(message = %receipt.message, "project accepted");
        Ok(receipt)
    }
}

/// Turn a response body into a receipt, failing on a missing or non-zero status.
///
/// The service nests its status under `response`; a flat body is accepted as well.
fn interpret_response(response: Value) -> Result<SubmissionReceipt, SubmitError> {
    let outcome = response.get("response").unwrap_or(&response);
    let Some(status) = outcome.get("status").and_then(Value::as_i64) else {
        warn!(%response, "service response carries no status");
        return Err(SubmitError::MissingStatus(response.to_string()));
    };
    let message = outcome
        .get("msg")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if status != 0 {
        warn!(status, %message, "service rejected the project");
        return Err(SubmitError::Rejected { status, message });
    }
    let session_id = outcome
        .get("last_session_id")
        .or_else(|| outcome.get("session_id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(SubmissionReceipt {
        message,
        session_id,
        response,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::project::Node;

    /// Transport that records requests and replays a canned answer.
    struct Recording {
        requests: RefCell<Vec<(String, Value)>>,
        answer: Result<Value, String>,
    }

    impl Recording {
        fn answering(answer: Value) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                answer: Ok(answer),
            }
        }
    }

    impl Transport for Recording {
        fn post_json(&self, url: &str, body: &Value) -> Result<Value, SubmitError> {
            self.requests
                .borrow_mut()
                .push((url.to_string(), body.clone()));
            self.answer.clone().map_err(|message| SubmitError::Transport {
                url: url.to_string(),
                message,
            })
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "jb".to_string(),
            key: "secret".to_string(),
        }
    }

    fn project() -> Project {
        let mut project = Project::new();
        project.nodes.insert(
            1,
            Node {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
        );
        project
    }

    #[test]
    fn upload_request_wraps_the_model() {
        let client = SolverClient::new(
            Recording::answering(json!({"response": {"status": 0, "msg": "ok"}})),
            &ServiceConfig::default(),
            credentials(),
        );
        let receipt = client.submit(&project()).expect("accepted");
        assert_eq!(receipt.message, "ok");
        assert_eq!(receipt.session_id, None);

        let requests = client.transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        let (url, body) = &requests[0];
        assert_eq!(url, crate::config::DEFAULT_ENDPOINT);
        assert_eq!(body["auth"]["username"], "jb");
        assert_eq!(body["auth"]["key"], "secret");
        let functions = body["functions"].as_array().expect("function list");
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0]["function"], "S3D.session.start");
        assert_eq!(functions[1]["function"], "S3D.model.set");
        assert_eq!(functions[1]["arguments"]["s3d_model"]["dataVersion"], 42);
        assert_eq!(functions[1]["arguments"]["s3d_model"]["nodes"]["1"]["x"], 0.0);
    }

    #[test]
    fn solve_is_requested_when_configured() {
        let service = ServiceConfig {
            endpoint: "http://localhost:9000/v3".to_string(),
            solve: true,
        };
        let client = SolverClient::new(
            Recording::answering(json!({"response": {"status": 0, "msg": "solved", "last_session_id": "abc"}})),
            &service,
            credentials(),
        );
        let receipt = client.submit(&project()).expect("accepted");
        assert_eq!(receipt.session_id.as_deref(), Some("abc"));

        let requests = client.transport.requests.borrow();
        assert_eq!(requests[0].0, "http://localhost:9000/v3");
        let functions = requests[0].1["functions"].as_array().expect("function list");
        assert_eq!(functions.len(), 3);
        assert_eq!(functions[2]["function"], "S3D.model.solve");
    }

    #[test]
    fn non_zero_status_is_a_rejection() {
        let client = SolverClient::new(
            Recording::answering(json!({"response": {"status": 1, "msg": "bad key"}})),
            &ServiceConfig::default(),
            credentials(),
        );
        let error = client.submit(&project()).expect_err("rejected");
        match error {
            SubmitError::Rejected { status, message } => {
                assert_eq!(status, 1);
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn answer_without_status_is_not_a_success() {
        let client = SolverClient::new(
            Recording::answering(json!({"error": "gateway timeout"})),
            &ServiceConfig::default(),
            credentials(),
        );
        let error = client.submit(&project()).expect_err("no status");
        assert!(matches!(error, SubmitError::MissingStatus(ref body) if body.contains("gateway timeout")));
    }

    #[test]
    fn transport_failures_propagate() {
        let transport = Recording {
            requests: RefCell::new(Vec::new()),
            answer: Err("connection refused".to_string()),
        };
        let client = SolverClient::new(transport, &ServiceConfig::default(), credentials());
        let error = client.submit(&project()).expect_err("offline");
        assert!(matches!(error, SubmitError::Transport { .. }));
        assert!(error.to_string().contains("connection refused"));
    }
}
