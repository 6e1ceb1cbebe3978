//! PUT/POST helpers with tri-state result classification.

use crate::error::HalError;
use crate::failure::failure_detail;
use crate::navigator::HalNavigator;
use crate::transport::{HalTransport, JSON_CONTENT_TYPE, TransportResponse};
use http::StatusCode;
use serde::Serialize;
use std::fmt;

/// Label passed to result callbacks for successful writes.
pub const STATUS_OK: &str = "OK";

/// Label passed to result callbacks for conflicts and failures.
pub const STATUS_FAILED: &str = "FAILED";

/// Classified result of a write operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx; carries the status line, e.g. `"HTTP/1.1 201 Created"`.
    Success(String),
    /// 409; carries `"409 Conflict - <first line of body>"`.
    Conflict(String),
    /// Any other status; carries the failure detail.
    Failure(String),
}

impl Outcome {
    /// Classifies a completed write exchange.
    #[must_use]
    pub fn from_response(response: &TransportResponse) -> Self {
        if response.status.is_success() {
            Self::Success(response.status_line())
        } else if response.status == StatusCode::CONFLICT {
            Self::Conflict(format!(
                "{} - {}",
                response.status_reason(),
                response.first_line()
            ))
        } else {
            Self::Failure(failure_detail(response))
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Status line on success, detail otherwise.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Success(detail) | Self::Conflict(detail) | Self::Failure(detail) => detail,
        }
    }

    /// [`STATUS_OK`] or [`STATUS_FAILED`]; conflicts count as failures.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        if self.is_success() {
            STATUS_OK
        } else {
            STATUS_FAILED
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.detail())
    }
}

impl<T: HalTransport> HalNavigator<T> {
    /// PUTs a pre-serialized JSON document to `path`.
    ///
    /// Every HTTP status is reported as an [`Outcome`]. The session is not
    /// touched.
    ///
    /// # Errors
    /// Only when no response was obtained ([`HalError::Transport`]).
    pub async fn upload_json(&self, path: &str, body: &str) -> Result<Outcome, HalError> {
        let url = self.session().resolve(path);
        tracing::debug!(url = %url, "uploading JSON document");

        let response = self
            .transport()
            .put(&url, body.to_owned(), JSON_CONTENT_TYPE)
            .await?;
        let outcome = Outcome::from_response(&response);
        tracing::debug!(url = %url, status = %response.status, outcome = %outcome, "upload finished");
        Ok(outcome)
    }

    /// [`upload_json`](Self::upload_json) reporting through a callback.
    ///
    /// `on_result` receives `(label, detail)`: `("OK", <status line>)` on
    /// success and `("FAILED", <detail>)` otherwise, including transport
    /// errors, so bulk uploads can carry on after a failure.
    pub async fn upload_json_with<F>(&self, path: &str, body: &str, on_result: F)
    where
        F: FnOnce(&str, &str),
    {
        match self.upload_json(path, body).await {
            Ok(outcome) => on_result(outcome.status_label(), outcome.detail()),
            Err(e) => on_result(STATUS_FAILED, &e.to_string()),
        }
    }

    /// POSTs `body` as JSON to `path`.
    ///
    /// Failures are logged before being returned as an [`Outcome`].
    ///
    /// # Errors
    /// [`HalError::Json`] if `body` cannot be serialized, or
    /// [`HalError::Transport`] when no response was obtained.
    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<Outcome, HalError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.session().resolve(path);
        let payload = serde_json::to_string(body).map_err(|source| HalError::Json {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(url = %url, "posting JSON document");

        let response = self
            .transport()
            .post(&url, payload, JSON_CONTENT_TYPE)
            .await?;
        let outcome = Outcome::from_response(&response);
        if !outcome.is_success() {
            tracing::error!(url = %url, status = %response.status, detail = %outcome, "POST failed");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::{BASE_URL, ScriptedTransport};
    use http::Method;
    use serde_json::json;

    const PACT_PATH: &str = "/pacts/provider/Provider/consumer/Consumer/version/1.0.0";

    fn navigator(transport: ScriptedTransport) -> HalNavigator<ScriptedTransport> {
        HalNavigator::new(BASE_URL, transport).unwrap()
    }

    fn put(status: u16, content_type: Option<&'static str>, body: &str) -> HalNavigator<ScriptedTransport> {
        navigator(ScriptedTransport::new().respond(Method::PUT, PACT_PATH, status, content_type, body))
    }

    #[tokio::test]
    async fn upload_success_reports_status_line() {
        let nav = put(201, Some("application/hal+json"), "{}");

        let outcome = nav.upload_json(PACT_PATH, r#"{"consumer":{"name":"Consumer"}}"#).await.unwrap();
        assert_eq!(outcome, Outcome::Success("HTTP/1.1 201 Created".to_owned()));
        assert_eq!(outcome.status_label(), "OK");

        let request = &nav.transport().requests()[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, format!("{BASE_URL}{PACT_PATH}"));
        assert_eq!(request.body.as_deref(), Some(r#"{"consumer":{"name":"Consumer"}}"#));
        assert_eq!(
            request.headers,
            vec![("content-type".to_owned(), "application/json".to_owned())]
        );
        assert!(nav.document().is_none());
    }

    #[tokio::test]
    async fn conflict_reports_first_body_line_through_callback() {
        let nav = put(409, Some("text/plain"), "name already exists");

        let mut reported = None;
        nav.upload_json_with(PACT_PATH, "{}", |status, detail| {
            reported = Some((status.to_owned(), detail.to_owned()));
        })
        .await;

        assert_eq!(
            reported,
            Some(("FAILED".to_owned(), "409 Conflict - name already exists".to_owned()))
        );
    }

    #[tokio::test]
    async fn conflict_uses_first_line_even_for_json_bodies() {
        let nav = put(409, Some("application/json"), "{\"errors\": [\"dup\"]}\nsecond");

        let outcome = nav.upload_json(PACT_PATH, "{}").await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Conflict("409 Conflict - {\"errors\": [\"dup\"]}".to_owned())
        );
        assert_eq!(outcome.status_label(), "FAILED");
    }

    #[tokio::test]
    async fn failure_with_errors_list() {
        let nav = put(400, Some("application/json"), r#"{"errors": ["a", "b"]}"#);

        let outcome = nav.upload_json(PACT_PATH, "{}").await.unwrap();
        assert_eq!(outcome, Outcome::Failure("a, b".to_owned()));
        assert_eq!(outcome.to_string(), "a, b");
    }

    #[tokio::test]
    async fn failure_with_text_body() {
        let nav = put(500, Some("text/html"), "Internal error\n<trace>");

        let outcome = nav.upload_json(PACT_PATH, "{}").await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Failure("500 Internal Server Error - Internal error".to_owned())
        );
    }

    #[tokio::test]
    async fn success_callback_receives_ok() {
        let nav = put(200, None, "");

        let mut reported = None;
        nav.upload_json_with(PACT_PATH, "{}", |status, detail| {
            reported = Some((status.to_owned(), detail.to_owned()));
        })
        .await;

        assert_eq!(
            reported,
            Some(("OK".to_owned(), "HTTP/1.1 200 OK".to_owned()))
        );
    }

    #[tokio::test]
    async fn transport_error_goes_to_callback() {
        let nav = navigator(ScriptedTransport::new());

        assert!(matches!(
            nav.upload_json(PACT_PATH, "{}").await,
            Err(HalError::Transport(_))
        ));

        let mut reported = None;
        nav.upload_json_with(PACT_PATH, "{}", |status, detail| {
            reported = Some((status.to_owned(), detail.to_owned()));
        })
        .await;
        let (status, detail) = reported.unwrap();
        assert_eq!(status, "FAILED");
        assert!(detail.contains("no scripted response"), "{detail}");
    }

    #[tokio::test]
    async fn post_serializes_body() {
        let path = "/pacts/provider/P/consumer/C/pact-version/abc/verification-results";
        let nav = navigator(ScriptedTransport::new().respond(
            Method::POST,
            path,
            201,
            Some("application/hal+json"),
            "{}",
        ));

        let outcome = nav
            .post_json(path, &json!({"success": true, "providerApplicationVersion": "1.2.3"}))
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.to_string(), "HTTP/1.1 201 Created");

        let body: serde_json::Value =
            serde_json::from_str(nav.transport().requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["providerApplicationVersion"], "1.2.3");
    }

    #[tokio::test]
    async fn post_failure_is_returned_not_raised() {
        let nav = navigator(ScriptedTransport::new().respond(
            Method::POST,
            "/webhooks",
            422,
            Some("application/json"),
            r#"{"errors": {"events": ["can't be blank"]}}"#,
        ));

        let outcome = nav.post_json("/webhooks", &json!({})).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Failure("events: [can't be blank]".to_owned())
        );
    }

    #[test]
    fn outcome_accessors() {
        let conflict = Outcome::Conflict("409 Conflict - x".to_owned());
        assert!(!conflict.is_success());
        assert_eq!(conflict.detail(), "409 Conflict - x");
        assert_eq!(conflict.to_string(), "409 Conflict - x");
    }
}
