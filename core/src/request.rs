//! Declarative endpoint descriptions.
//!
//! # Design
//! A `RequestConfiguration` value describes one call: where it goes, what it
//! sends, which session carries it and how the response becomes `Output`.
//! Values are built fresh per call and hold no state between calls.
//!
//! Running a configuration goes through [`DataTask`]: the request is built
//! eagerly (so construction errors surface before anything is sent), while
//! the round-trip itself is lazy until the task is awaited or resumed. The
//! task owns a session handle, the request and a plain `fn` processor, so it
//! is `'static` and can be spawned onto the runtime.

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::Domain;
use crate::error::RestKitError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestContent};
use crate::json::{json_for_data, JsonInitializable};
use crate::session::Session;

/// Turns a response into an endpoint's output.
pub type ResponseProcessor<T> = fn(HttpResponse) -> Result<T, RestKitError>;

/// One endpoint call, described as data.
pub trait RequestConfiguration {
    type Output: Send + 'static;
    type Domain: Domain;
    type Session: Session;

    fn domain(&self) -> &Self::Domain;
    fn api_path(&self) -> &str;
    fn method(&self) -> HttpMethod;
    fn content(&self) -> RequestContent;
    fn session(&self) -> &Self::Session;

    /// ETag for a conditional request. None by default.
    fn etag(&self) -> Option<String> {
        None
    }

    /// Convert the raw response into `Output`.
    ///
    /// Endpoints whose output is [`JsonInitializable`] usually delegate to
    /// [`decode_json_response`].
    fn process_response(response: HttpResponse) -> Result<Self::Output, RestKitError>;

    /// Build the request this configuration describes.
    fn url_request(&self) -> Result<HttpRequest, RestKitError> {
        let url = self.domain().url_for(self.api_path())?;
        HttpRequest::build(url, self.method(), &self.content(), self.etag().as_deref())
    }

    /// Build the request and wrap it in a task that has not started yet.
    fn data_task(&self) -> Result<DataTask<Self::Session, Self::Output>, RestKitError> {
        let request = self.url_request()?;
        debug!(method = %request.method, url = %request.url, "request built");
        Ok(DataTask::new(
            self.session().clone(),
            request,
            Self::process_response,
        ))
    }

    /// Build, send and process the request.
    fn send(&self) -> impl Future<Output = Result<Self::Output, RestKitError>> + Send + 'static {
        let task = self.data_task();
        async move { task?.await }
    }

    /// Start the call immediately and report through exactly one handler.
    ///
    /// If the request cannot be built, `on_error` runs on the calling thread
    /// and `None` is returned. Otherwise the call is spawned on the current
    /// tokio runtime and its handle is returned.
    fn perform_task<E, S>(&self, on_error: E, on_success: S) -> Option<JoinHandle<()>>
    where
        E: FnOnce(RestKitError) + Send + 'static,
        S: FnOnce(Self::Output) + Send + 'static,
    {
        match self.data_task() {
            Ok(task) => Some(task.resume(on_error, on_success)),
            Err(err) => {
                on_error(err);
                None
            }
        }
    }
}

/// Default processor for JSON endpoints: requires a body, parses it and
/// constructs `T`. The status code is not inspected.
pub fn decode_json_response<T: JsonInitializable>(response: HttpResponse) -> Result<T, RestKitError> {
    T::from_json(&json_for_data(response.body.as_deref())?)
}

/// GET endpoints that accept 200 and 201 and parse the raw body themselves.
///
/// Every implementor is a [`RequestConfiguration`] with method `GET` and no
/// content. Any other status becomes [`RestKitError::UnexpectedCode`].
pub trait GetRequestConfiguration {
    type Output: Send + 'static;
    type Domain: Domain;
    type Session: Session;

    fn domain(&self) -> &Self::Domain;
    fn api_path(&self) -> &str;
    fn session(&self) -> &Self::Session;

    fn etag(&self) -> Option<String> {
        None
    }

    fn parse_result(data: &[u8]) -> Result<Self::Output, RestKitError>;
}

impl<T: GetRequestConfiguration> RequestConfiguration for T {
    type Output = <T as GetRequestConfiguration>::Output;
    type Domain = <T as GetRequestConfiguration>::Domain;
    type Session = <T as GetRequestConfiguration>::Session;

    fn domain(&self) -> &<T as GetRequestConfiguration>::Domain {
        GetRequestConfiguration::domain(self)
    }

    fn api_path(&self) -> &str {
        GetRequestConfiguration::api_path(self)
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn content(&self) -> RequestContent {
        RequestContent::None
    }

    fn session(&self) -> &<T as GetRequestConfiguration>::Session {
        GetRequestConfiguration::session(self)
    }

    fn etag(&self) -> Option<String> {
        GetRequestConfiguration::etag(self)
    }

    fn process_response(
        response: HttpResponse,
    ) -> Result<<T as GetRequestConfiguration>::Output, RestKitError> {
        if response.status != 200 && response.status != 201 {
            warn!(status = response.status, "unexpected status for GET request");
            return Err(RestKitError::UnexpectedCode {
                code: response.status,
                body: response.body,
            });
        }
        let data = response.body.ok_or(RestKitError::NoDataInResponse)?;
        T::parse_result(&data)
    }
}

/// A built request waiting to be sent.
///
/// Await it (or call [`DataTask::run`]) to get the result, or
/// [`resume`](DataTask::resume) it with handlers to run it in the background.
pub struct DataTask<S, T> {
    session: S,
    request: HttpRequest,
    process: ResponseProcessor<T>,
}

impl<S: Session, T: Send + 'static> DataTask<S, T> {
    pub fn new(session: S, request: HttpRequest, process: ResponseProcessor<T>) -> Self {
        Self {
            session,
            request,
            process,
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Send the request and process the response.
    pub async fn run(self) -> Result<T, RestKitError> {
        let DataTask {
            session,
            request,
            process,
        } = self;
        let method = request.method;
        let url = request.url.clone();

        let response = match session.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, %url, error = %err, "request failed");
                return Err(err);
            }
        };
        debug!(%method, %url, status = response.status, "request completed");
        process(response)
    }

    /// Spawn the task; exactly one of the handlers runs when it completes.
    ///
    /// Aborting the returned handle drops the in-flight request and runs
    /// neither handler.
    pub fn resume<E, F>(self, on_error: E, on_success: F) -> JoinHandle<()>
    where
        E: FnOnce(RestKitError) + Send + 'static,
        F: FnOnce(T) + Send + 'static,
    {
        tokio::spawn(async move {
            match self.run().await {
                Ok(output) => on_success(output),
                Err(err) => on_error(err),
            }
        })
    }
}

impl<S: Session, T: Send + 'static> IntoFuture for DataTask<S, T> {
    type Output = Result<T, RestKitError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.run())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::UrlDomain;

    /// Session that records requests and answers with a canned response.
    #[derive(Clone)]
    struct CannedSession {
        response: Arc<Mutex<Option<Result<HttpResponse, String>>>>,
        seen: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl CannedSession {
        fn answering(response: Result<HttpResponse, String>) -> Self {
            Self {
                response: Arc::new(Mutex::new(Some(response))),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl Session for CannedSession {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RestKitError> {
            self.seen.lock().unwrap().push(request);
            match self.response.lock().unwrap().take() {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(RestKitError::transport(message)),
                None => Err(RestKitError::transport("session already used")),
            }
        }
    }

    fn ok(status: u16, body: &str) -> Result<HttpResponse, String> {
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: (!body.is_empty()).then(|| body.as_bytes().to_vec()),
        })
    }

    struct PostEcho {
        domain: UrlDomain,
        session: CannedSession,
        payload: Value,
    }

    impl RequestConfiguration for PostEcho {
        type Output = Value;
        type Domain = UrlDomain;
        type Session = CannedSession;

        fn domain(&self) -> &UrlDomain {
            &self.domain
        }

        fn api_path(&self) -> &str {
            "echo"
        }

        fn method(&self) -> HttpMethod {
            HttpMethod::Post
        }

        fn content(&self) -> RequestContent {
            RequestContent::Json(self.payload.clone())
        }

        fn session(&self) -> &CannedSession {
            &self.session
        }

        fn process_response(response: HttpResponse) -> Result<Value, RestKitError> {
            decode_json_response(response)
        }
    }

    struct GetRaw {
        domain: UrlDomain,
        session: CannedSession,
        etag: Option<String>,
    }

    impl GetRequestConfiguration for GetRaw {
        type Output = String;
        type Domain = UrlDomain;
        type Session = CannedSession;

        fn domain(&self) -> &UrlDomain {
            &self.domain
        }

        fn api_path(&self) -> &str {
            ""
        }

        fn session(&self) -> &CannedSession {
            &self.session
        }

        fn etag(&self) -> Option<String> {
            self.etag.clone()
        }

        fn parse_result(data: &[u8]) -> Result<String, RestKitError> {
            Ok(String::from_utf8_lossy(data).into_owned())
        }
    }

    fn domain() -> UrlDomain {
        UrlDomain::parse("https://example.test").unwrap()
    }

    fn get_raw(response: Result<HttpResponse, String>) -> GetRaw {
        GetRaw {
            domain: domain(),
            session: CannedSession::answering(response),
            etag: None,
        }
    }

    #[test]
    fn post_request_carries_json_body() {
        let config = PostEcho {
            domain: domain(),
            session: CannedSession::answering(ok(200, "{}")),
            payload: json!({"a": 1}),
        };
        let request = config.url_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url.as_str(), "https://example.test/echo");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("Content-Encoding"), Some("gzip"));
        assert_eq!(request.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
    }

    #[test]
    fn get_request_uses_base_url_and_etag() {
        let mut config = get_raw(ok(200, "x"));
        config.etag = Some("\"v1\"".to_string());
        let request = config.url_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.as_str(), "https://example.test/");
        assert_eq!(request.header("If-None-Match"), Some("\"v1\""));
        assert!(request.body.is_none());
    }

    #[test]
    fn json_processor_requires_body() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: None,
        };
        let err = decode_json_response::<Value>(response).unwrap_err();
        assert!(matches!(err, RestKitError::NoDataInResponse));
    }

    #[test]
    fn get_processor_maps_status_to_unexpected_code() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: Some(b"boom".to_vec()),
        };
        let err = GetRaw::process_response(response).unwrap_err();
        assert!(matches!(
            err,
            RestKitError::UnexpectedCode { code: 500, body: Some(ref b) } if b == b"boom"
        ));
    }

    #[test]
    fn get_processor_accepts_created() {
        let response = HttpResponse {
            status: 201,
            headers: Vec::new(),
            body: Some(b"made".to_vec()),
        };
        assert_eq!(GetRaw::process_response(response).unwrap(), "made");
    }

    #[tokio::test]
    async fn awaiting_a_task_sends_once() {
        let config = get_raw(ok(200, "hello"));
        let seen = config.session.seen.clone();
        let output = config.send().await.unwrap();
        assert_eq!(output, "hello");
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transport_error_is_surfaced_verbatim() {
        let config = get_raw(Err("connection reset".to_string()));
        let err = config.send().await.unwrap_err();
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[tokio::test]
    async fn perform_task_runs_exactly_one_handler() {
        let config = get_raw(ok(404, ""));
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let on_error_tx = tx.clone();

        let handle = config
            .perform_task(
                move |err| {
                    if let Some(tx) = on_error_tx.lock().unwrap().take() {
                        let _ = tx.send(Err(err));
                    }
                },
                move |output| {
                    if let Some(tx) = tx.lock().unwrap().take() {
                        let _ = tx.send(Ok(output));
                    }
                },
            )
            .unwrap();

        handle.await.unwrap();
        let result = rx.await.unwrap();
        assert!(matches!(result, Err(RestKitError::UnexpectedCode { code: 404, body: None })));
    }

    #[test]
    fn perform_task_reports_build_errors_synchronously() {
        /// Endpoint addressed by a caller-supplied absolute URL.
        struct Absolute {
            domain: UrlDomain,
            session: CannedSession,
            raw_url: String,
        }

        impl RequestConfiguration for Absolute {
            type Output = Value;
            type Domain = UrlDomain;
            type Session = CannedSession;

            fn domain(&self) -> &UrlDomain {
                &self.domain
            }

            fn api_path(&self) -> &str {
                ""
            }

            fn method(&self) -> HttpMethod {
                HttpMethod::Get
            }

            fn content(&self) -> RequestContent {
                RequestContent::None
            }

            fn session(&self) -> &CannedSession {
                &self.session
            }

            fn url_request(&self) -> Result<HttpRequest, RestKitError> {
                let url = url::Url::parse(&self.raw_url)?;
                HttpRequest::build(url, self.method(), &self.content(), None)
            }

            fn process_response(response: HttpResponse) -> Result<Value, RestKitError> {
                decode_json_response(response)
            }
        }

        let config = Absolute {
            domain: domain(),
            session: CannedSession::answering(ok(200, "{}")),
            raw_url: "not a url".to_string(),
        };
        let failure = Arc::new(Mutex::new(None));
        let slot = failure.clone();
        let handle = config.perform_task(move |err| *slot.lock().unwrap() = Some(err), |_| {});

        assert!(handle.is_none());
        assert!(matches!(*failure.lock().unwrap(), Some(RestKitError::InvalidUrl(_))));
        assert!(config.session.seen.lock().unwrap().is_empty());
    }
}
