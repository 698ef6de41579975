// crates/nakadi-mock/src/server.rs
// ============================================================================
// Module: Nakadi Mock Server
// Description: HTTP listener exposing the event submission endpoint.
// Purpose: Serve `POST /event-types/{type}/events` for client tests.
// Dependencies: axum, tokio, url
// ============================================================================

//! ## Overview
//! [`NakadiMock`] owns an [`EventTypeRegistry`] and, once started, an axum
//! server on a dedicated thread with its own tokio runtime. Each request is
//! decoded and handled on the blocking pool, so requests run concurrently and
//! a slow handler never stalls the accept loop.
//! Invariants:
//! - `root_url` is available only while the server is running.
//! - `stop` is idempotent and safe without a prior `start`.
//! - Stopping may abort in-flight requests after a short drain period.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::IntoFuture;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;
use std::net::SocketAddr;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::body::to_bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use axum::routing::post;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use url::Url;

use crate::answer::EncodedAnswer;
use crate::audit::MockAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::sink_from_config;
use crate::config::ConfigError;
use crate::config::MockConfig;
use crate::dispatch::DispatchError;
use crate::dispatch::Dispatcher;
use crate::registry::BindingError;
use crate::registry::EventTypeHandle;
use crate::registry::EventTypeRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Route of the event submission endpoint.
pub const SUBMISSION_ROUTE: &str = "/event-types/{type}/events";

/// Time in-flight requests get to finish after `stop`.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Mock lifecycle errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum MockError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Audit sink could not be created.
    #[error("audit sink failed: {0}")]
    Audit(String),
    /// Listener could not be bound.
    #[error("bind failed: {0}")]
    Bind(String),
    /// Runtime or server thread could not be created.
    #[error("runtime failed: {0}")]
    Runtime(String),
    /// Operation requires a running server.
    #[error("mock is not started")]
    NotStarted,
    /// `start` called on a running server.
    #[error("mock is already started")]
    AlreadyStarted,
    /// URL construction failed.
    #[error("invalid url: {0}")]
    Url(String),
}

// ============================================================================
// SECTION: Nakadi Mock
// ============================================================================

/// Running server bookkeeping.
struct RunningServer {
    /// Bound local address.
    addr: SocketAddr,
    /// Shutdown signal.
    shutdown: watch::Sender<bool>,
    /// Server thread.
    join: Option<thread::JoinHandle<()>>,
}

/// Mock of the Nakadi event submission endpoint.
///
/// ```ignore
/// let mut mock = NakadiMock::new();
/// mock.event_type("order.created")?.set_handler(collector.clone())?;
/// mock.start()?;
/// let url = mock.submission_url("order.created")?;
/// // ... exercise the client ...
/// mock.stop();
/// ```
pub struct NakadiMock {
    /// Validated configuration.
    config: MockConfig,
    /// Event type bindings owned by this instance.
    registry: Arc<EventTypeRegistry>,
    /// Audit sink shared with the dispatcher.
    audit: Arc<dyn MockAuditSink>,
    /// Server state while running.
    running: Option<RunningServer>,
}

impl Default for NakadiMock {
    fn default() -> Self {
        Self::new()
    }
}

impl NakadiMock {
    /// Creates a mock with the default configuration and no audit output.
    #[must_use]
    pub fn new() -> Self {
        Self::build(MockConfig::default(), Arc::new(NoopAuditSink))
    }

    /// Creates a mock from configuration, with the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`MockError`] when the configuration is invalid or the audit
    /// sink cannot be opened.
    pub fn from_config(config: MockConfig) -> Result<Self, MockError> {
        config.validate()?;
        let audit =
            sink_from_config(&config.audit).map_err(|err| MockError::Audit(err.to_string()))?;
        Ok(Self::build(config, audit))
    }

    /// Creates a mock from configuration with an injected audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Config`] when the configuration is invalid.
    pub fn with_audit_sink(
        config: MockConfig,
        audit: Arc<dyn MockAuditSink>,
    ) -> Result<Self, MockError> {
        config.validate()?;
        Ok(Self::build(config, audit))
    }

    /// Assembles the mock.
    fn build(config: MockConfig, audit: Arc<dyn MockAuditSink>) -> Self {
        Self {
            config,
            registry: Arc::new(EventTypeRegistry::new(Arc::clone(&audit))),
            audit,
            running: None,
        }
    }

    /// Creates (or resets) an event type with the ignoring handler.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::InvalidName`] when `name` is not a valid event
    /// type name.
    pub fn event_type(&self, name: &str) -> Result<EventTypeHandle, BindingError> {
        self.registry.register(name)
    }

    /// Returns the registry of this instance.
    #[must_use]
    pub const fn registry(&self) -> &Arc<EventTypeRegistry> {
        &self.registry
    }

    /// Returns a transport-neutral dispatcher over this instance's bindings.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.registry), Arc::clone(&self.audit))
    }

    /// Returns whether the server is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Binds the listener and starts serving.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::AlreadyStarted`] when running, or a bind/runtime
    /// error when the server cannot start.
    pub fn start(&mut self) -> Result<(), MockError> {
        if self.running.is_some() {
            return Err(MockError::AlreadyStarted);
        }
        let bind = self.config.server.bind_addr()?;
        let listener = StdTcpListener::bind(bind).map_err(|err| MockError::Bind(err.to_string()))?;
        listener.set_nonblocking(true).map_err(|err| MockError::Bind(err.to_string()))?;
        let addr = listener.local_addr().map_err(|err| MockError::Bind(err.to_string()))?;
        let runtime = Builder::new_multi_thread()
            .worker_threads(self.config.server.workers)
            .thread_name("nakadi-mock-worker")
            .enable_all()
            .build()
            .map_err(|err| MockError::Runtime(err.to_string()))?;
        let listener = {
            let _entered = runtime.enter();
            TcpListener::from_std(listener).map_err(|err| MockError::Bind(err.to_string()))?
        };
        let router = build_router(self.dispatcher(), self.config.server.max_body_bytes);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let join = thread::Builder::new()
            .name("nakadi-mock".to_string())
            .spawn(move || serve(runtime, listener, router, shutdown_rx))
            .map_err(|err| MockError::Runtime(err.to_string()))?;
        self.running = Some(RunningServer {
            addr,
            shutdown,
            join: Some(join),
        });
        Ok(())
    }

    /// Stops the server; does nothing when not running.
    pub fn stop(&mut self) {
        if let Some(mut running) = self.running.take() {
            let _ = running.shutdown.send(true);
            if let Some(join) = running.join.take() {
                let _ = join.join();
            }
        }
    }

    /// Returns the bound socket address.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::NotStarted`] when the server is not running.
    pub fn local_addr(&self) -> Result<SocketAddr, MockError> {
        self.running.as_ref().map(|running| running.addr).ok_or(MockError::NotStarted)
    }

    /// Returns the base URL of the mock, ending in `/`.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::NotStarted`] when the server is not running.
    pub fn root_url(&self) -> Result<Url, MockError> {
        root_url_for(self.local_addr()?)
    }

    /// Returns the submission URL for an event type.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::NotStarted`] when the server is not running.
    pub fn submission_url(&self, event_type: &str) -> Result<Url, MockError> {
        submission_url_for(self.root_url()?, event_type)
    }
}

impl Drop for NakadiMock {
    fn drop(&mut self) {
        self.stop();
        self.registry.clear();
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Shared state of the submission route.
#[derive(Clone)]
struct SubmissionState {
    /// Pipeline over the mock's bindings.
    dispatcher: Dispatcher,
    /// Maximum buffered body size in bytes.
    max_body_bytes: usize,
}

/// Builds the axum router for the submission route.
fn build_router(dispatcher: Dispatcher, max_body_bytes: usize) -> Router {
    Router::new().route(SUBMISSION_ROUTE, post(handle_submission)).with_state(SubmissionState {
        dispatcher,
        max_body_bytes,
    })
}

/// Runs the server until shutdown is signalled and the drain period ends.
fn serve(
    runtime: Runtime,
    listener: TcpListener,
    router: Router,
    shutdown: watch::Receiver<bool>,
) {
    runtime.block_on(async move {
        let mut graceful = shutdown.clone();
        let mut deadline = shutdown;
        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = graceful.wait_for(|stopped| *stopped).await;
        });
        tokio::select! {
            _ = server.into_future() => {}
            () = async move {
                let _ = deadline.wait_for(|stopped| *stopped).await;
                tokio::time::sleep(SHUTDOWN_GRACE).await;
            } => {}
        }
    });
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

/// Handles `POST /event-types/{type}/events`.
///
/// Unknown event types are answered before the body is read; the size limit
/// applies only to bodies that will be decoded.
async fn handle_submission(
    State(state): State<SubmissionState>,
    Path(event_type): Path<String>,
    body: Body,
) -> Response {
    let SubmissionState {
        dispatcher,
        max_body_bytes,
    } = state;
    if !dispatcher.is_registered(&event_type) {
        let err = DispatchError::UnknownEventType(event_type.clone());
        return encoded_response(dispatcher.reject(&event_type, 0, &err));
    }
    let Ok(body) = to_bytes(body, max_body_bytes).await else {
        let err = DispatchError::BodyTooLarge(max_body_bytes);
        return encoded_response(dispatcher.reject(&event_type, 0, &err));
    };
    let encoded = tokio::task::spawn_blocking(move || dispatcher.handle(&event_type, &body))
        .await
        .unwrap_or_else(|err| DispatchError::HandlerFault(err.to_string()).encode());
    encoded_response(encoded)
}

/// Converts an encoded answer into an HTTP response.
fn encoded_response(encoded: EncodedAnswer) -> Response {
    let mut response = Response::new(Body::from(encoded.body));
    *response.status_mut() =
        StatusCode::from_u16(encoded.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if let Some(content_type) = encoded.content_type {
        response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

/// Appends the submission path for `event_type` to a root URL, encoding the
/// name as a single path segment.
fn submission_url_for(root: Url, event_type: &str) -> Result<Url, MockError> {
    let mut url = root;
    url.path_segments_mut()
        .map_err(|()| MockError::Url("root url cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["event-types", event_type, "events"]);
    Ok(url)
}

/// Builds the root URL for a bound address, mapping wildcard binds to loopback.
fn root_url_for(addr: SocketAddr) -> Result<Url, MockError> {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    let url = format!("http://{}/", SocketAddr::new(ip, addr.port()));
    Url::parse(&url).map_err(|err| MockError::Url(err.to_string()))
}

#[cfg(test)]
mod tests;
