// Handler Trait and Core Types
// Defines the abstract Handler contract every transport implementation satisfies

use super::payload::{
    AckNotification, DataDownPayload, DataUpPayload, ErrorNotification, JoinNotification,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

// ============================================================================
// OPERATIONS
// ============================================================================

/// The operation a handler was performing when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DataUp,
    Join,
    Ack,
    Error,
    DataDown,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DataUp => "data-up",
            Self::Join => "join-notification",
            Self::Ack => "ack-notification",
            Self::Error => "error-notification",
            Self::DataDown => "data-down",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// HANDLER ERRORS
// ============================================================================

/// Errors returned by handler operations.
/// None of these are fatal; the caller decides whether to retry or surface.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    #[error("encoding {operation} payload for application {application_id}: {reason}")]
    Encoding {
        operation: Operation,
        application_id: String,
        reason: String,
    },

    #[error("delivering {operation} payload for application {application_id} to {endpoint}: {reason}")]
    Delivery {
        operation: Operation,
        application_id: String,
        endpoint: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("handler is closed")]
    Closed,
}

impl HandlerError {
    /// Build an encoding error with operation and application context
    pub fn encoding(operation: Operation, application_id: &str, reason: impl fmt::Display) -> Self {
        Self::Encoding {
            operation,
            application_id: application_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build a delivery error with operation, application, and endpoint context
    pub fn delivery(
        operation: Operation,
        application_id: &str,
        endpoint: &str,
        reason: impl fmt::Display,
    ) -> Self {
        Self::Delivery {
            operation,
            application_id: application_id.to_string(),
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if this is a serialization failure (always local, never retried)
    pub fn is_encoding_error(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }

    /// Check if this is a transmission failure
    pub fn is_delivery_error(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }
}

// ============================================================================
// HANDLER TRAIT
// ============================================================================

/// Abstract handler trait for delivering events to an external application.
///
/// Send methods perform a single transmission attempt and return failures to
/// the caller; there is no internal retry or queueing. Implementations must
/// tolerate concurrent send calls from multiple workers.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Deliver one uplink event
    async fn send_data_up(&self, payload: DataUpPayload) -> Result<(), HandlerError>;

    /// Deliver a device-joined notification
    async fn send_join_notification(&self, payload: JoinNotification) -> Result<(), HandlerError>;

    /// Deliver a downlink-acknowledged notification
    async fn send_ack_notification(&self, payload: AckNotification) -> Result<(), HandlerError>;

    /// Deliver a failure notification
    async fn send_error_notification(&self, payload: ErrorNotification)
        -> Result<(), HandlerError>;

    /// Take the receiving half of the downlink intake channel.
    ///
    /// Payloads arrive in the order the transport accepted them. Ownership of
    /// the receiver transfers to the caller; subsequent calls return None.
    /// The receiver yields None once the handler is closed.
    fn data_down_chan(&self) -> Option<mpsc::UnboundedReceiver<DataDownPayload>>;

    /// Stop the handler: close the intake channel so pending readers observe
    /// end-of-stream, and release transport resources.
    ///
    /// The first call returns Ok; later calls return HandlerError::Closed.
    fn close(&self) -> Result<(), HandlerError>;
}

// ============================================================================
// MOCK HANDLER
// ============================================================================

/// In-memory implementation of Handler for testing server pipelines
pub struct MockHandler {
    failure_message: Option<String>,
    data_up: Mutex<Vec<DataUpPayload>>,
    joins: Mutex<Vec<JoinNotification>>,
    acks: Mutex<Vec<AckNotification>>,
    errors: Mutex<Vec<ErrorNotification>>,
    data_down_tx: Mutex<Option<mpsc::UnboundedSender<DataDownPayload>>>,
    data_down_rx: Mutex<Option<mpsc::UnboundedReceiver<DataDownPayload>>>,
}

impl MockHandler {
    /// Create a new mock handler that accepts every send
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            failure_message: None,
            data_up: Mutex::new(Vec::new()),
            joins: Mutex::new(Vec::new()),
            acks: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            data_down_tx: Mutex::new(Some(tx)),
            data_down_rx: Mutex::new(Some(rx)),
        }
    }

    /// Configure every send to fail with a delivery error
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure_message = Some(message.to_string());
        self
    }

    fn record<T>(&self, store: &Mutex<Vec<T>>, payload: T, operation: Operation) -> Result<(), HandlerError> {
        if let Some(message) = &self.failure_message {
            return Err(HandlerError::delivery(operation, "mock", "mock://", message));
        }
        store.lock().unwrap().push(payload);
        Ok(())
    }

    /// Uplink payloads accepted so far
    pub fn sent_data_up(&self) -> Vec<DataUpPayload> {
        self.data_up.lock().unwrap().clone()
    }

    /// Join notifications accepted so far
    pub fn sent_joins(&self) -> Vec<JoinNotification> {
        self.joins.lock().unwrap().clone()
    }

    /// Ack notifications accepted so far
    pub fn sent_acks(&self) -> Vec<AckNotification> {
        self.acks.lock().unwrap().clone()
    }

    /// Error notifications accepted so far
    pub fn sent_errors(&self) -> Vec<ErrorNotification> {
        self.errors.lock().unwrap().clone()
    }

    /// Push a downlink payload onto the intake channel
    pub fn enqueue_data_down(&self, payload: DataDownPayload) -> Result<(), HandlerError> {
        let guard = self.data_down_tx.lock().unwrap();
        match guard.as_ref() {
            Some(tx) => tx.send(payload).map_err(|_| HandlerError::Closed),
            None => Err(HandlerError::Closed),
        }
    }
}

impl Default for MockHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for MockHandler {
    async fn send_data_up(&self, payload: DataUpPayload) -> Result<(), HandlerError> {
        self.record(&self.data_up, payload, Operation::DataUp)
    }

    async fn send_join_notification(&self, payload: JoinNotification) -> Result<(), HandlerError> {
        self.record(&self.joins, payload, Operation::Join)
    }

    async fn send_ack_notification(&self, payload: AckNotification) -> Result<(), HandlerError> {
        self.record(&self.acks, payload, Operation::Ack)
    }

    async fn send_error_notification(
        &self,
        payload: ErrorNotification,
    ) -> Result<(), HandlerError> {
        self.record(&self.errors, payload, Operation::Error)
    }

    fn data_down_chan(&self) -> Option<mpsc::UnboundedReceiver<DataDownPayload>> {
        self.data_down_rx
            .lock()
            .expect("intake receiver lock poisoned")
            .take()
    }

    fn close(&self) -> Result<(), HandlerError> {
        let mut guard = self.data_down_tx.lock().unwrap();
        match guard.take() {
            Some(_tx) => Ok(()),
            None => Err(HandlerError::Closed),
        }
    }
}
