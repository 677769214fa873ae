// HTTP Callback Handler
// Reference transport: delivers payloads as JSON POSTs to the application's
// registered callback URL and exposes the downlink intake channel

use super::payload::{
    AckNotification, DataDownPayload, DataUpPayload, ErrorNotification, JoinNotification,
};
use super::traits::{Handler, HandlerError, Operation};
use crate::storage::Application;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// ============================================================================
// HTTP HANDLER CONFIG
// ============================================================================

/// Configuration for the HTTP callback handler
#[derive(Debug, Clone)]
pub struct HttpHandlerConfig {
    /// Timeout for a single callback request in seconds
    pub request_timeout_secs: u64,
    /// Optional User-Agent header for callback requests
    pub user_agent: Option<String>,
}

impl Default for HttpHandlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            user_agent: None,
        }
    }
}

impl HttpHandlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), HandlerError> {
        if self.request_timeout_secs == 0 {
            return Err(HandlerError::InvalidConfig(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// HTTP HANDLER
// ============================================================================

/// HTTP callback implementation of the Handler trait.
///
/// The callback URL is bound at construction and read-only afterward; send
/// calls share no mutable state, so any number of workers may send
/// concurrently. Downlink payloads enter through the intake sender (fed by an
/// inbound listener outside this crate) and are drained by the server via
/// data_down_chan.
pub struct HttpHandler {
    application: Application,
    client: reqwest::Client,
    data_down_tx: Mutex<Option<mpsc::UnboundedSender<DataDownPayload>>>,
    data_down_rx: Mutex<Option<mpsc::UnboundedReceiver<DataDownPayload>>>,
}

impl HttpHandler {
    /// Create a handler bound to the application's callback URL
    pub fn new(application: Application, config: HttpHandlerConfig) -> Result<Self, HandlerError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| HandlerError::InvalidConfig(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();

        info!(
            application_id = %application.id(),
            callback_url = %application.callback_url(),
            "handler/http: starting handler"
        );

        Ok(Self {
            application,
            client,
            data_down_tx: Mutex::new(Some(tx)),
            data_down_rx: Mutex::new(Some(rx)),
        })
    }

    /// Push one downlink payload onto the intake channel. Called by the
    /// inbound listener that decodes downlink requests from the application.
    /// Sender clones are never handed out, so close() alone decides when
    /// readers observe end-of-stream.
    pub fn enqueue_data_down(&self, payload: DataDownPayload) -> Result<(), HandlerError> {
        let guard = self.data_down_tx.lock().unwrap();
        match guard.as_ref() {
            Some(tx) => tx.send(payload).map_err(|_| HandlerError::Closed),
            None => Err(HandlerError::Closed),
        }
    }

    /// Serialize a payload and POST it to the callback URL.
    /// One attempt; encoding and transport failures are returned, not retried.
    async fn post<T: Serialize>(&self, operation: Operation, payload: &T) -> Result<(), HandlerError> {
        let app_id = self.application.id();
        let url = self.application.callback_url();

        let body = serde_json::to_vec(payload)
            .map_err(|e| HandlerError::encoding(operation, app_id, e))?;

        debug!(
            application_id = %app_id,
            operation = %operation,
            bytes = body.len(),
            "handler/http: posting payload"
        );

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| HandlerError::delivery(operation, app_id, url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                application_id = %app_id,
                operation = %operation,
                status = %status,
                "handler/http: callback endpoint rejected payload"
            );
            return Err(HandlerError::delivery(
                operation,
                app_id,
                url,
                format!("endpoint returned status {}", status),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl Handler for HttpHandler {
    async fn send_data_up(&self, payload: DataUpPayload) -> Result<(), HandlerError> {
        self.post(Operation::DataUp, &payload).await
    }

    async fn send_join_notification(&self, payload: JoinNotification) -> Result<(), HandlerError> {
        self.post(Operation::Join, &payload).await
    }

    async fn send_ack_notification(&self, payload: AckNotification) -> Result<(), HandlerError> {
        self.post(Operation::Ack, &payload).await
    }

    async fn send_error_notification(
        &self,
        payload: ErrorNotification,
    ) -> Result<(), HandlerError> {
        self.post(Operation::Error, &payload).await
    }

    fn data_down_chan(&self) -> Option<mpsc::UnboundedReceiver<DataDownPayload>> {
        self.data_down_rx.lock().unwrap().take()
    }

    fn close(&self) -> Result<(), HandlerError> {
        // Dropping the sender closes the channel; pending readers see None
        let mut guard = self.data_down_tx.lock().unwrap();
        match guard.take() {
            Some(_tx) => {
                info!(
                    application_id = %self.application.id(),
                    "handler/http: closing handler"
                );
                Ok(())
            }
            None => Err(HandlerError::Closed),
        }
    }
}
