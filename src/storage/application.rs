// Application records - the external collaborators handlers deliver to
// Each application owns a registered callback endpoint; handlers reference
// these records but the store owns their lifecycle

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

// ============================================================================
// APPLICATION
// ============================================================================

/// An external application registered with the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    id: String,
    name: String,
    callback_url: String,
}

impl Application {
    /// Create a new application record
    pub fn new(id: &str, name: &str, callback_url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            callback_url: callback_url.to_string(),
        }
    }

    /// Get the application identity
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the application name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the registered callback endpoint
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Replace the callback endpoint
    pub fn with_callback_url(mut self, callback_url: &str) -> Self {
        self.callback_url = callback_url.to_string();
        self
    }
}

// ============================================================================
// STORE ERROR
// ============================================================================

/// Errors from application-store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Application not found: {0}")]
    NotFound(String),

    #[error("Duplicate application: {0}")]
    Duplicate(String),
}

// ============================================================================
// APPLICATION STORE
// ============================================================================

/// In-memory store of application records, keyed by application id
pub struct ApplicationStore {
    applications: RwLock<HashMap<String, Application>>,
}

impl ApplicationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            applications: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new application
    pub fn insert(&self, application: Application) -> Result<(), StoreError> {
        let mut applications = self.applications.write().unwrap();
        if applications.contains_key(application.id()) {
            return Err(StoreError::Duplicate(application.id().to_string()));
        }
        applications.insert(application.id().to_string(), application);
        Ok(())
    }

    /// Look up an application by id
    pub fn get(&self, id: &str) -> Result<Application, StoreError> {
        self.applications
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Replace an existing application record
    pub fn update(&self, application: Application) -> Result<(), StoreError> {
        let mut applications = self.applications.write().unwrap();
        if !applications.contains_key(application.id()) {
            return Err(StoreError::NotFound(application.id().to_string()));
        }
        applications.insert(application.id().to_string(), application);
        Ok(())
    }

    /// Remove an application, returning the removed record
    pub fn remove(&self, id: &str) -> Result<Application, StoreError> {
        self.applications
            .write()
            .unwrap()
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Number of registered applications
    pub fn len(&self) -> usize {
        self.applications.read().unwrap().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.applications.read().unwrap().is_empty()
    }
}

impl Default for ApplicationStore {
    fn default() -> Self {
        Self::new()
    }
}
