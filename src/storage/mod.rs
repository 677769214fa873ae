// Storage module - application records
// Supplies the Application entities that handlers are constructed with

mod application;

pub use application::{Application, ApplicationStore, StoreError};
