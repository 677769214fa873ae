// Handler module - the notification-dispatch boundary
// Delivers uplink data and lifecycle events to an external application and
// receives downlink data back, without the server knowing the transport

mod http;
mod payload;
mod traits;

pub use traits::{
    // Core trait
    Handler,
    // Errors
    HandlerError, Operation,
    // In-memory implementation for tests and pipelines without a network
    MockHandler,
};

pub use payload::{
    AckNotification, DataDownPayload, DataUpPayload, DevAddr, DevEui, ErrorNotification,
    JoinNotification, ParseIdError, RxInfo,
};

pub use http::{HttpHandler, HttpHandlerConfig};
