// lorabridge - LoRaWAN application-server integration layer
// Delivers uplink data and lifecycle events to external applications and
// receives downlink data back through pluggable transport handlers

pub mod handler;
pub mod storage;
