// Payload Model Tests
// Round-trip and wire-encoding tests for the handler payload types

use chrono::{TimeZone, Utc};
use lorabridge::handler::{
    AckNotification, DataDownPayload, DataUpPayload, DevAddr, DevEui, ErrorNotification,
    JoinNotification, RxInfo,
};

// ============================================================================
// DEVICE IDENTIFIERS
// ============================================================================

#[test]
fn test_dev_eui_display() {
    let eui = DevEui::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]);

    assert_eq!(eui.to_string(), "0102030405060708");
}

#[test]
fn test_dev_eui_parse() {
    let eui: DevEui = "0102030405060708".parse().unwrap();

    assert_eq!(eui.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_dev_eui_parse_wrong_length() {
    let result = "010203".parse::<DevEui>();

    assert!(result.is_err());
}

#[test]
fn test_dev_eui_parse_not_hex() {
    let result = "zz02030405060708".parse::<DevEui>();

    assert!(result.is_err());
}

#[test]
fn test_dev_addr_display_and_parse() {
    let addr = DevAddr::from_bytes([0xde, 0xad, 0xbe, 0xef]);

    assert_eq!(addr.to_string(), "deadbeef");
    assert_eq!("deadbeef".parse::<DevAddr>().unwrap(), addr);
}

#[test]
fn test_dev_addr_parse_wrong_length() {
    assert!("deadbeefff".parse::<DevAddr>().is_err());
}

// ============================================================================
// JSON ROUND-TRIPS
// ============================================================================

fn sample_data_up() -> DataUpPayload {
    DataUpPayload::new(
        "app-1",
        DevEui::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]),
        10,
        2,
        vec![1, 2, 3],
    )
    .with_rx_info(vec![RxInfo {
        mac: "0203040506070809".to_string(),
        time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        rssi: -57,
        lora_snr: 7.5,
    }])
}

#[test]
fn test_data_up_round_trip() {
    let payload = sample_data_up();

    let encoded = serde_json::to_string(&payload).unwrap();
    let decoded: DataUpPayload = serde_json::from_str(&encoded).unwrap();

    assert_eq!(payload, decoded);
}

#[test]
fn test_data_down_round_trip() {
    let payload = DataDownPayload::new(
        DevEui::from_bytes([8, 7, 6, 5, 4, 3, 2, 1]),
        true,
        5,
        vec![0xca, 0xfe],
    );

    let encoded = serde_json::to_string(&payload).unwrap();
    let decoded: DataDownPayload = serde_json::from_str(&encoded).unwrap();

    assert_eq!(payload, decoded);
}

#[test]
fn test_join_notification_round_trip() {
    let payload = JoinNotification {
        application_id: "app-1".to_string(),
        device_eui: DevEui::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]),
        dev_addr: DevAddr::from_bytes([0, 1, 2, 3]),
        time: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    };

    let encoded = serde_json::to_string(&payload).unwrap();
    let decoded: JoinNotification = serde_json::from_str(&encoded).unwrap();

    assert_eq!(payload, decoded);
}

#[test]
fn test_ack_notification_round_trip() {
    let payload = AckNotification {
        device_eui: DevEui::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]),
        f_cnt: 42,
    };

    let encoded = serde_json::to_string(&payload).unwrap();
    let decoded: AckNotification = serde_json::from_str(&encoded).unwrap();

    assert_eq!(payload, decoded);
}

#[test]
fn test_error_notification_round_trip() {
    let payload = ErrorNotification {
        device_eui: DevEui::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]),
        operation: "data-up".to_string(),
        error: "frame-counter did not increment".to_string(),
    };

    let encoded = serde_json::to_string(&payload).unwrap();
    let decoded: ErrorNotification = serde_json::from_str(&encoded).unwrap();

    assert_eq!(payload, decoded);
}

// ============================================================================
// WIRE ENCODING
// ============================================================================

#[test]
fn test_data_up_wire_fields() {
    let payload = sample_data_up();

    let value: serde_json::Value = serde_json::to_value(&payload).unwrap();

    // EUIs travel as hex strings, frame payloads as base64
    assert_eq!(value["device_eui"], "0102030405060708");
    assert_eq!(value["data"], "AQID");
    assert_eq!(value["f_cnt"], 10);
    assert_eq!(value["rx_info"][0]["rssi"], -57);
}

#[test]
fn test_data_down_decodes_base64_data() {
    let json = r#"{"device_eui":"0102030405060708","confirmed":false,"f_port":1,"data":"AQID"}"#;

    let payload: DataDownPayload = serde_json::from_str(json).unwrap();

    assert_eq!(payload.data, vec![1, 2, 3]);
    assert!(!payload.confirmed);
}

#[test]
fn test_data_down_rejects_invalid_base64() {
    let json = r#"{"device_eui":"0102030405060708","confirmed":false,"f_port":1,"data":"@@@"}"#;

    let result = serde_json::from_str::<DataDownPayload>(json);

    assert!(result.is_err());
}
