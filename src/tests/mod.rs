
use std::io::Write;

use crate::config::DnsConfig;
use crate::enums::{DnsStatus, RecordClass, RecordType};
use crate::reply::DnsReply;

#[test]
fn test_record_type_u16_round_trip() {
    for rtype in enum_iterator::all::<RecordType>() {
        assert_eq!(RecordType::from(rtype as u16), rtype);
    }
}

#[test]
fn test_record_class_u16_round_trip() {
    for rclass in enum_iterator::all::<RecordClass>() {
        assert_eq!(RecordClass::from(rclass as u16), rclass);
    }
}

/// The status values cross the IPC boundary; renumbering them breaks every
/// caller built against the old values.
#[test]
fn test_status_codes_are_stable() {
    assert_eq!(i32::from(DnsStatus::Ok), 0);
    assert_eq!(i32::from(DnsStatus::Retry), 1);
    assert_eq!(i32::from(DnsStatus::Invalid), 2);
    assert_eq!(i32::from(DnsStatus::NoName), 3);
    assert_eq!(i32::from(DnsStatus::NotFound), 4);
}

#[test]
fn test_host_reply_as_bytes() {
    let reply = DnsReply::Host {
        reply_tag: 0x0102030405060708,
        addr: "192.0.2.1:0".parse().unwrap(),
        preference: -1,
    };
    let bytes: Vec<u8> = (&reply).into();
    let expected = [
        /* tag */ 1, /* reply_tag */ 1, 2, 3, 4, 5, 6, 7, 8,
        /* sockaddr */ 4, 192, 0, 2, 1, 0, 0, /* preference */ 0xff, 0xff, 0xff, 0xff,
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn test_host_end_reply_as_bytes() {
    let reply = DnsReply::HostEnd {
        reply_tag: 0x29,
        status: DnsStatus::NotFound,
    };
    let bytes: Vec<u8> = (&reply).into();
    assert_eq!(bytes, [2, 0, 0, 0, 0, 0, 0, 0, 0x29, 0, 0, 0, 4]);
}

#[test]
fn test_ptr_reply_as_bytes() {
    let reply = DnsReply::PtrMta {
        reply_tag: 7,
        status: DnsStatus::Ok,
        name: Some("mx1.example.com".to_string()),
    };
    let bytes: Vec<u8> = (&reply).into();
    let mut expected = vec![3, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 0, 0, 15];
    expected.extend(b"mx1.example.com");
    assert_eq!(bytes, expected);

    // no name field on a failed lookup
    let reply = DnsReply::PtrSmtp {
        reply_tag: 7,
        status: DnsStatus::NotFound,
        name: None,
    };
    let bytes: Vec<u8> = (&reply).into();
    assert_eq!(bytes, [4, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 4]);
}

#[test]
fn test_mx_preference_reply_as_bytes() {
    let reply = DnsReply::MxPreference {
        reply_tag: 7,
        status: DnsStatus::Ok,
        preference: Some(20),
    };
    let bytes: Vec<u8> = (&reply).into();
    assert_eq!(bytes, [5, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 0, 0, 20]);
}

#[test]
fn test_config_defaults() {
    let config = DnsConfig::default();
    assert_eq!(config.max_in_flight, crate::MAX_IN_FLIGHT);
    assert_eq!(config.request_queue, 64);
}

#[test]
fn test_config_from_json_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("should create a temp file");
    file.write_all(br#"{"max_in_flight": 7}"#)
        .expect("should write config");
    let config = DnsConfig::try_from_file(file.path()).expect("should load config");
    assert_eq!(config.max_in_flight, 7);
    assert_eq!(config.request_queue, 64);
}

#[test]
fn test_config_rejects_garbage() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("should create a temp file");
    file.write_all(br#"{"max_in_flight": "lots"}"#)
        .expect("should write config");
    assert!(DnsConfig::try_from_file(file.path()).is_err());
}
