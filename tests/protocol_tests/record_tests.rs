//! Tests for the command record
//!
//! These tests verify:
//! - Encoded records are exactly 80 bytes with fields at fixed offsets
//! - Decode inverts encode
//! - Layouts that do not add up to 80 bytes are rejected

use smckv::protocol::{
    CommandRecord, DataType, KeyInfo, LimitData, RecordLayout, Selector, SmcKey, Version,
    PAYLOAD_SIZE, RECORD_SIZE,
};
use smckv::SmcError;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_record() -> CommandRecord {
    CommandRecord {
        key: SmcKey::from_bytes(*b"F0Mn").id(),
        version: Version {
            major: 1,
            minor: 2,
            build: 3,
            reserved: 4,
            release: 0x0506,
        },
        limit_data: LimitData {
            version: 7,
            length: 8,
            cpu_limit: 9,
            gpu_limit: 10,
            mem_limit: 11,
        },
        key_info: KeyInfo {
            data_size: 2,
            data_type: DataType::FPE2.tag.id(),
            attributes: 0xD0,
        },
        result: 0x84,
        status: 0x01,
        data8: Selector::WriteKey as u8,
        data32: 0xAABB_CCDD,
        bytes: [0x5A; PAYLOAD_SIZE],
    }
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_field_offsets() {
    let record = sample_record();
    let bytes = record.encode();

    assert_eq!(bytes.len(), RECORD_SIZE);
    assert_eq!(&bytes[0..4], &record.key.to_ne_bytes());
    assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);
    assert_eq!(&bytes[8..10], &0x0506u16.to_ne_bytes());
    assert_eq!(&bytes[10..12], &[0, 0]);
    assert_eq!(&bytes[12..14], &7u16.to_ne_bytes());
    assert_eq!(&bytes[16..20], &9u32.to_ne_bytes());
    assert_eq!(&bytes[24..28], &11u32.to_ne_bytes());
    assert_eq!(&bytes[28..32], &2u32.to_ne_bytes());
    assert_eq!(&bytes[32..36], &DataType::FPE2.tag.id().to_ne_bytes());
    assert_eq!(bytes[36], 0xD0);
    assert_eq!(&bytes[37..40], &[0, 0, 0]);
    assert_eq!(bytes[40], 0x84);
    assert_eq!(bytes[41], 0x01);
    assert_eq!(bytes[42], 6);
    assert_eq!(bytes[43], 0);
    assert_eq!(&bytes[44..48], &0xAABB_CCDDu32.to_ne_bytes());
    assert_eq!(&bytes[48..80], &[0x5A; PAYLOAD_SIZE]);
}

#[test]
fn test_decode_inverts_encode() {
    let record = sample_record();
    assert_eq!(CommandRecord::decode(&record.encode()), record);

    let empty = CommandRecord::default();
    assert_eq!(CommandRecord::decode(&empty.encode()), empty);
}

#[test]
fn test_default_layout() {
    let layout = RecordLayout::default();
    assert_eq!(layout, RecordLayout::APPLE_SMC);
    assert_eq!(layout.size(), RECORD_SIZE);
    assert_eq!(layout.payload_offset(), 48);
    assert!(layout.validate().is_ok());
}

#[test]
fn test_mis_padded_layout_rejected() {
    let layout = RecordLayout {
        version_pad: 4,
        ..RecordLayout::APPLE_SMC
    };

    match sample_record().encode_with(&layout) {
        Err(SmcError::LayoutError { size }) => assert_eq!(size, 82),
        other => panic!("Expected LayoutError, got {:?}", other),
    }

    let packed = RecordLayout {
        version_pad: 0,
        key_info_pad: 0,
        data8_pad: 0,
    };
    assert!(matches!(packed.validate(), Err(SmcError::LayoutError { size: 74 })));
    assert!(CommandRecord::decode_with(&packed, &[0u8; RECORD_SIZE]).is_err());
}

#[test]
fn test_encode_with_default_layout_matches_encode() {
    let record = sample_record();
    assert_eq!(record.encode_with(&RecordLayout::APPLE_SMC).unwrap(), record.encode());
}

// =============================================================================
// Request Construction Tests
// =============================================================================

#[test]
fn test_new_request() {
    let key = SmcKey::from_bytes(*b"TC0P");
    let record = CommandRecord::new(key, Selector::GetKeyInfo);

    assert_eq!(record.smc_key(), key);
    assert_eq!(record.selector(), Some(Selector::GetKeyInfo));
    assert_eq!(record.data8, 9);
    assert_eq!(record.result, 0);
}

#[test]
fn test_selector_values() {
    assert_eq!(Selector::ReadKey as u8, 5);
    assert_eq!(Selector::WriteKey as u8, 6);
    assert_eq!(Selector::GetKeyCount as u8, 7);
    assert_eq!(Selector::GetKeyFromIndex as u8, 8);
    assert_eq!(Selector::GetKeyInfo as u8, 9);
    assert_eq!(Selector::from_u8(42), None);
}

#[test]
fn test_payload() {
    let mut record = CommandRecord::new(SmcKey::from_bytes(*b"F0Mn"), Selector::WriteKey);
    record.set_payload(&[31, 64]).unwrap();

    assert_eq!(record.payload(2), &[31, 64]);
    assert_eq!(record.payload(100).len(), PAYLOAD_SIZE);
    assert!(matches!(record.set_payload(&[0u8; 33]), Err(SmcError::Protocol(_))));
}

#[test]
fn test_key_info_data_type() {
    let info = KeyInfo::from(DataType::SP78);
    assert_eq!(info.data_size, 2);
    assert_eq!(info.data_type(), DataType::SP78);
}
