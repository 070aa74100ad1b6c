//! Tests for the protocol engine
//!
//! These tests verify:
//! - Two-phase read and write exchanges
//! - Status classification (key not found, privilege, transport failure)
//! - Type checks before any write
//! - Layout validation before any device call
//! - Concurrent callers never interleave phases on one connection

use std::sync::Arc;
use std::thread;

use smckv::protocol::{codec, DataType, RecordLayout, Selector, SmcKey};
use smckv::transport::{IoReturn, SimulatedSmc};
use smckv::{Config, Smc, SmcError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (SimulatedSmc, Smc<SimulatedSmc>) {
    let sim = SimulatedSmc::macbook();
    let smc = Smc::new(sim.clone());
    (sim, smc)
}

fn key(name: &str) -> SmcKey {
    SmcKey::new(name).unwrap()
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_value_two_phases() {
    let (sim, smc) = setup();

    let value = smc.read_value(key("F0Ac")).unwrap();
    assert_eq!(value.key, key("F0Ac"));
    assert_eq!(value.data_type, DataType::FPE2);
    assert_eq!(value.bytes, vec![31, 64]);
    assert_eq!(value.as_fpe2().unwrap(), 2000);

    let calls = sim.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].selector(), Some(Selector::GetKeyInfo));
    assert_eq!(calls[1].selector(), Some(Selector::ReadKey));
    assert!(calls.iter().all(|c| c.key == key("F0Ac")));
}

#[test]
fn test_read_missing_key_single_call() {
    let (sim, smc) = setup();

    match smc.read_value(key("ZZZZ")) {
        Err(SmcError::KeyNotFound(k)) => assert_eq!(k, key("ZZZZ")),
        other => panic!("Expected KeyNotFound, got {:?}", other),
    }
    assert_eq!(sim.call_count(), 1);
    assert_eq!(sim.count_of(Selector::ReadKey), 0);
}

#[test]
fn test_invalid_key_name_makes_no_call() {
    let (sim, smc) = setup();

    assert!(matches!(smc.is_key_name_present("TC0"), Err(SmcError::InvalidKeyName(_))));
    assert!(matches!(smc.is_key_name_present("TC0PP"), Err(SmcError::InvalidKeyName(_))));
    assert_eq!(sim.call_count(), 0);
}

#[test]
fn test_read_value_as_type_mismatch() {
    let (sim, smc) = setup();

    match smc.read_value_as(key("TC0P"), DataType::FPE2) {
        Err(SmcError::DataTypeMismatch { key: k, expected, found }) => {
            assert_eq!(k, key("TC0P"));
            assert_eq!(expected, DataType::FPE2);
            assert_eq!(found, DataType::SP78);
        }
        other => panic!("Expected DataTypeMismatch, got {:?}", other),
    }
    assert_eq!(sim.call_count(), 1);
}

#[test]
fn test_oversized_payload_not_read() {
    let (sim, smc) = setup();
    sim.insert(key("RBIG"), DataType::new(*b"ch8*", 40), &[0x41; 40], false);

    assert!(matches!(smc.read_value(key("RBIG")), Err(SmcError::Protocol(_))));
    assert_eq!(sim.call_count(), 1);
    assert_eq!(sim.count_of(Selector::ReadKey), 0);
}

#[test]
fn test_key_information() {
    let (sim, smc) = setup();

    assert_eq!(smc.key_information(key("F0ID")).unwrap(), DataType::FDS);
    assert_eq!(smc.key_information(key("#KEY")).unwrap(), DataType::UI32);
    assert_eq!(sim.count_of(Selector::GetKeyInfo), 2);
}

#[test]
fn test_values_not_cached() {
    let (sim, smc) = setup();

    assert_eq!(smc.read_value(key("F0Ac")).unwrap().as_fpe2().unwrap(), 2000);
    sim.insert(key("F0Ac"), DataType::FPE2, &codec::encode_fpe2(2500), false);
    assert_eq!(smc.read_value(key("F0Ac")).unwrap().as_fpe2().unwrap(), 2500);
    assert_eq!(sim.call_count(), 4);
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_write_value() {
    let (sim, smc) = setup();

    smc.write_value(key("F0Tg"), DataType::FPE2, &codec::encode_fpe2(3000))
        .unwrap();

    assert_eq!(sim.value(key("F0Tg")).unwrap(), codec::encode_fpe2(3000).to_vec());
    assert_eq!(sim.count_of(Selector::GetKeyInfo), 1);
    assert_eq!(sim.count_of(Selector::WriteKey), 1);
}

#[test]
fn test_write_size_mismatch_single_call() {
    let (sim, smc) = setup();
    let wide = DataType::new(*b"fpe2", 4);

    match smc.write_value(key("F0Mn"), wide, &[0, 0, 0, 1]) {
        Err(SmcError::DataTypeMismatch { expected, found, .. }) => {
            assert_eq!(expected, wide);
            assert_eq!(found, DataType::FPE2);
        }
        other => panic!("Expected DataTypeMismatch, got {:?}", other),
    }
    assert_eq!(sim.call_count(), 1);
    assert_eq!(sim.count_of(Selector::WriteKey), 0);
    assert_eq!(sim.value(key("F0Mn")).unwrap(), codec::encode_fpe2(1200).to_vec());
}

#[test]
fn test_write_tag_mismatch_single_call() {
    let (sim, smc) = setup();

    let result = smc.write_value(key("F0Mn"), DataType::UI16, &[0, 1]);
    assert!(matches!(result, Err(SmcError::DataTypeMismatch { .. })));
    assert_eq!(sim.call_count(), 1);
}

#[test]
fn test_write_payload_length_checked_first() {
    let (sim, smc) = setup();

    let result = smc.write_value(key("F0Mn"), DataType::FPE2, &[1, 2, 3]);
    assert!(matches!(result, Err(SmcError::Protocol(_))));
    assert_eq!(sim.call_count(), 0);
}

#[test]
fn test_write_missing_key() {
    let (sim, smc) = setup();

    let result = smc.write_value(key("F9Mn"), DataType::FPE2, &[0, 4]);
    assert!(matches!(result, Err(SmcError::KeyNotFound(_))));
    assert_eq!(sim.call_count(), 1);
}

#[test]
fn test_write_not_privileged() {
    let (sim, smc) = setup();
    sim.set_unprivileged(true);

    let result = smc.write_value(key("F0Mn"), DataType::FPE2, &codec::encode_fpe2(1500));
    assert!(matches!(result, Err(SmcError::NotPrivileged)));
    assert_eq!(sim.value(key("F0Mn")).unwrap(), codec::encode_fpe2(1200).to_vec());
}

#[test]
fn test_write_read_only_key_rejected_by_device() {
    let (sim, smc) = setup();

    match smc.write_value(key("F0Mx"), DataType::FPE2, &codec::encode_fpe2(100)) {
        Err(SmcError::Unknown { transport, device }) => {
            assert_eq!(transport, IoReturn::SUCCESS);
            assert_eq!(device, 0x01);
        }
        other => panic!("Expected Unknown, got {:?}", other),
    }
    assert_eq!(sim.value(key("F0Mx")).unwrap(), codec::encode_fpe2(6199).to_vec());
}

// =============================================================================
// Status / Layout Tests
// =============================================================================

#[test]
fn test_transport_failure_is_unknown() {
    let (sim, smc) = setup();
    sim.set_failure(Some(IoReturn::NOT_RESPONDING));

    match smc.read_value(key("TC0P")) {
        Err(SmcError::Unknown { transport, .. }) => assert_eq!(transport, IoReturn::NOT_RESPONDING),
        other => panic!("Expected Unknown, got {:?}", other),
    }
    assert_eq!(sim.call_count(), 1);

    sim.set_failure(None);
    assert!(smc.read_value(key("TC0P")).is_ok());
}

#[test]
fn test_transport_not_privileged() {
    let (sim, smc) = setup();
    sim.set_failure(Some(IoReturn::NOT_PRIVILEGED));

    assert!(matches!(smc.key_information(key("TC0P")), Err(SmcError::NotPrivileged)));
}

#[test]
fn test_layout_error_before_any_call() {
    let sim = SimulatedSmc::macbook();
    let layout = RecordLayout {
        version_pad: 4,
        ..RecordLayout::APPLE_SMC
    };
    let config = Config::builder().record_layout(layout).build();
    let smc = Smc::with_config(sim.clone(), config);

    assert!(matches!(
        smc.read_value(key("TC0P")),
        Err(SmcError::LayoutError { size: 82 })
    ));
    assert!(matches!(
        smc.write_value(key("F0Mn"), DataType::FPE2, &[0, 4]),
        Err(SmcError::LayoutError { .. })
    ));
    assert_eq!(sim.call_count(), 0);
}

#[test]
fn test_close() {
    let (_sim, smc) = setup();
    smc.close().unwrap();
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_reads_keep_phases_adjacent() {
    let (sim, smc) = setup();
    let smc = Arc::new(smc);

    let names = ["TC0P", "TA0P", "F0Ac", "BNum"];
    let handles: Vec<_> = names
        .iter()
        .map(|&name| {
            let smc = Arc::clone(&smc);
            thread::spawn(move || {
                for _ in 0..50 {
                    smc.read_value(key(name)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let calls = sim.calls();
    assert_eq!(calls.len(), names.len() * 50 * 2);

    for pair in calls.chunks(2) {
        assert_eq!(pair[0].selector(), Some(Selector::GetKeyInfo));
        assert_eq!(pair[1].selector(), Some(Selector::ReadKey));
        assert_eq!(pair[0].key, pair[1].key);
    }
}

#[test]
fn test_concurrent_reads_and_writes() {
    let (sim, smc) = setup();
    let smc = Arc::new(smc);

    let writer = {
        let smc = Arc::clone(&smc);
        thread::spawn(move || {
            for rpm in 1000..1100u16 {
                smc.write_value(key("F0Tg"), DataType::FPE2, &codec::encode_fpe2(rpm))
                    .unwrap();
            }
        })
    };
    let reader = {
        let smc = Arc::clone(&smc);
        thread::spawn(move || {
            for _ in 0..100 {
                smc.read_value(key("F0Tg")).unwrap();
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    for pair in sim.calls().chunks(2) {
        assert_eq!(pair[0].selector(), Some(Selector::GetKeyInfo));
        assert!(matches!(
            pair[1].selector(),
            Some(Selector::ReadKey) | Some(Selector::WriteKey)
        ));
    }
    assert_eq!(sim.value(key("F0Tg")).unwrap(), codec::encode_fpe2(1099).to_vec());
}
