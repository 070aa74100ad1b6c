//! Tests for key enumeration
//!
//! These tests verify:
//! - The key count comes from `#KEY`
//! - Walking the table yields every key in index order with its type
//! - Walks are restartable and never cached
//! - Presence checks distinguish "not found" from other failures

use smckv::protocol::{DataType, Selector, SmcKey};
use smckv::transport::{IoReturn, SimulatedSmc};
use smckv::{Smc, SmcError};

// =============================================================================
// Helper Functions
// =============================================================================

fn small_device() -> SimulatedSmc {
    SimulatedSmc::new()
        .with_key(SmcKey::from_bytes(*b"FNum"), DataType::UI8, &[2])
        .with_key(SmcKey::from_bytes(*b"TC0P"), DataType::SP78, &[0x30, 0x00])
        .with_key(SmcKey::from_bytes(*b"MSDI"), DataType::FLAG, &[0])
}

// =============================================================================
// Count / Walk Tests
// =============================================================================

#[test]
fn test_key_count() {
    let smc = Smc::new(small_device());
    assert_eq!(smc.key_count().unwrap(), 3);

    let smc = Smc::new(SimulatedSmc::new());
    assert_eq!(smc.key_count().unwrap(), 0);
}

#[test]
fn test_all_keys_in_index_order() {
    let sim = small_device();
    let smc = Smc::new(sim.clone());

    let entries = smc.all_keys().unwrap();
    let names: Vec<String> = entries.iter().map(|e| e.key.name()).collect();
    assert_eq!(names, vec!["FNum", "TC0P", "MSDI"]);
    assert_eq!(entries[0].data_type, DataType::UI8);
    assert_eq!(entries[1].data_type, DataType::SP78);
    assert_eq!(entries[2].data_type, DataType::FLAG);

    // Count (info + read), then index + info per key
    assert_eq!(sim.call_count(), 2 + 3 * 2);
    assert_eq!(sim.count_of(Selector::GetKeyFromIndex), 3);
}

#[test]
fn test_all_keys_restartable() {
    let sim = SimulatedSmc::macbook();
    let smc = Smc::new(sim.clone());

    let first = smc.all_keys().unwrap();
    let calls_first = sim.call_count();
    let second = smc.all_keys().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 18);
    assert_eq!(sim.call_count(), calls_first * 2);
}

#[test]
fn test_all_keys_sees_new_keys() {
    let sim = small_device();
    let smc = Smc::new(sim.clone());

    assert_eq!(smc.all_keys().unwrap().len(), 3);
    sim.insert(SmcKey::from_bytes(*b"BNum"), DataType::UI8, &[1], false);
    assert_eq!(smc.all_keys().unwrap().len(), 4);
}

#[test]
fn test_key_at_index() {
    let smc = Smc::new(small_device());

    assert_eq!(smc.key_at_index(1).unwrap(), SmcKey::from_bytes(*b"TC0P"));
    assert!(matches!(smc.key_at_index(3), Err(SmcError::Unknown { device: 0x01, .. })));
}

#[test]
fn test_empty_device() {
    let smc = Smc::new(SimulatedSmc::new());
    assert!(smc.all_keys().unwrap().is_empty());
}

// =============================================================================
// Presence Tests
// =============================================================================

#[test]
fn test_is_key_present() {
    let sim = small_device();
    let smc = Smc::new(sim.clone());

    assert!(smc.is_key_present(SmcKey::from_bytes(*b"TC0P")).unwrap());
    assert!(!smc.is_key_present(SmcKey::from_bytes(*b"TC9P")).unwrap());
    assert!(smc.is_key_name_present("#KEY").unwrap());
    assert_eq!(sim.call_count(), 3);
}

#[test]
fn test_is_key_present_propagates_other_errors() {
    let sim = small_device();
    let smc = Smc::new(sim.clone());
    sim.set_failure(Some(IoReturn::NO_DEVICE));

    assert!(matches!(
        smc.is_key_present(SmcKey::from_bytes(*b"TC0P")),
        Err(SmcError::Unknown { .. })
    ));
}
