//! Simulated controller
//!
//! An in-memory device that answers the same records as the real driver.
//! It backs the CLI's `--simulate` mode and serves as the test double:
//! every call is recorded so callers can assert how many round trips an
//! operation made and in which order.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::protocol::codec::{encode_flag, encode_fpe2, encode_sp78};
use crate::protocol::{result, CommandRecord, DataType, Selector, SmcKey, PAYLOAD_SIZE, RECORD_SIZE};
use super::{IoReturn, Transport, HANDLE_YPC_EVENT};

/// Key served without appearing in the index table
const KEY_COUNT: SmcKey = SmcKey::from_bytes(*b"#KEY");

/// One call observed by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRecord {
    /// Raw `data8` byte of the request
    pub data8: u8,

    /// Target key of the request
    pub key: SmcKey,
}

impl CallRecord {
    pub fn selector(&self) -> Option<Selector> {
        Selector::from_u8(self.data8)
    }
}

#[derive(Debug, Clone)]
struct SimKey {
    key: SmcKey,
    data_type: DataType,
    value: [u8; PAYLOAD_SIZE],
    writable: bool,
}

#[derive(Debug, Default)]
struct SimState {
    /// Keys in device index order
    keys: Vec<SimKey>,
    calls: Vec<CallRecord>,
    unprivileged: bool,
    failure: Option<IoReturn>,
}

impl SimState {
    fn find(&self, key: SmcKey) -> Option<&SimKey> {
        self.keys.iter().find(|k| k.key == key)
    }

    fn find_mut(&mut self, key: SmcKey) -> Option<&mut SimKey> {
        self.keys.iter_mut().find(|k| k.key == key)
    }

    fn key_count_entry(&self) -> SimKey {
        let mut value = [0u8; PAYLOAD_SIZE];
        let count = u32::try_from(self.keys.len()).unwrap_or(u32::MAX);
        value[..4].copy_from_slice(&count.to_be_bytes());
        SimKey {
            key: KEY_COUNT,
            data_type: DataType::UI32,
            value,
            writable: false,
        }
    }

    fn lookup(&self, key: SmcKey) -> Option<SimKey> {
        if key == KEY_COUNT {
            return Some(self.key_count_entry());
        }
        self.find(key).cloned()
    }

    /// Apply one request; returns the response record and call status.
    fn handle(&mut self, input: &CommandRecord) -> (CommandRecord, IoReturn) {
        let mut output = CommandRecord {
            key: input.key,
            data8: input.data8,
            ..CommandRecord::default()
        };
        let key = input.smc_key();

        match input.selector() {
            Some(Selector::GetKeyInfo) => match self.lookup(key) {
                Some(entry) => output.key_info = entry.data_type.into(),
                None => output.result = result::KEY_NOT_FOUND,
            },
            Some(Selector::ReadKey) => match self.lookup(key) {
                Some(entry) => {
                    let len = (entry.data_type.size as usize).min(PAYLOAD_SIZE);
                    output.bytes[..len].copy_from_slice(&entry.value[..len]);
                }
                None => output.result = result::KEY_NOT_FOUND,
            },
            Some(Selector::WriteKey) => {
                if self.unprivileged {
                    return (output, IoReturn::NOT_PRIVILEGED);
                }
                match self.find_mut(key) {
                    None => output.result = result::KEY_NOT_FOUND,
                    Some(entry) if !entry.writable => output.result = result::ERROR,
                    Some(entry) if entry.data_type.size != input.key_info.data_size => {
                        output.result = result::ERROR
                    }
                    Some(entry) => entry.value = input.bytes,
                }
            }
            Some(Selector::GetKeyFromIndex) => {
                match self.keys.get(input.data32 as usize) {
                    Some(entry) => output.key = entry.key.id(),
                    None => output.result = result::ERROR,
                }
            }
            Some(Selector::GetKeyCount) | None => output.result = result::ERROR,
        }

        (output, IoReturn::SUCCESS)
    }
}

/// Simulated controller; clones share one device
#[derive(Debug, Clone, Default)]
pub struct SimulatedSmc {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSmc {
    /// An empty device (only `#KEY` answers)
    pub fn new() -> Self {
        Self::default()
    }

    /// A laptop-like device with one fan, a handful of temperature
    /// sensors, battery keys and an optical drive flag.
    pub fn macbook() -> Self {
        let mut fan_descriptor = [0u8; 16];
        fan_descriptor[4..12].copy_from_slice(b"Exhaust ");

        Self::new()
            .with_key(SmcKey::from_bytes(*b"FNum"), DataType::UI8, &[1])
            .with_key(SmcKey::from_bytes(*b"F0ID"), DataType::FDS, &fan_descriptor)
            .with_key(SmcKey::from_bytes(*b"F0Ac"), DataType::FPE2, &encode_fpe2(2000))
            .with_writable_key(SmcKey::from_bytes(*b"F0Mn"), DataType::FPE2, &encode_fpe2(1200))
            .with_key(SmcKey::from_bytes(*b"F0Mx"), DataType::FPE2, &encode_fpe2(6199))
            .with_key(SmcKey::from_bytes(*b"F0Sf"), DataType::FPE2, &encode_fpe2(0))
            .with_writable_key(SmcKey::from_bytes(*b"F0Tg"), DataType::FPE2, &encode_fpe2(2000))
            .with_key(SmcKey::from_bytes(*b"TA0P"), DataType::SP78, &encode_sp78(31.25))
            .with_key(SmcKey::from_bytes(*b"TB0T"), DataType::SP78, &encode_sp78(30.5))
            .with_key(SmcKey::from_bytes(*b"TC0D"), DataType::SP78, &encode_sp78(55.75))
            .with_key(SmcKey::from_bytes(*b"TC0F"), DataType::SP78, &encode_sp78(57.0))
            .with_key(SmcKey::from_bytes(*b"TC0P"), DataType::SP78, &encode_sp78(52.5))
            .with_key(SmcKey::from_bytes(*b"TC1C"), DataType::SP78, &encode_sp78(54.0))
            .with_key(SmcKey::from_bytes(*b"Th0H"), DataType::SP78, &encode_sp78(0.0))
            .with_key(SmcKey::from_bytes(*b"BATP"), DataType::FLAG, &encode_flag(false))
            .with_key(SmcKey::from_bytes(*b"BNum"), DataType::UI8, &[1])
            .with_key(SmcKey::from_bytes(*b"BSIn"), DataType::UI8, &[0b0100_0011])
            .with_key(SmcKey::from_bytes(*b"MSDI"), DataType::FLAG, &encode_flag(false))
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Add a read-only key (builder form)
    pub fn with_key(self, key: SmcKey, data_type: DataType, value: &[u8]) -> Self {
        self.insert(key, data_type, value, false);
        self
    }

    /// Add a writable key (builder form)
    pub fn with_writable_key(self, key: SmcKey, data_type: DataType, value: &[u8]) -> Self {
        self.insert(key, data_type, value, true);
        self
    }

    /// Add or replace a key. Values longer than the payload region are cut.
    pub fn insert(&self, key: SmcKey, data_type: DataType, value: &[u8], writable: bool) {
        let mut buf = [0u8; PAYLOAD_SIZE];
        let len = value.len().min(PAYLOAD_SIZE);
        buf[..len].copy_from_slice(&value[..len]);

        let entry = SimKey {
            key,
            data_type,
            value: buf,
            writable,
        };

        let mut state = self.state.lock();
        match state.keys.iter().position(|k| k.key == key) {
            Some(index) => state.keys[index] = entry,
            None => state.keys.push(entry),
        }
    }

    /// Make every write fail with `kIOReturnNotPrivileged`
    pub fn set_unprivileged(&self, unprivileged: bool) {
        self.state.lock().unprivileged = unprivileged;
    }

    /// Make every call fail at the transport level with `status`
    pub fn set_failure(&self, status: Option<IoReturn>) {
        self.state.lock().failure = status;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Current payload of `key` (`size` bytes)
    pub fn value(&self, key: SmcKey) -> Option<Vec<u8>> {
        let state = self.state.lock();
        state.lookup(key).map(|entry| {
            let len = (entry.data_type.size as usize).min(PAYLOAD_SIZE);
            entry.value[..len].to_vec()
        })
    }

    /// Every call seen so far, oldest first
    pub fn calls(&self) -> Vec<CallRecord> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Number of calls that carried `selector`
    pub fn count_of(&self, selector: Selector) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.data8 == selector as u8)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

impl Transport for SimulatedSmc {
    fn call(&mut self, selector: u32, input: &[u8; RECORD_SIZE]) -> ([u8; RECORD_SIZE], IoReturn) {
        let request = CommandRecord::decode(input);
        let mut state = self.state.lock();

        state.calls.push(CallRecord {
            data8: request.data8,
            key: request.smc_key(),
        });

        if let Some(status) = state.failure {
            return ([0u8; RECORD_SIZE], status);
        }

        if selector != HANDLE_YPC_EVENT {
            return ([0u8; RECORD_SIZE], IoReturn::BAD_ARGUMENT);
        }

        let (response, status) = state.handle(&request);
        tracing::trace!(
            "sim: {:?} {} -> result 0x{:02x}, {}",
            request.selector(),
            request.smc_key(),
            response.result,
            status
        );
        (response.encode(), status)
    }
}
