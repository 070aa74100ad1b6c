//! Engine Module
//!
//! The protocol engine that drives every key operation.
//!
//! ## Responsibilities
//! - Build and validate command records
//! - Run the two-phase exchange (discover, then read or write)
//! - Map transport and device status to [`SmcError`]
//! - Serialize operations on one connection

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{Result, SmcError};
use crate::protocol::{result, CommandRecord, DataType, KeyValue, Selector, SmcKey, PAYLOAD_SIZE};
use crate::transport::{IoReturn, Transport, HANDLE_YPC_EVENT};

/// The main protocol engine
///
/// ## Concurrency Model: one operation at a time per connection
///
/// - The transport sits behind `conn`; every public operation takes the
///   lock once and holds it for all of its round trips.
/// - Discover and Execute of one read/write are therefore never
///   interleaved with another thread's records on the same connection.
/// - Independent operations have no ordering guarantee between them.
pub struct Smc<T: Transport> {
    /// Engine configuration
    config: Config,

    /// The open device connection
    conn: Mutex<T>,
}

impl<T: Transport> Smc<T> {
    /// Wrap an open transport with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::default())
    }

    /// Wrap an open transport
    pub fn with_config(transport: T, config: Config) -> Self {
        Self {
            config,
            conn: Mutex::new(transport),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Close the underlying connection
    pub fn close(self) -> Result<()> {
        self.conn.into_inner().close()
    }

    // =========================================================================
    // Key Operations
    // =========================================================================

    /// Discover a key's data type (one round trip)
    pub fn key_information(&self, key: SmcKey) -> Result<DataType> {
        let mut conn = self.conn.lock();
        self.discover(&mut *conn, key)
    }

    /// Key stored at `index` in the device's key table
    pub fn key_at_index(&self, index: u32) -> Result<SmcKey> {
        let mut input = CommandRecord::new(SmcKey::from_id(0), Selector::GetKeyFromIndex);
        input.data32 = index;

        let mut conn = self.conn.lock();
        let output = self.call(&mut *conn, &input)?;
        Ok(output.smc_key())
    }

    /// Read a key's current value.
    ///
    /// Steps:
    /// 1. Discover the data type
    /// 2. Read `size` bytes with that type
    pub fn read_value(&self, key: SmcKey) -> Result<KeyValue> {
        let mut conn = self.conn.lock();
        let data_type = self.discover(&mut *conn, key)?;
        self.read(&mut *conn, key, data_type)
    }

    /// Read a key that the caller expects to carry `expected`.
    ///
    /// A disagreeing device type fails with `DataTypeMismatch` after the
    /// discover phase; no read is issued.
    pub fn read_value_as(&self, key: SmcKey, expected: DataType) -> Result<Vec<u8>> {
        let mut conn = self.conn.lock();
        let found = self.discover(&mut *conn, key)?;
        if found != expected {
            return Err(SmcError::DataTypeMismatch { key, expected, found });
        }
        self.read(&mut *conn, key, found).map(|value| value.bytes)
    }

    /// Write a new value to a key.
    ///
    /// Steps:
    /// 1. Check the payload length against `data_type`
    /// 2. Discover the device's data type
    /// 3. Refuse on any tag or size disagreement
    /// 4. Issue the write
    pub fn write_value(&self, key: SmcKey, data_type: DataType, bytes: &[u8]) -> Result<()> {
        if bytes.len() != data_type.size as usize || bytes.len() > PAYLOAD_SIZE {
            return Err(SmcError::Protocol(format!(
                "{}: payload is {} bytes, {} needs {}",
                key,
                bytes.len(),
                data_type,
                data_type.size
            )));
        }

        let mut conn = self.conn.lock();

        let found = self.discover(&mut *conn, key)?;
        if found != data_type {
            tracing::warn!("Refusing write to {}: device type {}, given {}", key, found, data_type);
            return Err(SmcError::DataTypeMismatch {
                key,
                expected: data_type,
                found,
            });
        }

        let mut input = CommandRecord::new(key, Selector::WriteKey);
        input.key_info.data_size = found.size;
        input.set_payload(bytes)?;

        self.call(&mut *conn, &input)?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), key);
        Ok(())
    }

    // =========================================================================
    // Phases
    // =========================================================================

    /// Phase 1: GetKeyInfo
    fn discover(&self, conn: &mut T, key: SmcKey) -> Result<DataType> {
        let input = CommandRecord::new(key, Selector::GetKeyInfo);
        let output = self.call(conn, &input)?;
        let data_type = output.key_info.data_type();

        tracing::debug!("Discovered {} as {}", key, data_type);
        Ok(data_type)
    }

    /// Phase 2 (read): ReadKey with the discovered size
    fn read(&self, conn: &mut T, key: SmcKey, data_type: DataType) -> Result<KeyValue> {
        let len = data_type.size as usize;
        if len > PAYLOAD_SIZE {
            return Err(SmcError::Protocol(format!(
                "{}: device reports {} byte payload (max {})",
                key, len, PAYLOAD_SIZE
            )));
        }

        let mut input = CommandRecord::new(key, Selector::ReadKey);
        input.key_info.data_size = data_type.size;

        let output = self.call(conn, &input)?;
        Ok(KeyValue {
            key,
            data_type,
            bytes: output.payload(len).to_vec(),
        })
    }

    /// One validated round trip through the transport
    fn call(&self, conn: &mut T, input: &CommandRecord) -> Result<CommandRecord> {
        let layout = &self.config.record_layout;

        // Refuses before touching the device if the layout is not 80 bytes
        let request = input.encode_with(layout)?;

        tracing::trace!("-> {:?} {} data32={}", input.selector(), input.smc_key(), input.data32);
        let (response, status) = conn.call(HANDLE_YPC_EVENT, &request);

        let output = CommandRecord::decode_with(layout, &response)?;
        tracing::trace!("<- {} result=0x{:02x}", status, output.result);

        check_status(input.smc_key(), status, output.result)?;
        Ok(output)
    }
}

/// Classify a (transport, device) status pair
fn check_status(key: SmcKey, transport: IoReturn, device: u8) -> Result<()> {
    match (transport, device) {
        (IoReturn::SUCCESS, result::SUCCESS) => Ok(()),
        (IoReturn::SUCCESS, result::KEY_NOT_FOUND) => Err(SmcError::KeyNotFound(key)),
        (IoReturn::NOT_PRIVILEGED, _) => Err(SmcError::NotPrivileged),
        (transport, device) => Err(SmcError::Unknown { transport, device }),
    }
}
