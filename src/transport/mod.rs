//! Transport Module
//!
//! The boundary between the protocol engine and the device driver.
//!
//! ## Architecture
//! - One [`Transport`] per open connection
//! - One synchronous call per [`CommandRecord`](crate::protocol::CommandRecord)
//! - Status returned as an [`IoReturn`] next to the 80-byte response

mod status;
mod sim;

#[cfg(target_os = "macos")]
mod iokit;

pub use status::IoReturn;
pub use sim::{CallRecord, SimulatedSmc};

#[cfg(target_os = "macos")]
pub use iokit::IoKitTransport;

use crate::error::Result;
use crate::protocol::RECORD_SIZE;

/// Driver struct-method index that carries every SMC request.
///
/// The SMC function itself travels in the record's `data8` byte.
pub const HANDLE_YPC_EVENT: u32 = 2;

/// A synchronous connection to the controller driver
pub trait Transport: Send {
    /// Issue one struct-method call.
    ///
    /// Returns whatever the driver wrote into the output record together
    /// with the call's status. Blocks until the driver returns.
    fn call(&mut self, selector: u32, input: &[u8; RECORD_SIZE]) -> ([u8; RECORD_SIZE], IoReturn);

    /// Release the connection
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call(&mut self, selector: u32, input: &[u8; RECORD_SIZE]) -> ([u8; RECORD_SIZE], IoReturn) {
        (**self).call(selector, input)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Open the platform's controller service by name.
///
/// Only macOS exposes the driver; elsewhere this reports `DeviceNotFound`.
pub fn open(service: &str) -> Result<Box<dyn Transport>> {
    #[cfg(target_os = "macos")]
    {
        let transport = IoKitTransport::open(service)?;
        Ok(Box::new(transport))
    }

    #[cfg(not(target_os = "macos"))]
    {
        Err(crate::error::SmcError::DeviceNotFound(format!(
            "{} (no controller driver on this platform)",
            service
        )))
    }
}
