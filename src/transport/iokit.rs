//! IOKit transport (macOS)
//!
//! Opens a user client on the `AppleSMC` service and forwards every record
//! through `IOConnectCallStructMethod`.

use std::ffi::{c_char, c_void, CString};

use crate::error::{Result, SmcError};
use crate::protocol::RECORD_SIZE;
use super::{IoReturn, Transport};

type KernReturn = i32;
type MachPort = u32;
type IoObject = MachPort;
type IoService = IoObject;
type IoConnect = IoObject;

/// `kIOMainPortDefault`
const MAIN_PORT_DEFAULT: MachPort = 0;

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOServiceMatching(name: *const c_char) -> *mut c_void;
    fn IOServiceGetMatchingService(main_port: MachPort, matching: *mut c_void) -> IoService;
    fn IOServiceOpen(
        service: IoService,
        owning_task: MachPort,
        kind: u32,
        connect: *mut IoConnect,
    ) -> KernReturn;
    fn IOServiceClose(connect: IoConnect) -> KernReturn;
    fn IOObjectRelease(object: IoObject) -> KernReturn;
    fn IOConnectCallStructMethod(
        connection: MachPort,
        selector: u32,
        input: *const c_void,
        input_size: usize,
        output: *mut c_void,
        output_size: *mut usize,
    ) -> KernReturn;
}

extern "C" {
    static mach_task_self_: MachPort;
}

/// Connection to the controller driver
#[derive(Debug)]
pub struct IoKitTransport {
    conn: IoConnect,
}

impl IoKitTransport {
    /// Locate `service` in the IORegistry and open a connection to it
    pub fn open(service: &str) -> Result<Self> {
        let name = CString::new(service)
            .map_err(|_| SmcError::DeviceNotFound(service.to_string()))?;

        // SAFETY: `name` is a valid NUL-terminated string for the duration
        // of the call. IOServiceGetMatchingService consumes the matching
        // dictionary, so it is not released here.
        let device = unsafe {
            let matching = IOServiceMatching(name.as_ptr());
            if matching.is_null() {
                return Err(SmcError::DeviceNotFound(service.to_string()));
            }
            IOServiceGetMatchingService(MAIN_PORT_DEFAULT, matching)
        };

        if device == 0 {
            return Err(SmcError::DeviceNotFound(service.to_string()));
        }

        let mut conn: IoConnect = 0;
        // SAFETY: `device` is a live service handle and `conn` is a valid
        // out-pointer. The service handle is released once opened.
        let status = unsafe {
            let status = IOServiceOpen(device, mach_task_self_, 0, &mut conn);
            IOObjectRelease(device);
            status
        };

        let status = IoReturn(status);
        if !status.is_success() {
            return Err(SmcError::ConnectionFailed(status));
        }

        tracing::debug!("Opened {} (connection {})", service, conn);
        Ok(Self { conn })
    }
}

impl Transport for IoKitTransport {
    fn call(&mut self, selector: u32, input: &[u8; RECORD_SIZE]) -> ([u8; RECORD_SIZE], IoReturn) {
        let mut output = [0u8; RECORD_SIZE];
        let mut output_size = RECORD_SIZE;

        // SAFETY: both buffers are exactly RECORD_SIZE bytes and outlive
        // the call; the driver writes at most `output_size` bytes.
        let status = unsafe {
            IOConnectCallStructMethod(
                self.conn,
                selector,
                input.as_ptr().cast(),
                RECORD_SIZE,
                output.as_mut_ptr().cast(),
                &mut output_size,
            )
        };

        (output, IoReturn(status))
    }

    fn close(&mut self) -> Result<()> {
        if self.conn == 0 {
            return Ok(());
        }

        // SAFETY: `conn` was returned by IOServiceOpen and is closed once.
        let status = IoReturn(unsafe { IOServiceClose(self.conn) });
        self.conn = 0;

        if !status.is_success() {
            return Err(SmcError::ConnectionFailed(status));
        }
        Ok(())
    }
}

impl Drop for IoKitTransport {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close controller connection: {}", e);
        }
    }
}
