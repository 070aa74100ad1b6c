//! Transport status codes
//!
//! IOKit return codes: system 0x38 in the top 6 bits, subsystem 0 in the
//! middle 12, and the specific code in the low 14.

use std::fmt;

const SYS_IOKIT: u32 = (0x38 & 0x3f) << 26;
const SUB_IOKIT_COMMON: u32 = 0;

/// Status of a transport call (`kern_return_t`)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IoReturn(pub i32);

impl IoReturn {
    pub const SUCCESS: IoReturn = IoReturn(0);
    pub const ERROR: IoReturn = IoReturn::common(0x2bc);
    pub const NO_MEMORY: IoReturn = IoReturn::common(0x2bd);
    pub const IPC_ERROR: IoReturn = IoReturn::common(0x2bf);
    pub const NO_DEVICE: IoReturn = IoReturn::common(0x2c0);
    pub const NOT_PRIVILEGED: IoReturn = IoReturn::common(0x2c1);
    pub const BAD_ARGUMENT: IoReturn = IoReturn::common(0x2c2);
    pub const EXCLUSIVE_ACCESS: IoReturn = IoReturn::common(0x2c5);
    pub const UNSUPPORTED: IoReturn = IoReturn::common(0x2c7);
    pub const NOT_OPEN: IoReturn = IoReturn::common(0x2cd);
    pub const BUSY: IoReturn = IoReturn::common(0x2d5);
    pub const TIMEOUT: IoReturn = IoReturn::common(0x2d6);
    pub const NOT_RESPONDING: IoReturn = IoReturn::common(0x2ed);
    pub const NOT_FOUND: IoReturn = IoReturn::common(0x2f0);

    /// Build a common IOKit error from its 14-bit code
    pub const fn common(code: u32) -> Self {
        IoReturn((SYS_IOKIT | SUB_IOKIT_COMMON | (code & 0x3fff)) as i32)
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// IOKit name for the well-known codes
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::SUCCESS => "kIOReturnSuccess",
            Self::ERROR => "kIOReturnError",
            Self::NO_MEMORY => "kIOReturnNoMemory",
            Self::IPC_ERROR => "kIOReturnIPCError",
            Self::NO_DEVICE => "kIOReturnNoDevice",
            Self::NOT_PRIVILEGED => "kIOReturnNotPrivileged",
            Self::BAD_ARGUMENT => "kIOReturnBadArgument",
            Self::EXCLUSIVE_ACCESS => "kIOReturnExclusiveAccess",
            Self::UNSUPPORTED => "kIOReturnUnsupported",
            Self::NOT_OPEN => "kIOReturnNotOpen",
            Self::BUSY => "kIOReturnBusy",
            Self::TIMEOUT => "kIOReturnTimeout",
            Self::NOT_RESPONDING => "kIOReturnNotResponding",
            Self::NOT_FOUND => "kIOReturnNotFound",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for IoReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:08x})", name, self.0),
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

impl fmt::Debug for IoReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IoReturn({})", self)
    }
}
