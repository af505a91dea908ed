//! `dbgport` finds a UART that early boot code can use as a debug console, by looking through the
//! ACPI tables firmware publishes for debug ports. It understands three tables:
//!    - `DBG2`, the Debug Port Table 2, which can describe many debug devices. This is the only
//!      table a port is currently selected from.
//!    - `DBGP`, the original Debug Port Table, describing a single port.
//!    - `SPCR`, the Serial Port Console Redirection table.
//!
//! Finding the tables themselves is left to the caller, through [`TableLocator`], and they are
//! mapped with an [`acpi::AcpiHandler`] ([`IdentityMapped`] works while UEFI boot services are
//! still around). The selected port is handed to a [`UartSink`]. The crate does not allocate, and
//! every field it reads out of firmware memory is bounds-checked against the length the table
//! declares for itself.
//!
//! ```ignore
//! let mut properties = UartProperties::default();
//! match Resolver::new(ResolverConfig::default()).resolve(&locator, &IdentityMapped, &mut properties) {
//!     Some(port) => info!("Debug UART at {:#x}", port.address),
//!     None => info!("No debug UART, using the default port"),
//! }
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

pub mod checksum;
pub mod config;
pub mod dbg2;
pub mod dbgp;
pub mod gas;
pub mod resolver;
pub mod sdt;
pub mod source;
pub mod spcr;
pub mod uart;

#[cfg(test)]
pub(crate) mod test_util;

pub use crate::{
    config::ResolverConfig,
    gas::{AddressSpace, GenericAddress},
    resolver::{IdentityMapped, Resolver, TableLocator},
    sdt::{Sdt, SdtHeader, Signature},
    source::DebugPortSource,
    uart::{PortDescriptor, UartProperties, UartSink},
};

use core::{fmt, str};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TableError {
    /// The table is too short to contain the structure being read from it. This is also produced
    /// if the mapped region is shorter than the length the table's header declares.
    TooShort,

    /// The table found for a signature has a different signature in its header.
    SignatureMismatch,

    /// The bytes of the table do not sum to zero. This is only an error if the resolver is
    /// configured to reject such tables.
    ChecksumMismatch,

    /// An offset or count supplied by the table points outside of it.
    OutOfBounds,

    /// A DBG2 device entry declares a length smaller than the fixed part of the entry, so the next
    /// entry can't be found.
    MalformedEntry,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TableError::TooShort => "table is too short",
            TableError::SignatureMismatch => "table has an unexpected signature",
            TableError::ChecksumMismatch => "table checksum is incorrect",
            TableError::OutOfBounds => "offset points outside of table",
            TableError::MalformedEntry => "device entry is malformed",
        };
        f.write_str(s)
    }
}

/// Extract a null-terminated, UTF-8 `&str` from a byte slice. If there is no null terminator,
/// the whole slice is used.
pub(crate) fn from_utf8_null_terminated(bytes: &[u8]) -> Result<&str, str::Utf8Error> {
    let null_terminator_index = bytes.iter().position(|&c| c == b'\0').unwrap_or(bytes.len());
    str::from_utf8(&bytes[0..null_terminator_index])
}
