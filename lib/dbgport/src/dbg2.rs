//! The Debug Port Table 2 (`DBG2`) describes any number of debug devices, each with its own
//! variable-length device information entry. Entries are laid out one after another, starting at
//! an offset given by the table; each entry's `length` field gives the offset of the next.
//!
//! See the Microsoft "Debug Port Table 2 (DBG2)" specification for the layout.

use crate::{
    gas::{AddressSpace, GenericAddress},
    sdt::{Sdt, SdtHeader},
    uart::PortDescriptor,
    TableError,
};
use log::trace;
use scroll::{Pread, LE};

pub const PORT_TYPE_SERIAL: u16 = 0x8000;
pub const PORT_SUBTYPE_16550: u16 = 0x0000;
/// A subset of the 16550, compatible with the interface described by the original `DBGP` table.
pub const PORT_SUBTYPE_16550_SUBSET: u16 = 0x0001;

/// The smallest register region we accept for a UART. A 16550 has eight byte-wide registers, so
/// anything smaller than this can't be one.
pub const MIN_REGISTER_REGION_SIZE: u32 = 0x0c;

/// The DBG2 table.
#[derive(Clone, Copy, Debug)]
pub struct Dbg2<'a> {
    sdt: Sdt<'a>,
    info_offset: u32,
    info_count: u32,
}

impl<'a> Dbg2<'a> {
    /// Offset of the first field after the header.
    const INFO_OFFSET_FIELD: usize = SdtHeader::SIZE;
    const INFO_COUNT_FIELD: usize = SdtHeader::SIZE + 4;
    pub const MIN_LENGTH: usize = SdtHeader::SIZE + 8;

    pub fn new(sdt: Sdt<'a>) -> Result<Dbg2<'a>, TableError> {
        if sdt.len() < Self::MIN_LENGTH {
            return Err(TableError::TooShort);
        }

        let info_offset = sdt.read::<u32>(Self::INFO_OFFSET_FIELD)?;
        let info_count = sdt.read::<u32>(Self::INFO_COUNT_FIELD)?;
        Ok(Dbg2 { sdt, info_offset, info_count })
    }

    /// The number of device entries the table claims to contain.
    pub fn device_count(&self) -> u32 {
        self.info_count
    }

    /// Iterate over the table's device entries, in order. The iterator stops after the first
    /// error, as the position of any later entries can't be trusted.
    pub fn devices(&self) -> DeviceIter<'a> {
        DeviceIter { sdt: self.sdt, offset: self.info_offset as usize, remaining: self.info_count }
    }

    /// Find the first device that we can use as a UART, along with the port it describes. Entries
    /// that don't describe a usable UART are skipped. A malformed entry ends the search with an
    /// error, unless a usable device has already been found before it.
    pub fn find_uart(&self) -> Result<Option<(Device<'a>, PortDescriptor)>, TableError> {
        for (index, device) in self.devices().enumerate() {
            let device = device?;
            match device.usable_port() {
                Ok(port) => return Ok(Some((device, port))),
                Err(rejection) => {
                    trace!("Skipping DBG2 device {}: {:?}", index, rejection);
                }
            }
        }

        Ok(None)
    }
}

/// The fixed part of a DBG2 device information entry.
#[derive(Clone, Copy, Debug, Pread)]
#[repr(C)]
pub struct DeviceInfo {
    pub revision: u8,
    /// Length of the entire entry, including the variable-length data after this header.
    pub length: u16,
    pub number_of_registers: u8,
    pub namespace_length: u16,
    /// Offset of the ACPI namespace string, from the start of the entry.
    pub namespace_offset: u16,
    pub oem_data_length: u16,
    pub oem_data_offset: u16,
    pub port_type: u16,
    pub port_subtype: u16,
    _reserved: u16,
    /// Offset of the array of `GenericAddress`es, from the start of the entry.
    pub base_address_offset: u16,
    /// Offset of the array of `u32` register region sizes, from the start of the entry.
    pub address_size_offset: u16,
}

impl DeviceInfo {
    pub const SIZE: usize = 22;
}

/// A single device entry, along with the bytes it covers in the table.
#[derive(Clone, Copy, Debug)]
pub struct Device<'a> {
    pub info: DeviceInfo,
    bytes: &'a [u8],
}

/// The reason a device entry was not picked as the debug port.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rejection {
    PortType(u16),
    PortSubtype(u16),
    /// We only support UARTs described by a single register region.
    RegisterCount(u8),
    RegionTooSmall(u32),
    AddressSpace(u8),
    /// The register or size arrays lie outside the entry, or overlap its fixed part.
    Malformed(TableError),
}

impl<'a> Device<'a> {
    /// Get the `index`th base address register of this device.
    pub fn base_address(&self, index: usize) -> Result<GenericAddress, TableError> {
        let offset = array_element(self.info.base_address_offset, index, GenericAddress::SIZE)?;
        self.bytes.pread_with::<GenericAddress>(offset, LE).map_err(|_| TableError::OutOfBounds)
    }

    /// Get the size of the `index`th base address register's region.
    pub fn address_size(&self, index: usize) -> Result<u32, TableError> {
        let offset = array_element(self.info.address_size_offset, index, 4)?;
        self.bytes.pread_with::<u32>(offset, LE).map_err(|_| TableError::OutOfBounds)
    }

    /// The device's path in the ACPI namespace (e.g. `\_SB.COM1`), or `None` if it's missing or
    /// isn't valid UTF-8. Firmware uses `"."` for devices that aren't in the namespace.
    pub fn namespace(&self) -> Option<&'a str> {
        let start = self.info.namespace_offset as usize;
        if start < DeviceInfo::SIZE {
            return None;
        }
        let end = start.checked_add(self.info.namespace_length as usize)?;
        crate::from_utf8_null_terminated(self.bytes.get(start..end)?).ok()
    }

    /// Check this device against everything we need of a debug UART: it must be a 16550 (or the
    /// DBGP-compatible subset), described by exactly one register region at least
    /// [`MIN_REGISTER_REGION_SIZE`] bytes long, in either system memory or I/O space.
    pub fn usable_port(&self) -> Result<PortDescriptor, Rejection> {
        if self.info.port_type != PORT_TYPE_SERIAL {
            return Err(Rejection::PortType(self.info.port_type));
        }

        match self.info.port_subtype {
            PORT_SUBTYPE_16550 | PORT_SUBTYPE_16550_SUBSET => (),
            other => return Err(Rejection::PortSubtype(other)),
        }

        if self.info.number_of_registers != 1 {
            return Err(Rejection::RegisterCount(self.info.number_of_registers));
        }

        let size = self.address_size(0).map_err(Rejection::Malformed)?;
        if size < MIN_REGISTER_REGION_SIZE {
            return Err(Rejection::RegionTooSmall(size));
        }

        let base_address = self.base_address(0).map_err(Rejection::Malformed)?;
        match base_address.space() {
            Some(space) => Ok(PortDescriptor { space, address: base_address.address }),
            None => Err(Rejection::AddressSpace(base_address.address_space)),
        }
    }

    /// Whether the registers are memory-mapped or accessed through I/O ports. `None` if this device
    /// doesn't have a readable first register in one of those spaces.
    pub fn space(&self) -> Option<AddressSpace> {
        self.base_address(0).ok()?.space()
    }
}

/// Offset of the `index`th element of an array that starts `start` bytes into an entry. The array
/// can't start inside the entry's fixed part.
fn array_element(start: u16, index: usize, stride: usize) -> Result<usize, TableError> {
    let start = start as usize;
    if start < DeviceInfo::SIZE {
        return Err(TableError::OutOfBounds);
    }

    index.checked_mul(stride).and_then(|offset| start.checked_add(offset)).ok_or(TableError::OutOfBounds)
}

pub struct DeviceIter<'a> {
    sdt: Sdt<'a>,
    offset: usize,
    remaining: u32,
}

impl<'a> Iterator for DeviceIter<'a> {
    type Item = Result<Device<'a>, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        match self.next_device() {
            Ok(device) => {
                self.remaining -= 1;
                Some(Ok(device))
            }
            Err(err) => {
                self.remaining = 0;
                Some(Err(err))
            }
        }
    }
}

impl<'a> DeviceIter<'a> {
    fn next_device(&mut self) -> Result<Device<'a>, TableError> {
        let info = self.sdt.read::<DeviceInfo>(self.offset)?;
        let length = info.length as usize;
        if length < DeviceInfo::SIZE {
            return Err(TableError::MalformedEntry);
        }

        let bytes = self.sdt.slice(self.offset, length)?;
        self.offset += length;
        Ok(Device { info, bytes })
    }
}
