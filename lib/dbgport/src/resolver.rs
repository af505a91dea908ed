use crate::{
    config::ResolverConfig,
    sdt::{self, Sdt, SdtHeader, Signature},
    source::{DebugPortSource, DEFAULT_SOURCES, RESERVED_TABLES},
    uart::{PortDescriptor, UartSink},
    TableError,
};
use acpi::{AcpiHandler, PhysicalMapping};
use core::{ptr::NonNull, slice};
use log::{debug, info, warn};

/// Finds firmware tables by their signature. This is normally backed by a walk of the XSDT or RSDT.
pub trait TableLocator {
    /// Get the physical address of the table with the given signature, or `0` if firmware doesn't
    /// provide one.
    fn lookup(&self, signature: Signature) -> u64;
}

/// An `AcpiHandler` for when physical memory is identity-mapped, as it is while UEFI boot services
/// are active.
#[derive(Clone, Copy, Default, Debug)]
pub struct IdentityMapped;

impl AcpiHandler for IdentityMapped {
    unsafe fn map_physical_region<T>(&self, physical_address: usize, size: usize) -> PhysicalMapping<Self, T> {
        let virtual_start = NonNull::new(physical_address as *mut T).expect("Tried to map ACPI table at 0x0");
        unsafe { PhysicalMapping::new(physical_address, virtual_start, size, size, *self) }
    }

    fn unmap_physical_region<T>(_region: &PhysicalMapping<Self, T>) {}
}

/// Finds a debug UART by trying each of its sources in order. The first source to produce a
/// usable port wins, and within the `DBG2`, the first usable device entry wins. There is no
/// attempt to pick a "best" port among several usable ones.
pub struct Resolver<'s> {
    config: ResolverConfig,
    reserved: &'s [Signature],
    sources: &'s [&'s dyn DebugPortSource],
}

impl Resolver<'static> {
    pub fn new(config: ResolverConfig) -> Resolver<'static> {
        Resolver { config, reserved: RESERVED_TABLES, sources: DEFAULT_SOURCES }
    }
}

impl<'s> Resolver<'s> {
    /// Create a resolver that tries `sources` in order, and doesn't look up any other tables.
    pub fn with_sources(config: ResolverConfig, sources: &'s [&'s dyn DebugPortSource]) -> Resolver<'s> {
        Resolver { config, reserved: &[], sources }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Look for a debug UART, finding tables with `locator` and mapping them with `handler`. If one
    /// is found, it is passed to `sink` (which is called exactly once) and returned. Nothing here
    /// is fatal: a missing or malformed table just means we move on to the next one, and `None`
    /// means the caller should fall back to its default port, or go without a debug console.
    pub fn resolve<L, H, S>(&self, locator: &L, handler: &H, sink: &mut S) -> Option<PortDescriptor>
    where
        L: TableLocator + ?Sized,
        H: AcpiHandler,
        S: UartSink + ?Sized,
    {
        if !self.config.enabled {
            debug!("Debug port discovery is disabled");
            return None;
        }

        for &signature in self.reserved {
            match locator.lookup(signature) {
                0 => debug!("No ACPI {} table", signature),
                address => debug!("ACPI {} table at {:#x}, not used to select a port", signature, address),
            }
        }

        for source in self.sources {
            let signature = source.signature();
            match self.try_source(locator, handler, *source) {
                Ok(Some(port)) => {
                    info!("Using ACPI {} debug port as UART: {:?} at {:#x}", signature, port.space, port.address);
                    sink.configure(true, port.space, port.address);
                    return Some(port);
                }
                Ok(None) => (),
                Err(TableError::ChecksumMismatch) => {
                    warn!("ACPI {} table checksum failed, skipping it", signature);
                }
                Err(err) => {
                    warn!("ACPI {} table is malformed ({}), skipping it", signature, err);
                }
            }
        }

        info!("No debug port found in ACPI tables");
        None
    }

    fn try_source<L, H>(
        &self,
        locator: &L,
        handler: &H,
        source: &dyn DebugPortSource,
    ) -> Result<Option<PortDescriptor>, TableError>
    where
        L: TableLocator + ?Sized,
        H: AcpiHandler,
    {
        let signature = source.signature();
        let address = locator.lookup(signature);
        if address == 0 {
            debug!("No ACPI {} table", signature);
            return Ok(None);
        }

        let address = usize::try_from(address).map_err(|_| TableError::OutOfBounds)?;
        let mapping = map_table(handler, signature, address)?;
        let table = Sdt::new(mapped_bytes(&mapping))?;
        if !table.validate_checksum() {
            if self.config.verify_checksums {
                return Err(TableError::ChecksumMismatch);
            }
            warn!("ACPI {} table checksum failed, using it anyway", signature);
        }

        source.find_port(table)
    }
}

/// Map the table at `address` in two steps: first just its header, to find out how long it is,
/// and then the whole table.
fn map_table<H>(handler: &H, signature: Signature, address: usize) -> Result<PhysicalMapping<H, u8>, TableError>
where
    H: AcpiHandler,
{
    let header = {
        // SAFETY: `address` came from the locator, and every table is at least as long as its header
        let mapping = unsafe { handler.map_physical_region::<u8>(address, SdtHeader::SIZE) };
        sdt::read_header(mapped_bytes(&mapping))?
    };
    if header.signature() != signature {
        return Err(TableError::SignatureMismatch);
    }

    // SAFETY: `address` came from the locator, and the header has told us the table's length
    Ok(unsafe { handler.map_physical_region::<u8>(address, header.length as usize) })
}

fn mapped_bytes<H>(mapping: &PhysicalMapping<H, u8>) -> &[u8]
where
    H: AcpiHandler,
{
    // SAFETY: the handler has made `region_length` bytes readable, for as long as the mapping lives
    unsafe { slice::from_raw_parts(mapping.virtual_start().as_ptr(), mapping.region_length()) }
}
