use crate::{
    dbg2::Dbg2,
    dbgp::Dbgp,
    sdt::{Sdt, Signature},
    spcr::Spcr,
    uart::PortDescriptor,
    TableError,
};
use log::debug;

/// A firmware table that a debug port can be found in. The resolver looks up each source's table
/// by signature, checks it, and then asks the source for a port.
pub trait DebugPortSource {
    fn signature(&self) -> Signature;

    /// Look for a usable debug port in `table`, which has already been found by the source's
    /// signature. Returns `Ok(None)` if the table doesn't describe a port we can use.
    fn find_port(&self, table: Sdt<'_>) -> Result<Option<PortDescriptor>, TableError>;
}

/// Tables that are looked up before any port is selected. Their addresses are only logged for now.
pub const RESERVED_TABLES: &[Signature] = &[Signature::DBGP, Signature::SPCR];

/// The order sources are tried in by default: the structured `DBG2` first, then the legacy `DBGP`.
pub const DEFAULT_SOURCES: &[&dyn DebugPortSource] = &[&Dbg2Source, &DbgpSource];

/// Selects the first usable UART described by the `DBG2`.
pub struct Dbg2Source;

impl DebugPortSource for Dbg2Source {
    fn signature(&self) -> Signature {
        Signature::DBG2
    }

    fn find_port(&self, table: Sdt<'_>) -> Result<Option<PortDescriptor>, TableError> {
        let dbg2 = Dbg2::new(table)?;
        debug!("DBG2 describes {} debug devices", dbg2.device_count());

        Ok(dbg2.find_uart()?.map(|(device, port)| {
            debug!("Found usable DBG2 device: {}", device.namespace().unwrap_or("<unnamed>"));
            port
        }))
    }
}

/// The `DBGP` is parsed, but ports described by it are not currently used.
pub struct DbgpSource;

impl DebugPortSource for DbgpSource {
    fn signature(&self) -> Signature {
        Signature::DBGP
    }

    fn find_port(&self, table: Sdt<'_>) -> Result<Option<PortDescriptor>, TableError> {
        let dbgp = Dbgp::new(&table)?;
        debug!(
            "DBGP describes a {:?} port at {:#x} (space {}), which is not used",
            dbgp.interface_type, dbgp.base_address.address, dbgp.base_address.address_space
        );
        Ok(None)
    }
}

/// The `SPCR` is parsed, but ports described by it are not currently used. It isn't one of the
/// default sources, but can be tried with [`Resolver::with_sources`](crate::Resolver::with_sources).
pub struct SpcrSource;

impl DebugPortSource for SpcrSource {
    fn signature(&self) -> Signature {
        Signature::SPCR
    }

    fn find_port(&self, table: Sdt<'_>) -> Result<Option<PortDescriptor>, TableError> {
        let spcr = Spcr::new(&table)?;
        debug!(
            "SPCR describes a port of type {:#x} at {:#x} (space {}, baud {:?}), which is not used",
            spcr.interface_type,
            spcr.base_address.address,
            spcr.base_address.address_space,
            spcr.baud_rate()
        );
        Ok(None)
    }
}
