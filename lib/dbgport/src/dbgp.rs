use crate::{
    gas::GenericAddress,
    sdt::{Sdt, SdtHeader},
    TableError,
};

/// The original Debug Port Table (`DBGP`), which describes a single debug port.
#[derive(Clone, Copy, Debug)]
pub struct Dbgp {
    pub interface_type: InterfaceType,
    pub base_address: GenericAddress,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InterfaceType {
    /// A full 16550 interface.
    Full16550,
    /// The 16550 subset described by the `DBGP` specification.
    Subset16550,
    Reserved(u8),
}

impl From<u8> for InterfaceType {
    fn from(value: u8) -> InterfaceType {
        match value {
            0 => InterfaceType::Full16550,
            1 => InterfaceType::Subset16550,
            other => InterfaceType::Reserved(other),
        }
    }
}

impl Dbgp {
    pub const LENGTH: usize = SdtHeader::SIZE + 16;

    pub fn new(sdt: &Sdt) -> Result<Dbgp, TableError> {
        if sdt.len() < Self::LENGTH {
            return Err(TableError::TooShort);
        }

        Ok(Dbgp {
            interface_type: InterfaceType::from(sdt.read::<u8>(SdtHeader::SIZE)?),
            base_address: sdt.read::<GenericAddress>(SdtHeader::SIZE + 4)?,
        })
    }
}
