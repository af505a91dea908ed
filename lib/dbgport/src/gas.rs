use scroll::Pread;

/// The Generic Address Structure, which describes where a register lives. It is 12 bytes long in
/// the tables, and the `address` field is not naturally aligned, so it should always be read with
/// `pread` rather than by casting a pointer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Pread)]
#[repr(C)]
pub struct GenericAddress {
    pub address_space: u8,
    pub bit_width: u8,
    pub bit_offset: u8,
    /// Encoded access size: `0` is undefined (legacy), `1` is byte access, `2` word, `3` dword,
    /// and `4` qword.
    pub access_size: u8,
    pub address: u64,
}

impl GenericAddress {
    pub const SIZE: usize = 12;

    /// The address space the register is in, if it's one we can drive a UART through.
    pub fn space(&self) -> Option<AddressSpace> {
        AddressSpace::from_id(self.address_space)
    }

    /// The access size in bytes, or `None` if it is undefined or unknown.
    pub fn access_size_bytes(&self) -> Option<u8> {
        match self.access_size {
            1..=4 => Some(1 << (self.access_size - 1)),
            _ => None,
        }
    }
}

/// The address spaces a UART's registers can be accessed through.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddressSpace {
    SystemMemory,
    SystemIo,
}

impl AddressSpace {
    pub const SYSTEM_MEMORY_ID: u8 = 0x00;
    pub const SYSTEM_IO_ID: u8 = 0x01;

    pub fn from_id(id: u8) -> Option<AddressSpace> {
        match id {
            AddressSpace::SYSTEM_MEMORY_ID => Some(AddressSpace::SystemMemory),
            AddressSpace::SYSTEM_IO_ID => Some(AddressSpace::SystemIo),
            _ => None,
        }
    }

    /// The Address Space ID used for this space in a Generic Address Structure.
    pub fn id(self) -> u8 {
        match self {
            AddressSpace::SystemMemory => Self::SYSTEM_MEMORY_ID,
            AddressSpace::SystemIo => Self::SYSTEM_IO_ID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::gas;
    use scroll::LE;

    #[test]
    fn parse_unaligned() {
        let mut bytes = [0u8; 13];
        bytes[1..].copy_from_slice(&gas(0x01, 8, 1, 0x3f8));
        let address = bytes.pread_with::<GenericAddress>(1, LE).unwrap();

        assert_eq!(
            address,
            GenericAddress { address_space: 1, bit_width: 8, bit_offset: 0, access_size: 1, address: 0x3f8 }
        );
        assert_eq!(address.space(), Some(AddressSpace::SystemIo));
        assert_eq!(address.access_size_bytes(), Some(1));
    }

    #[test]
    fn too_short() {
        let bytes = gas(0x00, 32, 3, 0xfed0_0000);
        assert!(bytes[..11].pread_with::<GenericAddress>(0, LE).is_err());
    }

    #[test]
    fn spaces() {
        assert_eq!(AddressSpace::from_id(0x00), Some(AddressSpace::SystemMemory));
        assert_eq!(AddressSpace::from_id(0x01), Some(AddressSpace::SystemIo));
        assert_eq!(AddressSpace::from_id(0x02), None);
        assert_eq!(AddressSpace::from_id(0x7f), None);
        assert_eq!(AddressSpace::SystemIo.id(), 1);
    }

    #[test]
    fn access_sizes() {
        let mut address =
            GenericAddress { address_space: 0, bit_width: 32, bit_offset: 0, access_size: 0, address: 0 };
        assert_eq!(address.access_size_bytes(), None);
        address.access_size = 3;
        assert_eq!(address.access_size_bytes(), Some(4));
        address.access_size = 4;
        assert_eq!(address.access_size_bytes(), Some(8));
        address.access_size = 5;
        assert_eq!(address.access_size_bytes(), None);
    }
}
