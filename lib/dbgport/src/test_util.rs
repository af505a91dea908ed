use crate::{checksum, sdt::Signature};
use std::vec::Vec;

/// Builds tables in memory for tests. The header's length and checksum are filled in by `build`.
pub struct TableBuilder {
    bytes: Vec<u8>,
}

impl TableBuilder {
    pub fn new(signature: Signature, revision: u8) -> TableBuilder {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&signature.0);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.push(revision);
        bytes.push(0);
        bytes.extend_from_slice(b"POPLAR");
        bytes.extend_from_slice(b"DBGPORT ");
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        TableBuilder { bytes }
    }

    pub fn bytes(mut self, bytes: &[u8]) -> TableBuilder {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn u8(self, value: u8) -> TableBuilder {
        self.bytes(&[value])
    }

    pub fn u16(self, value: u16) -> TableBuilder {
        self.bytes(&value.to_le_bytes())
    }

    pub fn u32(self, value: u32) -> TableBuilder {
        self.bytes(&value.to_le_bytes())
    }

    pub fn gas(self, space: u8, bit_width: u8, access_size: u8, address: u64) -> TableBuilder {
        self.bytes(&gas(space, bit_width, access_size, address))
    }

    pub fn build(mut self) -> Vec<u8> {
        let length = self.bytes.len() as u32;
        self.bytes[4..8].copy_from_slice(&length.to_le_bytes());
        self.bytes[9] = 0u8.wrapping_sub(checksum::sum(&self.bytes));
        self.bytes
    }
}

pub fn gas(space: u8, bit_width: u8, access_size: u8, address: u64) -> [u8; 12] {
    let mut bytes = [0u8; 12];
    bytes[0] = space;
    bytes[1] = bit_width;
    bytes[2] = 0;
    bytes[3] = access_size;
    bytes[4..12].copy_from_slice(&address.to_le_bytes());
    bytes
}

/// A DBG2 device information entry with one register, laid out in the order firmware usually
/// uses: fixed fields, register array, size array, namespace string.
#[derive(Clone, Copy)]
pub struct Dbg2Device {
    pub port_type: u16,
    pub port_subtype: u16,
    pub registers: u8,
    pub space: u8,
    pub address: u64,
    pub size: u32,
    pub namespace: &'static str,
}

impl Dbg2Device {
    pub fn uart(space: u8, address: u64) -> Dbg2Device {
        Dbg2Device {
            port_type: 0x8000,
            port_subtype: 0x0000,
            registers: 1,
            space,
            address,
            size: 0x10,
            namespace: "\\_SB.COM1",
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let registers = self.registers as usize;
        let bar_offset = 22;
        let size_offset = bar_offset + 12 * registers;
        let namespace_offset = size_offset + 4 * registers;
        let namespace_length = self.namespace.len() + 1;
        let length = namespace_offset + namespace_length;

        let mut bytes = Vec::new();
        bytes.push(0);
        bytes.extend_from_slice(&(length as u16).to_le_bytes());
        bytes.push(self.registers);
        bytes.extend_from_slice(&(namespace_length as u16).to_le_bytes());
        bytes.extend_from_slice(&(namespace_offset as u16).to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&self.port_type.to_le_bytes());
        bytes.extend_from_slice(&self.port_subtype.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&(bar_offset as u16).to_le_bytes());
        bytes.extend_from_slice(&(size_offset as u16).to_le_bytes());
        for i in 0..registers {
            bytes.extend_from_slice(&gas(self.space, 8, 1, self.address + 8 * i as u64));
        }
        for _ in 0..registers {
            bytes.extend_from_slice(&self.size.to_le_bytes());
        }
        bytes.extend_from_slice(self.namespace.as_bytes());
        bytes.push(0);
        bytes
    }
}

/// Build a DBG2 table containing `devices`, with the device array directly after the table's fixed
/// fields.
pub fn dbg2(devices: &[Dbg2Device]) -> Vec<u8> {
    let mut builder = TableBuilder::new(Signature::DBG2, 0).u32(44).u32(devices.len() as u32);
    for device in devices {
        builder = builder.bytes(&device.encode());
    }
    builder.build()
}
