//! The Serial Port Console Redirection table (`SPCR`) describes the serial port firmware uses as
//! its console, along with how it has been configured.

use crate::{
    gas::GenericAddress,
    sdt::{Sdt, SdtHeader},
    TableError,
};
use bit_field::BitField;
use scroll::Pread;

/// The fields of the `SPCR` after the header, as laid out in the table.
#[derive(Clone, Copy, Debug, Pread)]
#[repr(C)]
struct RawSpcr {
    interface_type: u8,
    _reserved0: [u8; 3],
    base_address: GenericAddress,
    interrupt_type: u8,
    irq: u8,
    global_system_interrupt: u32,
    baud_rate: u8,
    parity: u8,
    stop_bits: u8,
    flow_control: u8,
    terminal_type: u8,
    _reserved1: u8,
    pci_device_id: u16,
    pci_vendor_id: u16,
    pci_bus: u8,
    pci_device: u8,
    pci_function: u8,
    pci_flags: u32,
    pci_segment: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct Spcr {
    pub revision: u8,
    pub interface_type: u8,
    pub base_address: GenericAddress,
    pub interrupt_type: InterruptType,
    pub irq: u8,
    pub global_system_interrupt: u32,
    baud_rate: u8,
    pub parity: u8,
    pub stop_bits: u8,
    pub flow_control: FlowControl,
    pub terminal_type: u8,
    /// `None` if the port isn't a PCI device.
    pub pci: Option<PciLocation>,
    /// Only present in revision 3 and later of the table. `0` means the frequency is unknown.
    pub uart_clock_frequency: Option<u32>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PciLocation {
    pub device_id: u16,
    pub vendor_id: u16,
    pub segment: u8,
    pub bus: u8,
    pub device: u8,
    pub function: u8,
    pub flags: u32,
}

/// Interface types from the Microsoft "Debug Port Table 2" specification's serial subtypes, which
/// `SPCR` shares.
pub mod interface {
    pub const FULL_16550: u8 = 0x00;
    pub const SUBSET_16550: u8 = 0x01;
    pub const MAX311XE_SPI: u8 = 0x02;
    pub const PL011: u8 = 0x03;
    pub const NS16550_GAS: u8 = 0x12;
}

impl Spcr {
    pub const MIN_LENGTH: usize = SdtHeader::SIZE + 40;
    const CLOCK_FREQUENCY_FIELD: usize = Self::MIN_LENGTH;

    pub fn new(sdt: &Sdt) -> Result<Spcr, TableError> {
        if sdt.len() < Self::MIN_LENGTH {
            return Err(TableError::TooShort);
        }

        let raw = sdt.read::<RawSpcr>(SdtHeader::SIZE)?;
        let uart_clock_frequency = if sdt.revision() >= 3 {
            /*
             * Some firmware bumps the revision without growing the table, so treat a missing
             * field as unknown instead of a malformed table.
             */
            sdt.read::<u32>(Self::CLOCK_FREQUENCY_FIELD).ok()
        } else {
            None
        };

        // A device ID of `0xffff` means the port is not a PCI device
        let pci = if raw.pci_device_id == 0xffff {
            None
        } else {
            Some(PciLocation {
                device_id: raw.pci_device_id,
                vendor_id: raw.pci_vendor_id,
                segment: raw.pci_segment,
                bus: raw.pci_bus,
                device: raw.pci_device,
                function: raw.pci_function,
                flags: raw.pci_flags,
            })
        };

        Ok(Spcr {
            revision: sdt.revision(),
            interface_type: raw.interface_type,
            base_address: raw.base_address,
            interrupt_type: InterruptType(raw.interrupt_type),
            irq: raw.irq,
            global_system_interrupt: raw.global_system_interrupt,
            baud_rate: raw.baud_rate,
            parity: raw.parity,
            stop_bits: raw.stop_bits,
            flow_control: FlowControl(raw.flow_control),
            terminal_type: raw.terminal_type,
            pci,
            uart_clock_frequency,
        })
    }

    /// Whether the port can be driven as a 16550.
    pub fn is_16550_compatible(&self) -> bool {
        matches!(self.interface_type, interface::FULL_16550 | interface::SUBSET_16550 | interface::NS16550_GAS)
    }

    /// The baud rate firmware configured the port with. `None` means firmware left the port as it
    /// was already configured, or used a rate the table has no encoding for.
    pub fn baud_rate(&self) -> Option<u32> {
        match self.baud_rate {
            3 => Some(9600),
            4 => Some(19200),
            6 => Some(57600),
            7 => Some(115200),
            _ => None,
        }
    }
}

/// The interrupt mechanisms the port supports.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InterruptType(pub u8);

impl InterruptType {
    pub fn pic(&self) -> bool {
        self.0.get_bit(0)
    }

    pub fn io_apic(&self) -> bool {
        self.0.get_bit(1)
    }

    pub fn io_sapic(&self) -> bool {
        self.0.get_bit(2)
    }

    pub fn gic(&self) -> bool {
        self.0.get_bit(3)
    }

    pub fn plic(&self) -> bool {
        self.0.get_bit(4)
    }

    /// Whether the port can't raise interrupts at all.
    pub fn polled_only(&self) -> bool {
        self.0.get_bits(0..5) == 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FlowControl(pub u8);

impl FlowControl {
    pub fn dcd(&self) -> bool {
        self.0.get_bit(0)
    }

    pub fn rts_cts(&self) -> bool {
        self.0.get_bit(1)
    }

    pub fn xon_xoff(&self) -> bool {
        self.0.get_bit(2)
    }
}
