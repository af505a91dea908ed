use crate::gas::AddressSpace;

/// A UART selected as the debug port: how to reach its registers, and where they are.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PortDescriptor {
    pub space: AddressSpace,
    pub address: u64,
}

/// Something that accepts the selected debug port, usually the UART driver. `configure` is called
/// at most once per resolution, and only when a port was found.
pub trait UartSink {
    fn configure(&mut self, enabled: bool, space: AddressSpace, address: u64);
}

/// The properties a 16550 driver needs to bring up a debug port. This can be passed to the
/// resolver as the sink and then handed to the driver once it's initialized.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct UartProperties {
    pub enabled: bool,
    pub port: Option<PortDescriptor>,
}

impl UartProperties {
    /// The port to use, if one has been configured and is enabled.
    pub fn enabled_port(&self) -> Option<PortDescriptor> {
        if self.enabled {
            self.port
        } else {
            None
        }
    }
}

impl UartSink for UartProperties {
    fn configure(&mut self, enabled: bool, space: AddressSpace, address: u64) {
        self.enabled = enabled;
        self.port = Some(PortDescriptor { space, address });
    }
}
