use std::path::Path;

use anyhow::Result;
use serialport::{SerialPortInfo, SerialPortType};

use crate::model::PortDescriptor;

#[cfg(target_os = "linux")]
mod linux;

pub const UNKNOWN: &str = "unknown";

/// Source of the port list shown to the operator.
///
/// An empty list is a valid answer, not an error.
pub trait PortScanner {
    fn available_ports(&self) -> Result<Vec<PortDescriptor>>;
}

/// Scans the ports of this machine.
#[derive(Debug, Clone)]
pub struct SystemScanner {
    /// Also list tty nodes that enumeration did not report (Linux only).
    pub include_nodes: bool,
}

impl Default for SystemScanner {
    fn default() -> Self {
        Self { include_nodes: true }
    }
}

impl PortScanner for SystemScanner {
    fn available_ports(&self) -> Result<Vec<PortDescriptor>> {
        let ports: Vec<PortDescriptor> = serialport::available_ports()?
            .into_iter()
            .map(describe)
            .collect();

        #[cfg(target_os = "linux")]
        let ports = linux::LinuxDiscovery {
            include_nodes: self.include_nodes,
        }
        .augment(ports)?;

        Ok(ports)
    }
}

fn describe(info: SerialPortInfo) -> PortDescriptor {
    let name = display_name(&info.port_name);
    match info.port_type {
        SerialPortType::UsbPort(usb) => PortDescriptor {
            path: info.port_name,
            name,
            vendor: usb
                .manufacturer
                .unwrap_or_else(|| format!("{:04x}", usb.vid)),
            product: usb.product.unwrap_or_else(|| format!("{:04x}", usb.pid)),
        },
        SerialPortType::PciPort => PortDescriptor {
            path: info.port_name,
            name,
            vendor: UNKNOWN.into(),
            product: "PCI serial".into(),
        },
        _ => PortDescriptor {
            path: info.port_name,
            name,
            vendor: UNKNOWN.into(),
            product: UNKNOWN.into(),
        },
    }
}

/// `/dev/ttyUSB0` shows as `ttyUSB0`; `COM3` stays `COM3`.
pub fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}
