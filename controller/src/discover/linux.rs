#![cfg(target_os = "linux")]

use anyhow::Result;
use glob::glob;
#[cfg(feature = "linux-udev")]
use std::collections::HashMap;

use super::{UNKNOWN, display_name};
use crate::model::PortDescriptor;

#[cfg(feature = "linux-udev")]
use udev::Enumerator;

#[derive(Debug, Default, Clone)]
pub struct LinuxDiscovery {
    pub include_nodes: bool,
}

impl LinuxDiscovery {
    /// Adds device nodes enumeration missed, fills in names from udev and
    /// returns the list sorted and without duplicate paths.
    pub fn augment(&self, mut ports: Vec<PortDescriptor>) -> Result<Vec<PortDescriptor>> {
        if self.include_nodes {
            ports.extend(scan_serial_nodes()?);
        }

        enrich_with_udev(&mut ports)?;
        dedup_by_path(&mut ports);

        Ok(ports)
    }
}

/// USB serial bridges show up as ttyUSB (CP210x, FTDI) or ttyACM (CDC).
fn scan_serial_nodes() -> Result<Vec<PortDescriptor>> {
    let mut out = Vec::new();
    for pat in ["/dev/ttyUSB*", "/dev/ttyACM*"] {
        for entry in glob(pat)? {
            let Ok(path) = entry else { continue };
            let p = path.to_string_lossy().to_string();

            out.push(PortDescriptor {
                name: display_name(&p),
                path: p,
                vendor: UNKNOWN.into(),
                product: UNKNOWN.into(),
            });
        }
    }
    Ok(out)
}

/// Best-effort vendor/model names from udev for ports that lack them.
#[cfg(feature = "linux-udev")]
fn enrich_with_udev(ports: &mut [PortDescriptor]) -> Result<()> {
    let names = udev_names_by_node()?;

    for port in ports.iter_mut() {
        let Some(found) = names.get(&port.path) else { continue };

        if port.vendor == UNKNOWN {
            if let Some(vendor) = &found.vendor {
                port.vendor = vendor.clone();
            }
        }
        if port.product == UNKNOWN {
            if let Some(model) = &found.model {
                port.product = model.clone();
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "linux-udev"))]
fn enrich_with_udev(_ports: &mut [PortDescriptor]) -> Result<()> {
    Ok(())
}

#[cfg(feature = "linux-udev")]
#[derive(Debug, PartialEq, Eq)]
struct UdevNames {
    vendor: Option<String>,
    model: Option<String>,
}

#[cfg(feature = "linux-udev")]
impl UdevNames {
    /// The hardware database names win over the raw USB descriptor strings.
    fn from_properties(property: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let first_of = |keys: [&str; 2]| keys.into_iter().find_map(&property);
        let found = Self {
            vendor: first_of(["ID_VENDOR_FROM_DATABASE", "ID_VENDOR"]),
            model: first_of(["ID_MODEL_FROM_DATABASE", "ID_MODEL"]).map(|m| m.replace('_', " ")),
        };
        (found.vendor.is_some() || found.model.is_some()).then_some(found)
    }
}

/// tty device nodes that udev can name, keyed by node path.
#[cfg(feature = "linux-udev")]
fn udev_names_by_node() -> Result<HashMap<String, UdevNames>> {
    let mut enumerator = Enumerator::new()?;
    enumerator.match_subsystem("tty")?;

    let mut names = HashMap::new();
    for device in enumerator.scan_devices()? {
        let Some(node) = device.devnode() else { continue };
        let found = UdevNames::from_properties(|key| {
            device
                .property_value(key)
                .map(|value| value.to_string_lossy().into_owned())
        });
        if let Some(found) = found {
            names.insert(node.to_string_lossy().into_owned(), found);
        }
    }

    Ok(names)
}

/// Keeps the most informative entry per path: enumeration results come
/// before bare glob hits for the same node.
fn dedup_by_path(ports: &mut Vec<PortDescriptor>) {
    ports.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| (a.vendor == UNKNOWN).cmp(&(b.vendor == UNKNOWN)))
    });
    ports.dedup_by(|a, b| a.path == b.path);
}
