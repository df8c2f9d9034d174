use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

use log::debug;
use serialport::SerialPort;
use thiserror::Error;

/// An open serial connection to a controller.
pub trait SerialLink: Read + Write {
    fn path(&self) -> &str;

    fn is_open(&self) -> bool;

    /// Releases the port. Further reads and writes fail.
    fn close(&mut self);
}

/// Why a port could not be opened.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("serial port {path} not found")]
    NotFound { path: String },
    #[error("serial error on {path}: {description}")]
    Serial { path: String, description: String },
}

pub trait SerialOpener {
    fn open(&self, path: &str) -> Result<Box<dyn SerialLink>, OpenError>;
}

#[derive(Debug, Clone, Copy)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            timeout: Duration::from_millis(1000),
        }
    }
}

/// Opens real ports through `serialport`.
#[derive(Debug, Default, Clone)]
pub struct SystemOpener {
    pub settings: SerialSettings,
}

impl SystemOpener {
    pub fn new(settings: SerialSettings) -> Self {
        Self { settings }
    }
}

impl SerialOpener for SystemOpener {
    fn open(&self, path: &str) -> Result<Box<dyn SerialLink>, OpenError> {
        let port = serialport::new(path, self.settings.baud_rate)
            .timeout(self.settings.timeout)
            .open()
            .map_err(|e| classify(path, e))?;
        debug!("opened {path} at {} baud", self.settings.baud_rate);

        Ok(Box::new(SystemLink {
            path: path.to_string(),
            port: Some(port),
        }))
    }
}

fn classify(path: &str, err: serialport::Error) -> OpenError {
    match err.kind() {
        serialport::ErrorKind::NoDevice
        | serialport::ErrorKind::Io(io::ErrorKind::NotFound) => OpenError::NotFound {
            path: path.to_string(),
        },
        _ => OpenError::Serial {
            path: path.to_string(),
            description: err.description,
        },
    }
}

pub struct SystemLink {
    path: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SystemLink {
    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port closed"))
    }
}

impl fmt::Debug for SystemLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemLink")
            .field("path", &self.path)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl Read for SystemLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port()?.read(buf)
    }
}

impl Write for SystemLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port()?.flush()
    }
}

impl SerialLink for SystemLink {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn close(&mut self) {
        // Dropping the handle releases the file descriptor.
        self.port = None;
    }
}
