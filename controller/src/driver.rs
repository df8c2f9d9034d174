//! Contract for MCTRL300 drivers.
//!
//! Frame encoding and reply parsing live in the protocol crate that
//! implements [`ScreenDriver`]. The link is owned by the controller and lent
//! to the driver for each call.

use anyhow::Result;
use log::info;

use crate::link::SerialLink;
use crate::model::{Output, TestPattern};

pub trait ScreenDriver {
    fn set_pattern(&mut self, link: &mut dyn SerialLink, pattern: TestPattern, output: Output) -> Result<()>;

    fn deactivate_pattern(&mut self, link: &mut dyn SerialLink, output: Output) -> Result<()>;

    /// `Ok(None)` means the screen did not answer.
    fn get_brightness(&mut self, link: &mut dyn SerialLink, output: Output) -> Result<Option<u8>>;

    fn set_brightness(&mut self, link: &mut dyn SerialLink, output: Output, value: u8) -> Result<()>;
}

/// Builds a driver for an open link.
pub trait DriverFactory {
    fn attach(&self, link: &dyn SerialLink) -> Box<dyn ScreenDriver>;
}

/// Driver that logs commands instead of sending frames.
///
/// Brightness is remembered per output so queries answer with the last value
/// set. A closed link behaves like a screen that does not reply.
#[derive(Debug, Clone)]
pub struct DryRunDriver {
    brightness: [u8; 2],
}

impl DryRunDriver {
    pub fn new(initial_brightness: u8) -> Self {
        Self {
            brightness: [initial_brightness; 2],
        }
    }

    fn slot(&mut self, output: Output) -> &mut u8 {
        &mut self.brightness[output.index() - 1]
    }
}

impl ScreenDriver for DryRunDriver {
    fn set_pattern(&mut self, link: &mut dyn SerialLink, pattern: TestPattern, output: Output) -> Result<()> {
        info!("dry run: {} output {output} pattern {pattern:?}", link.path());
        Ok(())
    }

    fn deactivate_pattern(&mut self, link: &mut dyn SerialLink, output: Output) -> Result<()> {
        info!("dry run: {} output {output} pattern off", link.path());
        Ok(())
    }

    fn get_brightness(&mut self, link: &mut dyn SerialLink, output: Output) -> Result<Option<u8>> {
        if !link.is_open() {
            return Ok(None);
        }
        Ok(Some(*self.slot(output)))
    }

    fn set_brightness(&mut self, link: &mut dyn SerialLink, output: Output, value: u8) -> Result<()> {
        info!("dry run: {} output {output} brightness {value}", link.path());
        *self.slot(output) = value;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DryRunFactory {
    pub initial_brightness: u8,
}

impl DriverFactory for DryRunFactory {
    fn attach(&self, link: &dyn SerialLink) -> Box<dyn ScreenDriver> {
        info!("dry-run driver attached to {}", link.path());
        Box::new(DryRunDriver::new(self.initial_brightness))
    }
}
