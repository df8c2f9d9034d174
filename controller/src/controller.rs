//! Event dispatch for the operator front end.
//!
//! Every user action arrives as one [`Event`] and runs to completion in
//! [`Controller::handle`]. After each transition the whole enablement table is
//! re-derived from the [`ConnectionState`]; nothing is patched incrementally.

use anyhow::Result;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::discover::PortScanner;
use crate::driver::{DriverFactory, ScreenDriver};
use crate::link::{SerialLink, SerialOpener};
use crate::model::{Output, PatternCommand, PatternKind, PortDescriptor};
use crate::state::{ConnectionState, Enablement, advance};
use crate::view::{StatusColour, View, Widget};

pub const OPEN_LABEL: &str = "Click to open selected port";
pub const NO_REPLY_TITLE: &str = "No reply from screen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    RefreshPorts,
    SelectPort(usize),
    OpenPort,
    ClosePort,
    /// Output-selector index: 0 is "none", 1 and 2 are the outputs.
    SelectOutput(usize),
    SetPattern(PatternKind),
    MoveBrightness(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Applied,
    /// The targeted control is not enabled in the current state.
    Disabled(Widget),
    /// The event carried an index outside the available choices.
    OutOfRange,
}

/// The collaborators a controller drives.
pub struct Collaborators {
    pub scanner: Box<dyn PortScanner>,
    pub opener: Box<dyn SerialOpener>,
    pub drivers: Box<dyn DriverFactory>,
}

/// Serialisable view of the controller model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: ConnectionState,
    pub ports: Vec<PortDescriptor>,
    pub selected_port: Option<usize>,
    pub open_port: Option<String>,
    pub output_index: usize,
    pub brightness: Option<u8>,
    pub pattern: Option<PatternKind>,
    pub enablement: Enablement,
}

pub struct Controller<V: View> {
    view: V,
    scanner: Box<dyn PortScanner>,
    opener: Box<dyn SerialOpener>,
    drivers: Box<dyn DriverFactory>,
    ports: Vec<PortDescriptor>,
    selected_port: Option<usize>,
    link: Option<Box<dyn SerialLink>>,
    driver: Option<Box<dyn ScreenDriver>>,
    output_index: usize,
    state: ConnectionState,
    brightness: Option<u8>,
    pattern: Option<PatternKind>,
}

impl<V: View> Controller<V> {
    /// Builds the controller, scans ports once and renders the initial state.
    pub fn new(view: V, collaborators: Collaborators) -> Result<Self> {
        let mut controller = Self {
            view,
            scanner: collaborators.scanner,
            opener: collaborators.opener,
            drivers: collaborators.drivers,
            ports: Vec::new(),
            selected_port: None,
            link: None,
            driver: None,
            output_index: 0,
            state: ConnectionState::Disconnected,
            brightness: None,
            pattern: None,
        };
        debug!("Starting");
        controller.refresh_ports()?;
        controller.view.set_open_button(false, OPEN_LABEL);
        controller.apply_state();
        Ok(controller)
    }

    pub fn handle(&mut self, event: Event) -> Result<Handled> {
        debug!("event {event:?} in state {}", self.state.level());
        if let Some(widget) = self.blocked_by(event) {
            debug!("{widget:?} is disabled, ignoring {event:?}");
            return Ok(Handled::Disabled(widget));
        }

        match event {
            Event::RefreshPorts => self.refresh_ports()?,
            Event::SelectPort(row) => {
                if row >= self.ports.len() {
                    warn!("no port at row {row}");
                    return Ok(Handled::OutOfRange);
                }
                self.selected_port = Some(row);
                self.view.select_port_row(row);
            }
            Event::OpenPort => self.open_port()?,
            Event::ClosePort => self.close_port(),
            Event::SelectOutput(index) => {
                if index > 2 {
                    warn!("no output at index {index}");
                    return Ok(Handled::OutOfRange);
                }
                self.select_output(index)?;
            }
            Event::SetPattern(kind) => self.set_pattern(kind)?,
            Event::MoveBrightness(value) => self.move_brightness(value)?,
        }
        Ok(Handled::Applied)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn enablement(&self) -> Enablement {
        Enablement::for_state(self.state)
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        &self.ports
    }

    pub fn has_link(&self) -> bool {
        self.link.is_some()
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    pub fn output_index(&self) -> usize {
        self.output_index
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            ports: self.ports.clone(),
            selected_port: self.selected_port,
            open_port: self.link.as_ref().map(|link| link.path().to_string()),
            output_index: self.output_index,
            brightness: self.brightness,
            pattern: self.pattern,
            enablement: self.enablement(),
        }
    }

    /// Closes the link, if any, before the controller goes away.
    pub fn shutdown(&mut self) {
        if self.link.is_some() {
            self.close_port();
        }
    }

    fn blocked_by(&self, event: Event) -> Option<Widget> {
        let enablement = self.enablement();
        let widget = match event {
            Event::OpenPort if self.ports.is_empty() => return Some(Widget::OpenButton),
            // "none" stays reachable so a driver can always be discarded.
            Event::SelectOutput(index) if index > 0 => Widget::OutputSelector,
            Event::SetPattern(kind) => Widget::PatternButton(kind),
            Event::MoveBrightness(_) => Widget::BrightnessSlider,
            _ => return None,
        };
        match enablement.widget(widget) {
            Some(false) => Some(widget),
            _ => None,
        }
    }

    fn refresh_ports(&mut self) -> Result<()> {
        let mut ports = self.scanner.available_ports()?;
        ports.sort();
        for port in &ports {
            debug!("Found serial port: {} ({}, {})", port.name, port.vendor, port.product);
        }

        self.view.set_port_list(&ports);
        self.ports = ports;

        if self.ports.is_empty() {
            self.selected_port = None;
            // The open port vanished with the rest of the list.
            if let Some(mut link) = self.link.take() {
                link.close();
                self.driver = None;
                warn!("{} disappeared while open", link.path());
            }
            self.view.set_enabled(Widget::OpenButton, false);
            self.view.set_serial_status("No ports found...", StatusColour::Orange);
            self.change_state(ConnectionState::Disconnected);
        } else {
            self.selected_port = Some(0);
            self.view.set_enabled(Widget::OpenButton, true);
            self.view.select_port_row(0);
        }
        Ok(())
    }

    fn open_port(&mut self) -> Result<()> {
        if let Some(link) = &self.link {
            info!("{} is already open", link.path());
            return Ok(());
        }
        let Some(port) = self.selected_port.and_then(|row| self.ports.get(row)).cloned() else {
            self.view.set_open_button(false, OPEN_LABEL);
            self.change_state(ConnectionState::Disconnected);
            return Ok(());
        };

        debug!("opening serial port {} ({})", port.name, port.path);
        let link = match self.opener.open(&port.path) {
            Ok(link) => Some(link),
            Err(e) => {
                error!("Issue during opening: {e}");
                self.refresh_ports()?;
                self.view.set_open_button(false, OPEN_LABEL);
                self.change_state(ConnectionState::Disconnected);
                None
            }
        };

        match link {
            Some(link) if link.is_open() => {
                self.link = Some(link);
                debug!("Port open.");
                self.view
                    .set_serial_status(&format!("Opened {}", port.name), StatusColour::Green);
                self.view
                    .set_open_button(true, &format!("Click to close {}", port.name));
                self.change_state(ConnectionState::Connected);
                if let Some(output) = self.state.output() {
                    self.bind_driver(output)?;
                }
            }
            _ => {
                error!("Issue during opening port {}.", port.path);
                self.view
                    .set_serial_status("Error opening port. See logs.", StatusColour::Red);
                self.view.set_open_button(false, OPEN_LABEL);
                self.link = None;
                self.change_state(ConnectionState::Disconnected);
            }
        }
        Ok(())
    }

    fn close_port(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
            debug!("Closed {}", link.path());
        }
        self.driver = None;
        self.view.set_serial_status("Closed serial port", StatusColour::Orange);
        self.view.set_open_button(false, OPEN_LABEL);
        self.change_state(ConnectionState::Disconnected);
    }

    fn select_output(&mut self, index: usize) -> Result<()> {
        self.output_index = index;
        self.view.set_output_index(index);

        match (Output::from_index(index), self.link.is_some()) {
            (Some(output), true) => {
                self.change_state(ConnectionState::Connected);
                self.bind_driver(output)
            }
            (_, has_link) => {
                self.driver = None;
                let requested = if has_link {
                    ConnectionState::Connected
                } else {
                    ConnectionState::Disconnected
                };
                self.change_state(requested);
                Ok(())
            }
        }
    }

    /// Attaches a driver to the open link and reads back the brightness.
    fn bind_driver(&mut self, output: Output) -> Result<()> {
        self.driver = None;
        let Some(link) = self.link.as_deref_mut() else {
            return Ok(());
        };
        let mut driver = self.drivers.attach(&*link);

        debug!("Querying brightness from output {output}");
        let reply = driver.get_brightness(link, output)?;
        self.driver = Some(driver);

        match reply {
            Some(value) => {
                debug!("Response: {value}");
                self.brightness = Some(value);
                self.view.set_brightness(value);
            }
            None => {
                error!("Issue while getting brightness from output {output}.");
                self.view.show_error(
                    NO_REPLY_TITLE,
                    &format!(
                        "Screen did not reply when requesting current brightness from output \
                         {output}. Check connections and configuration..."
                    ),
                );
                self.driver = None;
                self.brightness = None;
                self.output_index = 0;
                self.view.set_output_index(0);
                self.change_state(ConnectionState::Connected);
            }
        }
        Ok(())
    }

    fn set_pattern(&mut self, kind: PatternKind) -> Result<()> {
        let (Some(driver), Some(link), Some(output)) =
            (self.driver.as_mut(), self.link.as_deref_mut(), self.state.output())
        else {
            return Ok(());
        };

        match kind.command() {
            PatternCommand::Deactivate => driver.deactivate_pattern(link, output)?,
            PatternCommand::Set(pattern) => driver.set_pattern(link, pattern, output)?,
        }
        self.pattern = Some(kind);
        self.view.mark_pattern(kind);
        debug!("Output {output} set to {kind}");
        Ok(())
    }

    fn move_brightness(&mut self, value: u8) -> Result<()> {
        self.brightness = Some(value);
        self.view.set_brightness(value);
        if let (Some(driver), Some(link), Some(output)) =
            (self.driver.as_mut(), self.link.as_deref_mut(), self.state.output())
        {
            driver.set_brightness(link, output, value)?;
        }
        Ok(())
    }

    fn change_state(&mut self, requested: ConnectionState) {
        let next = advance(requested, Output::from_index(self.output_index));
        if next != self.state {
            info!("state {} -> {}", self.state, next);
        }
        self.state = next;
        self.apply_state();
    }

    fn apply_state(&mut self) {
        for (widget, enabled) in self.enablement().widgets() {
            self.view.set_enabled(widget, enabled);
        }
    }
}
