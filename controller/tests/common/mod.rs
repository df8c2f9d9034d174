//! Shared fakes for controller integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Read, Write};
use std::rc::Rc;

use anyhow::{Result, bail};
use mctrl300_control::driver::{DriverFactory, ScreenDriver};
use mctrl300_control::link::{OpenError, SerialLink, SerialOpener};
use mctrl300_control::view::{StatusColour, View, Widget};
use mctrl300_control::{Collaborators, Controller, Output, PatternKind, PortDescriptor, TestPattern};

pub fn cp2102(path: &str) -> PortDescriptor {
    let name = path.rsplit('/').next().unwrap_or(path);
    PortDescriptor::new(path, name, "Silicon Labs", "CP2102 USB to UART Bridge Controller")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    SetPattern(TestPattern, Output),
    Deactivate(Output),
    GetBrightness(Output),
    SetBrightness(Output, u8),
}

/// Handles the test keeps to steer and inspect the fakes.
#[derive(Clone, Default)]
pub struct Rig {
    pub ports: Rc<RefCell<Vec<PortDescriptor>>>,
    /// Paths that open successfully.
    pub present: Rc<RefCell<Vec<String>>>,
    /// Paths that open but report themselves closed.
    pub dead: Rc<RefCell<Vec<String>>>,
    pub closed: Rc<RefCell<Vec<String>>>,
    pub calls: Rc<RefCell<Vec<DriverCall>>>,
    /// Brightness replies, consumed in order; empty means "no reply".
    pub replies: Rc<RefCell<VecDeque<Option<u8>>>>,
    pub attached: Rc<RefCell<usize>>,
    /// Makes the next brightness query fail with an I/O error.
    pub failing_query: Rc<RefCell<bool>>,
}

impl Rig {
    pub fn with_ports(paths: &[&str]) -> Self {
        let rig = Rig::default();
        for path in paths {
            rig.ports.borrow_mut().push(cp2102(path));
            rig.present.borrow_mut().push(path.to_string());
        }
        rig
    }

    pub fn reply(&self, value: Option<u8>) {
        self.replies.borrow_mut().push_back(value);
    }

    pub fn fail_next_query(&self) {
        *self.failing_query.borrow_mut() = true;
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().clone()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            scanner: Box::new(FakeScanner(self.clone())),
            opener: Box::new(FakeOpener(self.clone())),
            drivers: Box::new(FakeFactory(self.clone())),
        }
    }

    pub fn controller(&self) -> Controller<RecordingView> {
        Controller::new(RecordingView::default(), self.collaborators()).unwrap()
    }
}

struct FakeScanner(Rig);

impl mctrl300_control::discover::PortScanner for FakeScanner {
    fn available_ports(&self) -> Result<Vec<PortDescriptor>> {
        Ok(self.0.ports.borrow().clone())
    }
}

struct FakeOpener(Rig);

impl SerialOpener for FakeOpener {
    fn open(&self, path: &str) -> Result<Box<dyn SerialLink>, OpenError> {
        let open = if self.0.present.borrow().iter().any(|p| p == path) {
            true
        } else if self.0.dead.borrow().iter().any(|p| p == path) {
            false
        } else {
            return Err(OpenError::NotFound {
                path: path.to_string(),
            });
        };
        Ok(Box::new(FakeLink {
            path: path.to_string(),
            open,
            rig: self.0.clone(),
        }))
    }
}

struct FakeLink {
    path: String,
    open: bool,
    rig: Rig,
}

impl Read for FakeLink {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Write for FakeLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for FakeLink {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
        self.rig.closed.borrow_mut().push(self.path.clone());
    }
}

struct FakeFactory(Rig);

impl DriverFactory for FakeFactory {
    fn attach(&self, _link: &dyn SerialLink) -> Box<dyn ScreenDriver> {
        *self.0.attached.borrow_mut() += 1;
        Box::new(FakeDriver(self.0.clone()))
    }
}

struct FakeDriver(Rig);

impl ScreenDriver for FakeDriver {
    fn set_pattern(&mut self, _link: &mut dyn SerialLink, pattern: TestPattern, output: Output) -> Result<()> {
        self.0.calls.borrow_mut().push(DriverCall::SetPattern(pattern, output));
        Ok(())
    }

    fn deactivate_pattern(&mut self, _link: &mut dyn SerialLink, output: Output) -> Result<()> {
        self.0.calls.borrow_mut().push(DriverCall::Deactivate(output));
        Ok(())
    }

    fn get_brightness(&mut self, _link: &mut dyn SerialLink, output: Output) -> Result<Option<u8>> {
        self.0.calls.borrow_mut().push(DriverCall::GetBrightness(output));
        if self.0.failing_query.replace(false) {
            bail!("write to screen timed out");
        }
        Ok(self.0.replies.borrow_mut().pop_front().flatten())
    }

    fn set_brightness(&mut self, _link: &mut dyn SerialLink, output: Output, value: u8) -> Result<()> {
        self.0.calls.borrow_mut().push(DriverCall::SetBrightness(output, value));
        Ok(())
    }
}

/// View that remembers what it was told.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub enabled: BTreeMap<Widget, bool>,
    pub rows: Vec<String>,
    pub selected_row: Option<usize>,
    pub status: Option<(String, StatusColour)>,
    pub open_button: Option<(bool, String)>,
    pub output_index: usize,
    pub brightness: Option<u8>,
    pub patterns: Vec<PatternKind>,
    pub errors: Vec<(String, String)>,
}

impl RecordingView {
    pub fn is_enabled(&self, widget: Widget) -> bool {
        self.enabled.get(&widget).copied().unwrap_or(false)
    }

    pub fn status_colour(&self) -> Option<StatusColour> {
        self.status.as_ref().map(|(_, colour)| *colour)
    }
}

impl View for RecordingView {
    fn set_enabled(&mut self, widget: Widget, enabled: bool) {
        self.enabled.insert(widget, enabled);
    }

    fn set_port_list(&mut self, ports: &[PortDescriptor]) {
        self.rows = ports.iter().map(PortDescriptor::list_label).collect();
    }

    fn select_port_row(&mut self, row: usize) {
        self.selected_row = Some(row);
    }

    fn set_serial_status(&mut self, text: &str, colour: StatusColour) {
        self.status = Some((text.to_string(), colour));
    }

    fn set_open_button(&mut self, checked: bool, label: &str) {
        self.open_button = Some((checked, label.to_string()));
    }

    fn set_output_index(&mut self, index: usize) {
        self.output_index = index;
    }

    fn set_brightness(&mut self, value: u8) {
        self.brightness = Some(value);
    }

    fn mark_pattern(&mut self, kind: PatternKind) {
        self.patterns.push(kind);
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }
}
