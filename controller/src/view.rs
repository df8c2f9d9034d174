use serde::Serialize;

use crate::model::{PatternKind, PortDescriptor};

/// Named handles for the controls a front end exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Widget {
    OpenButton,
    OutputSelector,
    PatternMenu,
    BrightnessSlider,
    PatternButton(PatternKind),
}

/// Background colour of the serial status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusColour {
    Green,
    Orange,
    Red,
}

/// Surface the controller draws on.
///
/// The controller owns all model state; a view only renders what it is told.
pub trait View {
    fn set_enabled(&mut self, widget: Widget, enabled: bool);

    /// Replaces the port list. Rows follow the order of `ports`.
    fn set_port_list(&mut self, ports: &[PortDescriptor]);

    fn select_port_row(&mut self, row: usize);

    fn set_serial_status(&mut self, text: &str, colour: StatusColour);

    fn set_open_button(&mut self, checked: bool, label: &str);

    fn set_output_index(&mut self, index: usize);

    fn set_brightness(&mut self, value: u8);

    fn mark_pattern(&mut self, kind: PatternKind);

    /// Blocking error notification.
    fn show_error(&mut self, title: &str, message: &str);
}
