use std::fmt;

use serde::Serialize;

use crate::model::{Output, PatternKind};
use crate::view::Widget;

/// Coarse connection state that gates what the operator can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    /// No serial port open.
    Disconnected,
    /// Serial port open, no output selected.
    Connected,
    /// Serial port open and an output selected.
    ConnectedWithOutput(Output),
}

impl ConnectionState {
    /// Legacy 1..=3 numbering, used in logs.
    pub fn level(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 1,
            ConnectionState::Connected => 2,
            ConnectionState::ConnectedWithOutput(_) => 3,
        }
    }

    pub fn output(self) -> Option<Output> {
        match self {
            ConnectionState::ConnectedWithOutput(output) => Some(output),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connected => f.write_str("connected"),
            ConnectionState::ConnectedWithOutput(output) => {
                write!(f, "connected, output {output}")
            }
        }
    }
}

/// Next state for a requested transition.
///
/// A request for `Connected` is upgraded when an output is already selected,
/// so reopening a port never shows "connected, no output" for a chosen output.
pub fn advance(requested: ConnectionState, selected: Option<Output>) -> ConnectionState {
    match (requested, selected) {
        (ConnectionState::Connected, Some(output)) => ConnectionState::ConnectedWithOutput(output),
        _ => requested,
    }
}

/// Which widget groups accept input. Always derived from a state as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Enablement {
    pub output_selector: bool,
    pub pattern_menu: bool,
    pub brightness_slider: bool,
    pub pattern_buttons: bool,
}

impl Enablement {
    pub fn for_state(state: ConnectionState) -> Self {
        let connected = state.level() >= 2;
        let with_output = state.level() >= 3;
        Self {
            output_selector: connected,
            pattern_menu: with_output,
            brightness_slider: with_output,
            pattern_buttons: with_output,
        }
    }

    pub fn pattern_enabled(&self, kind: PatternKind) -> bool {
        self.pattern_buttons && kind.is_implemented()
    }

    /// `None` for widgets whose enablement does not follow the state.
    pub fn widget(&self, widget: Widget) -> Option<bool> {
        match widget {
            Widget::OutputSelector => Some(self.output_selector),
            Widget::PatternMenu => Some(self.pattern_menu),
            Widget::BrightnessSlider => Some(self.brightness_slider),
            Widget::PatternButton(kind) => Some(self.pattern_enabled(kind)),
            Widget::OpenButton => None,
        }
    }

    /// Every state-driven widget with its flag, in a fixed order.
    pub fn widgets(&self) -> Vec<(Widget, bool)> {
        let mut all = vec![
            (Widget::OutputSelector, self.output_selector),
            (Widget::PatternMenu, self.pattern_menu),
            (Widget::BrightnessSlider, self.brightness_slider),
        ];
        all.extend(
            PatternKind::ALL
                .into_iter()
                .map(|kind| (Widget::PatternButton(kind), self.pattern_enabled(kind))),
        );
        all
    }
}
