use std::fmt;

use serde::Serialize;

/// One serial port as reported by discovery.
///
/// Field order matters: the derived `Ord` sorts by path first, which is the
/// order the port list is shown in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PortDescriptor {
    pub path: String,
    pub name: String,
    pub vendor: String,
    pub product: String,
}

impl PortDescriptor {
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        vendor: impl Into<String>,
        product: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            vendor: vendor.into(),
            product: product.into(),
        }
    }

    /// MCTRL300 units expose a Silicon Labs CP2102 USB bridge.
    pub fn is_likely_controller(&self) -> bool {
        self.product.starts_with("CP2102")
    }

    /// Text used for the row in the port list.
    pub fn list_label(&self) -> String {
        format!(" {}  ({}, {})", self.name, self.vendor, self.product)
    }
}

/// One of the two display outputs of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Output {
    One,
    Two,
}

impl Output {
    /// Maps an output-selector index to an output. Index 0 is "none".
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(Output::One),
            2 => Some(Output::Two),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Output::One => 1,
            Output::Two => 2,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Built-in test signals the controller can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TestPattern {
    Red,
    Blue,
    Green,
    White,
    /// Diagonal lines.
    Slash,
}

/// Pattern controls offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PatternKind {
    Normal,
    Red,
    Green,
    Blue,
    White,
    Slash,
    Freeze,
    Blackout,
}

/// What a pattern control asks of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCommand {
    Deactivate,
    Set(TestPattern),
}

impl PatternKind {
    pub const ALL: [PatternKind; 8] = [
        PatternKind::Normal,
        PatternKind::Red,
        PatternKind::Green,
        PatternKind::Blue,
        PatternKind::White,
        PatternKind::Slash,
        PatternKind::Freeze,
        PatternKind::Blackout,
    ];

    pub fn command(self) -> PatternCommand {
        match self {
            PatternKind::Normal => PatternCommand::Deactivate,
            PatternKind::Red => PatternCommand::Set(TestPattern::Red),
            PatternKind::Green => PatternCommand::Set(TestPattern::Green),
            PatternKind::Blue => PatternCommand::Set(TestPattern::Blue),
            PatternKind::White => PatternCommand::Set(TestPattern::White),
            PatternKind::Slash => PatternCommand::Set(TestPattern::Slash),
            // No device command is known for these two yet; they send RED.
            PatternKind::Freeze | PatternKind::Blackout => PatternCommand::Set(TestPattern::Red),
        }
    }

    /// Freeze and blackout have no working implementation and stay disabled.
    pub fn is_implemented(self) -> bool {
        !matches!(self, PatternKind::Freeze | PatternKind::Blackout)
    }

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Normal => "normal",
            PatternKind::Red => "red",
            PatternKind::Green => "green",
            PatternKind::Blue => "blue",
            PatternKind::White => "white",
            PatternKind::Slash => "slash",
            PatternKind::Freeze => "freeze",
            PatternKind::Blackout => "blackout",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
