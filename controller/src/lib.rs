//! Operator console for Novastar MCTRL300 LED-wall controllers.
//!
//! Discovers serial ports, opens a link to the controller and forwards output
//! selection, test patterns and brightness to a [`driver::ScreenDriver`].

pub mod config;
pub mod console;
pub mod controller;
pub mod discover;
pub mod driver;
pub mod link;
pub mod logging;
pub mod model;
pub mod state;
pub mod view;

pub use controller::{Collaborators, Controller, Event, Handled, Snapshot};
pub use model::{Output, PatternKind, PortDescriptor, TestPattern};
pub use state::{ConnectionState, Enablement, advance};
