//! Line-oriented front end.
//!
//! Each input line is parsed into a [`Command`]; commands that act on the
//! device become an [`Event`] for the controller.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::num::ParseIntError;
use std::str::FromStr;

use anyhow::Result;
use log::info;
use thiserror::Error;

use crate::controller::{Controller, Event, Handled};
use crate::model::{PatternKind, PortDescriptor};
use crate::view::{StatusColour, View, Widget};

pub const PROMPT: &str = "mctrl300> ";

pub const HELP: &str = "\
commands:
  ports                 rescan serial ports
  select <row>          choose a row of the port list
  open                  open the selected port
  close                 close the open port
  output <0|1|2>        select output (0 = none)
  pattern <name>        normal, red, green, blue, white, slash, freeze, blackout
  brightness <0-255>    set brightness of the selected output
  state                 print the controller state as JSON
  help                  this text
  quit                  exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    State,
    Device(Event),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid number {arg:?}: {source}")]
    InvalidNumber {
        arg: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unknown pattern {0:?}")]
    UnknownPattern(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();

        let command = match verb.to_ascii_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "state" => Command::State,
            "ports" | "refresh" => Command::Device(Event::RefreshPorts),
            "open" => Command::Device(Event::OpenPort),
            "close" => Command::Device(Event::ClosePort),
            "select" => Command::Device(Event::SelectPort(number(arg, "select")?)),
            "output" => Command::Device(Event::SelectOutput(number(arg, "output")?)),
            "brightness" => Command::Device(Event::MoveBrightness(number(arg, "brightness")?)),
            "pattern" => {
                let name = arg.ok_or(CommandError::MissingArgument("pattern"))?;
                let kind = PatternKind::from_name(name)
                    .ok_or_else(|| CommandError::UnknownPattern(name.to_string()))?;
                Command::Device(Event::SetPattern(kind))
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn number<T>(arg: Option<&str>, verb: &'static str) -> Result<T, CommandError>
where
    T: FromStr<Err = ParseIntError>,
{
    let arg = arg.ok_or(CommandError::MissingArgument(verb))?;
    arg.parse().map_err(|source| CommandError::InvalidNumber {
        arg: arg.to_string(),
        source,
    })
}

/// Renders controller output as text lines on `out`.
///
/// [`View`] calls cannot fail, so the first write error is kept until
/// [`ConsoleView::take_error`] collects it.
pub struct ConsoleView<W: Write> {
    out: W,
    enabled: BTreeMap<Widget, bool>,
    output_index: usize,
    failed: Option<io::Error>,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            enabled: BTreeMap::new(),
            output_index: 0,
            failed: None,
        }
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Returns the write error a view update ran into, if any.
    pub fn take_error(&mut self) -> io::Result<()> {
        match self.failed.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_enabled(&self, widget: Widget) -> bool {
        self.enabled.get(&widget).copied().unwrap_or(false)
    }

    /// Comma-separated list of the controls that currently accept input.
    pub fn controls_line(&self) -> String {
        let names: Vec<String> = self
            .enabled
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(widget, _)| widget_name(*widget))
            .collect();
        if names.is_empty() {
            "controls: none".to_string()
        } else {
            format!("controls: {}", names.join(", "))
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{PROMPT}")?;
        self.out.flush()
    }

    fn emit(&mut self, text: &str) {
        if self.failed.is_some() {
            return;
        }
        if let Err(e) = self.line(text) {
            self.failed = Some(e);
        }
    }
}

fn widget_name(widget: Widget) -> String {
    match widget {
        Widget::OpenButton => "open".into(),
        Widget::OutputSelector => "output".into(),
        Widget::PatternMenu => "pattern menu".into(),
        Widget::BrightnessSlider => "brightness".into(),
        Widget::PatternButton(kind) => format!("pattern {kind}"),
    }
}

impl<W: Write> View for ConsoleView<W> {
    fn set_enabled(&mut self, widget: Widget, enabled: bool) {
        self.enabled.insert(widget, enabled);
    }

    fn set_port_list(&mut self, ports: &[PortDescriptor]) {
        if ports.is_empty() {
            self.emit("ports: none");
            return;
        }
        self.emit("ports:");
        for (row, port) in ports.iter().enumerate() {
            // `*` marks the bridge chip MCTRL300 units use.
            let mark = if port.is_likely_controller() { '*' } else { ' ' };
            self.emit(&format!("{mark}{row:>2}{}", port.list_label()));
        }
    }

    fn select_port_row(&mut self, row: usize) {
        self.emit(&format!("selected row {row}"));
    }

    fn set_serial_status(&mut self, text: &str, colour: StatusColour) {
        let tag = match colour {
            StatusColour::Green => "ok",
            StatusColour::Orange => "--",
            StatusColour::Red => "!!",
        };
        self.emit(&format!("[{tag}] {text}"));
    }

    fn set_open_button(&mut self, _checked: bool, label: &str) {
        self.emit(&format!("({label})"));
    }

    fn set_output_index(&mut self, index: usize) {
        if index != self.output_index {
            self.output_index = index;
            match index {
                0 => self.emit("output: none"),
                n => self.emit(&format!("output: {n}")),
            }
        }
    }

    fn set_brightness(&mut self, value: u8) {
        self.emit(&format!("brightness: {value}"));
    }

    fn mark_pattern(&mut self, kind: PatternKind) {
        self.emit(&format!("pattern: {kind}"));
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.emit(&format!("ERROR {title}: {message}"));
    }
}

/// Reads commands from `input` until `quit` or end of input.
///
/// A failed write to the console output ends the loop with that error.
pub fn run<W: Write, R: BufRead>(controller: &mut Controller<ConsoleView<W>>, input: R) -> Result<()> {
    let view = controller.view_mut();
    view.take_error()?;
    view.line(HELP)?;
    let controls = view.controls_line();
    view.line(&controls)?;
    view.prompt()?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            controller.view_mut().prompt()?;
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => controller.view_mut().line(HELP)?,
            Ok(Command::State) => {
                let json = serde_json::to_string_pretty(&controller.snapshot())?;
                controller.view_mut().line(&json)?;
            }
            Ok(Command::Device(event)) => {
                let state = controller.state();
                let outcome = controller.handle(event)?;
                let view = controller.view_mut();
                view.take_error()?;
                match outcome {
                    Handled::Applied => {}
                    Handled::Disabled(widget) => view.line(&format!(
                        "{} is not available while {state}",
                        widget_name(widget)
                    ))?,
                    Handled::OutOfRange => view.line("no such choice")?,
                }
                let controls = view.controls_line();
                view.line(&controls)?;
            }
            Err(e) => controller.view_mut().line(&e.to_string())?,
        }
        controller.view_mut().prompt()?;
    }

    info!("console closed");
    controller.shutdown();
    Ok(())
}
