mod common;

use std::io::{self, Cursor, Write};

use common::Rig;
use mctrl300_control::console::{self, ConsoleView};
use mctrl300_control::{ConnectionState, Controller};

fn session(rig: &Rig, script: &str) -> (String, ConnectionState) {
    let mut controller =
        Controller::new(ConsoleView::new(Vec::new()), rig.collaborators()).unwrap();
    console::run(&mut controller, Cursor::new(script.to_string())).unwrap();
    let state = controller.state();
    let out = controller.into_view().into_inner();
    (String::from_utf8(out).unwrap(), state)
}

#[test]
fn scripted_session_drives_the_screen() {
    let rig = Rig::with_ports(&["/dev/ttyUSB0"]);
    rig.reply(Some(120));

    let (out, _) = session(
        &rig,
        "open\noutput 1\npattern red\nbrightness 90\nstate\nquit\n",
    );

    assert!(out.contains("* 0 ttyUSB0"));
    assert!(out.contains("[ok] Opened ttyUSB0"));
    assert!(out.contains("brightness: 120"));
    assert!(out.contains("pattern: red"));
    assert!(out.contains("brightness: 90"));
    assert!(out.contains("\"ConnectedWithOutput\": \"One\""));
    assert_eq!(rig.calls().len(), 3);
}

#[test]
fn quitting_closes_the_port() {
    let rig = Rig::with_ports(&["/dev/ttyUSB0"]);

    let (_, state) = session(&rig, "open\nquit\n");

    assert_eq!(state, ConnectionState::Disconnected);
    assert_eq!(rig.closed.borrow().len(), 1);
}

#[test]
fn disabled_and_invalid_commands_are_reported() {
    let rig = Rig::with_ports(&["/dev/ttyUSB0"]);

    let (out, state) = session(&rig, "pattern blue\noutput 2\nfly\nopen\noutput 7\n");

    assert!(out.contains("pattern blue is not available while disconnected"));
    assert!(out.contains("output is not available while disconnected"));
    assert!(out.contains("unknown command \"fly\""));
    assert!(out.contains("no such choice"));
    // End of input shuts the console down like `quit`.
    assert_eq!(state, ConnectionState::Disconnected);
}

struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn closed_output_ends_the_session_with_an_error() {
    let rig = Rig::with_ports(&["/dev/ttyUSB0"]);
    let mut controller = Controller::new(ConsoleView::new(ClosedPipe), rig.collaborators()).unwrap();

    let err = console::run(&mut controller, Cursor::new("open\n".to_string())).unwrap_err();

    let io_err = err.downcast_ref::<io::Error>().unwrap();
    assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    assert!(!controller.has_link());
}
