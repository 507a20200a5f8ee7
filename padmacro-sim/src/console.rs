use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Receiver;
use padmacro::hid::{Report, ReportOutput};
use padmacro::output::MacroOutput;
use padmacro::types::keycode::HidKeyCode;
use padmacro::types::mouse_button::MouseButton;

/// Capacity of the simulator's report channel
pub const REPORTS: usize = 64;

/// Prints every output call, and forwards it to a [`ReportOutput`] when HID
/// reports are requested.
pub struct ConsoleOutput<'a> {
    /// Simulated time printed in front of every line
    pub now_ms: u64,
    hid: Option<ReportOutput<'a, NoopRawMutex, REPORTS>>,
}

impl<'a> ConsoleOutput<'a> {
    pub fn new(hid: Option<ReportOutput<'a, NoopRawMutex, REPORTS>>) -> Self {
        Self { now_ms: 0, hid }
    }

    fn print(&self, call: std::fmt::Arguments) {
        println!("{:>8} ms  out    {}", self.now_ms, call);
    }

    fn hid(&mut self, f: impl FnOnce(&mut ReportOutput<'a, NoopRawMutex, REPORTS>)) {
        if let Some(hid) = self.hid.as_mut() {
            f(hid);
        }
    }
}

impl MacroOutput for ConsoleOutput<'_> {
    fn press(&mut self, key: HidKeyCode) {
        self.print(format_args!("press {:?}", key));
        self.hid(|hid| hid.press(key));
    }

    fn release(&mut self, key: HidKeyCode) {
        self.print(format_args!("release {:?}", key));
        self.hid(|hid| hid.release(key));
    }

    fn type_char(&mut self, c: char) {
        self.print(format_args!("type {:?}", c));
        self.hid(|hid| hid.type_char(c));
    }

    fn mouse_click(&mut self, button: MouseButton) {
        self.print(format_args!("click {:?}", button));
        self.hid(|hid| hid.mouse_click(button));
    }

    fn mouse_move(&mut self, dx: i16, dy: i16) {
        self.print(format_args!("move {} {}", dx, dy));
        self.hid(|hid| hid.mouse_move(dx, dy));
    }

    fn mouse_scroll(&mut self, amount: i8) {
        self.print(format_args!("scroll {}", amount));
        self.hid(|hid| hid.mouse_scroll(amount));
    }

    fn release_all(&mut self) {
        self.print(format_args!("release all"));
        self.hid(|hid| hid.release_all());
    }
}

/// Print the reports sent since the last call
pub fn print_reports(now_ms: u64, reports: &Receiver<'_, NoopRawMutex, Report, REPORTS>) {
    while let Ok(report) = reports.try_receive() {
        match report {
            Report::KeyboardReport(r) => println!(
                "{:>8} ms  hid    keyboard mod={:#04x} keys={:02x?}",
                now_ms, r.modifier, r.keycodes
            ),
            Report::MouseReport(r) => println!(
                "{:>8} ms  hid    mouse buttons={:#04x} x={} y={} wheel={}",
                now_ms, r.buttons, r.x, r.y, r.wheel
            ),
        }
    }
}
