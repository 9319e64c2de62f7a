//! # Serial Console
//!
//! Byte-oriented diagnostic output on COM1 through a 16550 UART.
//!
//! ## Attributes
//!
//! | Attr        | Prefix       | Used for                      |
//! |-------------|--------------|-------------------------------|
//! | `Plain`     | none         | output on behalf of user code |
//! | `Bold`      | `ESC[1m`     | fatal diagnostics, panics     |
//! | `Highlight` | `ESC[36m`    | ordinary kernel messages      |
//!
//! Every `print` is followed by `ESC[0m`. Text is treated as a C string: output
//! stops at the first NUL byte.
//!
//! The UART busy-waits while its transmit FIFO is full, so printing from a
//! latency-bound handler is a bad idea.

use core::fmt;

use spin::Mutex;
use uart_16550::SerialPort;

pub const COM1_PORT: u16 = 0x3F8;

const CONSOLE_BOLD: &str = "\x1b[1m";
const CONSOLE_CYAN: &str = "\x1b[36m";
const CONSOLE_NORMAL: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    Plain,
    Bold,
    Highlight,
}

impl Attr {
    fn prefix(self) -> &'static str {
        match self {
            Attr::Plain => "",
            Attr::Bold => CONSOLE_BOLD,
            Attr::Highlight => CONSOLE_CYAN,
        }
    }
}

/// Something that accepts console bytes one at a time.
pub trait ConsoleSink {
    fn putch(&mut self, byte: u8);
}

impl ConsoleSink for SerialPort {
    fn putch(&mut self, byte: u8) {
        self.send(byte);
    }
}

pub struct Console<S> {
    sink: S,
}

impl<S: ConsoleSink> Console<S> {
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Print `text` wrapped in the escape sequences for `attr`.
    pub fn print(&mut self, attr: Attr, text: &str) {
        self.put_str(attr.prefix());
        self.put_str(text);
        self.put_str(CONSOLE_NORMAL);
    }

    fn put_str(&mut self, s: &str) {
        for &b in s.as_bytes().iter().take_while(|&&b| b != 0) {
            self.sink.putch(b);
        }
    }
}

impl<S: ConsoleSink> fmt::Write for Console<S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_str(s);
        Ok(())
    }
}

pub static CONSOLE: Mutex<Console<SerialPort>> =
    Mutex::new(Console::new(unsafe { SerialPort::new(COM1_PORT) }));

/// Program the UART. Must run before the first print on real hardware.
pub fn init() {
    CONSOLE.lock().sink_mut().init();
}

/// Print through the global console with interrupts held off, so a handler
/// cannot deadlock on the console lock held by the code it interrupted.
pub fn print(attr: Attr, text: &str) {
    x86_64::instructions::interrupts::without_interrupts(|| {
        CONSOLE.lock().print(attr, text);
    });
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    use core::fmt::Write;
    x86_64::instructions::interrupts::without_interrupts(|| {
        let mut console = CONSOLE.lock();
        console.put_str(CONSOLE_CYAN);
        let _ = console.write_fmt(args);
        console.put_str(CONSOLE_NORMAL);
    });
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::hal::console::_print(core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => {
        $crate::hal::console::_print(core::format_args!("{}\n", core::format_args!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    impl ConsoleSink for Vec<u8> {
        fn putch(&mut self, byte: u8) {
            self.push(byte);
        }
    }

    fn rendered(console: &Console<Vec<u8>>) -> &str {
        core::str::from_utf8(console.sink()).unwrap()
    }

    #[test]
    fn test_plain_has_no_prefix() {
        let mut console = Console::new(Vec::new());
        console.print(Attr::Plain, "hello");
        assert_eq!(rendered(&console), "hello\x1b[0m");
    }

    #[test]
    fn test_bold_and_highlight_prefixes() {
        let mut console = Console::new(Vec::new());
        console.print(Attr::Bold, "fatal");
        console.print(Attr::Highlight, "info");
        assert_eq!(rendered(&console), "\x1b[1mfatal\x1b[0m\x1b[36minfo\x1b[0m");
    }

    #[test]
    fn test_output_stops_at_nul() {
        let mut console = Console::new(Vec::new());
        console.print(Attr::Plain, "abc\0def");
        assert_eq!(rendered(&console), "abc\x1b[0m");
    }

    #[test]
    fn test_fmt_write() {
        let mut console = Console::new(Vec::new());
        write!(console, "vector {}", 0x80).unwrap();
        assert_eq!(rendered(&console), "vector 128");
    }
}
