//! Formatting into fixed-size buffers.
//!
//! The dispatch path cannot allocate, so diagnostics are rendered into a
//! stack buffer. Output that does not fit is cut at the last whole character
//! and the buffer is marked truncated.

use core::fmt::{self, Write};

pub struct FmtBuf<'a> {
    buf: &'a mut [u8],
    pos: usize,
    truncated: bool,
}

impl<'a> FmtBuf<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        FmtBuf {
            buf,
            pos: 0,
            truncated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        // Safety: only whole UTF-8 sequences are ever copied in by `write_str`
        unsafe { core::str::from_utf8_unchecked(&self.buf[..self.pos]) }
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<'a> Write for FmtBuf<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.pos;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.pos..self.pos + take].copy_from_slice(&s.as_bytes()[..take]);
        self.pos += take;
        if take < s.len() {
            self.truncated = true;
        }
        Ok(())
    }
}

/// Render `args` into `buf`, returning the (possibly truncated) text.
pub fn format_to<'a>(buf: &'a mut [u8], args: fmt::Arguments<'_>) -> &'a str {
    let mut f = FmtBuf::new(&mut *buf);
    let _ = f.write_fmt(args);
    let len = f.pos;
    // Safety: see `FmtBuf::as_str`
    unsafe { core::str::from_utf8_unchecked(&buf[..len]) }
}

#[macro_export]
macro_rules! format_no_std {
    ($buf:expr, $($arg:tt)*) => {
        $crate::format::format_to($buf, core::format_args!($($arg)*))
    };
}
