use core::fmt;

/// Line-buffered terminal the monitor talks to.
pub trait Console: fmt::Write {
    /// Prints `prompt` and blocks until a full line has been read into
    /// `buf`. `None` when no line could be read this time.
    fn read_line<'b>(&mut self, prompt: &str, buf: &'b mut [u8]) -> Option<&'b str>;
}
