//! Splitting a command line into arguments.

use core::fmt;

pub const WHITESPACE: &[u8] = b"\t\r\n ";

/// Size of the argument vector. One slot is kept free, so a line may hold at
/// most `MAX_ARGS - 1` arguments.
pub const MAX_ARGS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeError {
    TooManyArgs { max: usize },
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::TooManyArgs { max } => write!(f, "Too many arguments (max {})", max),
        }
    }
}

/// Arguments of one command line, borrowed from the line buffer.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    argv: [&'a str; MAX_ARGS],
    argc: usize,
}

impl<'a> Args<'a> {
    pub fn len(&self) -> usize {
        self.argc
    }

    pub fn is_empty(&self) -> bool {
        self.argc == 0
    }

    pub fn get(&self, idx: usize) -> Option<&'a str> {
        self.as_slice().get(idx).copied()
    }

    /// The command name.
    pub fn command(&self) -> Option<&'a str> {
        self.get(0)
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.argv[..self.argc]
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.as_slice().iter().copied()
    }
}

fn is_space(b: u8) -> bool {
    WHITESPACE.contains(&b)
}

/// Splits `line` on [`WHITESPACE`] in one forward pass.
pub fn tokenize(line: &str) -> Result<Args<'_>, TokenizeError> {
    let bytes = line.as_bytes();
    let mut args = Args {
        argv: [""; MAX_ARGS],
        argc: 0,
    };
    let mut pos = 0;
    loop {
        while pos < bytes.len() && is_space(bytes[pos]) {
            pos += 1;
        }
        if pos == bytes.len() {
            break;
        }

        if args.argc == MAX_ARGS - 1 {
            return Err(TokenizeError::TooManyArgs { max: MAX_ARGS });
        }
        let start = pos;
        while pos < bytes.len() && !is_space(bytes[pos]) {
            pos += 1;
        }
        // split points are ASCII, so both ends are char boundaries
        args.argv[args.argc] = &line[start..pos];
        args.argc += 1;
    }
    Ok(args)
}
