//! The interactive command loop.

mod command;
mod tokenizer;

pub use command::{
    Command, CommandEntry, Registry, BACKTRACE, BANNER, EXIT, EXIT_SENTINEL, HELP,
    KERNEL_COMMANDS, KERNINFO,
};
pub use tokenizer::{tokenize, Args, TokenizeError, MAX_ARGS, WHITESPACE};

use core::fmt::{self, Write};

use log::{debug, warn};

use crate::config::Config;
use crate::console::Console;
use crate::layout::KernelLayout;
use crate::memory::StackMemory;
use crate::symbol::SymbolResolver;

/// Size of the line buffer, one VGA text line.
pub const CMDBUF_SIZE: usize = 80;

/// What the monitor does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Continue,
    Terminate,
}

impl Status {
    /// Negative handler codes terminate, everything else continues.
    pub fn from_code(code: i32) -> Self {
        if code < 0 {
            Status::Terminate
        } else {
            Status::Continue
        }
    }
}

/// A line that could not be turned into a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError<'l> {
    Tokenize(TokenizeError),
    UnknownCommand(&'l str),
}

impl From<TokenizeError> for DispatchError<'_> {
    fn from(err: TokenizeError) -> Self {
        DispatchError::Tokenize(err)
    }
}

impl fmt::Display for DispatchError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Tokenize(err) => fmt::Display::fmt(err, f),
            DispatchError::UnknownCommand(name) => write!(f, "Unknown command '{}'", name),
        }
    }
}

/// Everything a command handler may use.
pub struct Context<'a> {
    pub out: &'a mut dyn Write,
    pub registry: &'a Registry<'a>,
    pub resolver: &'a dyn SymbolResolver,
    pub stack: &'a dyn StackMemory,
    pub layout: &'a KernelLayout,
    pub config: &'a Config,
}

pub struct Monitor<'r, R, M> {
    registry: Registry<'r>,
    resolver: R,
    stack: M,
    layout: KernelLayout,
    config: Config,
}

impl<'r, R: SymbolResolver, M: StackMemory> Monitor<'r, R, M> {
    pub fn new(registry: Registry<'r>, resolver: R, stack: M) -> Self {
        Self {
            registry,
            resolver,
            stack,
            layout: KernelLayout::default(),
            config: Config::default(),
        }
    }

    pub fn with_layout(mut self, layout: KernelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn parse<'l>(
        &self,
        line: &'l str,
    ) -> Result<Option<(&'r CommandEntry, Args<'l>)>, DispatchError<'l>> {
        let args = tokenize(line)?;
        let name = match args.command() {
            Some(name) => name,
            None => return Ok(None),
        };
        let entry = self
            .registry
            .lookup(name)
            .ok_or(DispatchError::UnknownCommand(name))?;
        Ok(Some((entry, args)))
    }

    /// Runs one command line. `tf` is handed to the command untouched.
    pub fn dispatch<W: Write, T: ?Sized>(&self, line: &str, out: &mut W, tf: Option<&T>) -> Status {
        let (entry, args) = match self.parse(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return Status::Continue,
            Err(err) => {
                debug!("rejected line: {:?}", err);
                if writeln!(out, "{}", err).is_err() {
                    warn!("console write failed");
                }
                return Status::Continue;
            }
        };

        debug!("running '{}' with {} args", entry.name, args.len());
        let mut cx = Context {
            out,
            registry: &self.registry,
            resolver: &self.resolver,
            stack: &self.stack,
            layout: &self.layout,
            config: &self.config,
        };
        Status::from_code(entry.command.run(&args, tf, &mut cx))
    }

    /// Reads and runs lines from `console` until a command terminates the
    /// session.
    pub fn run<C: Console, T: ?Sized>(&self, console: &mut C, tf: Option<&T>) {
        writeln!(console, "Welcome to the kernel monitor!").ok();
        writeln!(console, "Type 'help' for a list of commands.").ok();

        let mut buf = [0u8; CMDBUF_SIZE];
        loop {
            let line = match console.read_line(self.config.prompt, &mut buf) {
                Some(line) => line,
                None => continue,
            };
            if self.dispatch(line, console, tf) == Status::Terminate {
                debug!("leaving monitor");
                break;
            }
        }
    }
}
