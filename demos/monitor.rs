//! Runs the monitor on the host terminal.
//!
//! `cargo run --example monitor`, then try `help` or `backtrace`; `exit` or
//! end of input leaves.

use std::fmt;
use std::io::{self, BufRead, Write as _};

use kmonitor::logging::{self, ConsoleLogger};
use kmonitor::monitor::{CommandEntry, BACKTRACE, BANNER, EXIT, HELP, KERNINFO};
use kmonitor::{
    Config, Console, KernelStack, Monitor, NoSymbols, Registry, HARDENED_MAX_FRAMES,
};

static COMMANDS: [CommandEntry; 5] = [HELP, KERNINFO, BACKTRACE, BANNER, EXIT];

/// Reach of the live walk on either side of `main`'s frame.
const STACK_WINDOW: usize = 16 * 1024;

static LOGGER: ConsoleLogger = ConsoleLogger::new(print_log);

fn print_log(args: fmt::Arguments) {
    eprint!("{}", args);
}

struct Terminal {
    stdin: io::StdinLock<'static>,
    stdout: io::Stdout,
}

impl fmt::Write for Terminal {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.stdout.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl Console for Terminal {
    fn read_line<'b>(&mut self, prompt: &str, buf: &'b mut [u8]) -> Option<&'b str> {
        print!("{}", prompt);
        self.stdout.flush().ok()?;

        let mut line = String::new();
        match self.stdin.read_line(&mut line) {
            Ok(0) => std::process::exit(0),
            Ok(_) => {}
            Err(_) => return None,
        }
        let mut len = line.len().min(buf.len());
        while !line.is_char_boundary(len) {
            len -= 1;
        }
        buf[..len].copy_from_slice(&line.as_bytes()[..len]);
        std::str::from_utf8(&buf[..len]).ok()
    }
}

fn main() {
    if let Err(err) = logging::init(&LOGGER, logging::level_from_env()) {
        eprintln!("logger: {}", err);
    }

    // Monitor frames sit below `main`, its callers above; both within a few
    // pages of here.
    let marker = 0usize;
    let here = (&marker as *const usize as usize) & !0xfff;
    let stack = unsafe {
        KernelStack::with_bounds(here.saturating_sub(STACK_WINDOW)..here + STACK_WINDOW)
    };

    let mut config = Config::from_env();
    config.unwind.ascending = true;
    config.unwind.max_frames.get_or_insert(HARDENED_MAX_FRAMES);
    let monitor = Monitor::new(Registry::new(&COMMANDS), NoSymbols, stack).with_config(config);

    let mut terminal = Terminal {
        stdin: io::stdin().lock(),
        stdout: io::stdout(),
    };
    monitor.run(&mut terminal, None::<&()>);
}
