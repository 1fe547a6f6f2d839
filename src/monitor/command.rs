//! The monitor's commands and the table they are looked up in.

use core::fmt;

use log::warn;

use super::tokenizer::Args;
use super::Context;
use crate::arch;
use crate::backtrace::print_backtrace;

/// Handler return code that ends the monitor session. Any negative code does.
pub const EXIT_SENTINEL: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    KernInfo,
    Backtrace,
    Banner,
    /// Leaves the monitor. Not part of the kernel table.
    Exit,
}

impl Command {
    /// Runs the command and returns its code.
    pub fn run<T: ?Sized>(self, _args: &Args<'_>, _tf: Option<&T>, cx: &mut Context<'_>) -> i32 {
        let result = match self {
            Command::Help => help(cx),
            Command::KernInfo => kerninfo(cx),
            Command::Backtrace => backtrace(cx),
            Command::Banner => banner(cx),
            Command::Exit => return EXIT_SENTINEL,
        };
        if result.is_err() {
            warn!("{:?}: console write failed", self);
        }
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub name: &'static str,
    pub desc: &'static str,
    pub command: Command,
}

pub const HELP: CommandEntry = CommandEntry {
    name: "help",
    desc: "Display this list of commands",
    command: Command::Help,
};

pub const KERNINFO: CommandEntry = CommandEntry {
    name: "kerninfo",
    desc: "Display information about the kernel",
    command: Command::KernInfo,
};

pub const BACKTRACE: CommandEntry = CommandEntry {
    name: "backtrace",
    desc: "Display backtrace of current kernel stack",
    command: Command::Backtrace,
};

pub const BANNER: CommandEntry = CommandEntry {
    name: "banner",
    desc: "Display the boot banner",
    command: Command::Banner,
};

pub static KERNEL_COMMANDS: [CommandEntry; 4] = [HELP, KERNINFO, BACKTRACE, BANNER];

pub const EXIT: CommandEntry = CommandEntry {
    name: "exit",
    desc: "Leave the monitor and resume the interrupted context",
    command: Command::Exit,
};

/// Fixed set of commands, in the order `help` lists them.
#[derive(Debug, Clone, Copy)]
pub struct Registry<'a> {
    entries: &'a [CommandEntry],
}

impl<'a> Registry<'a> {
    pub const fn new(entries: &'a [CommandEntry]) -> Self {
        Self { entries }
    }

    /// First entry named `name`.
    pub fn lookup(&self, name: &str) -> Option<&'a CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn list(&self) -> &'a [CommandEntry] {
        self.entries
    }
}

impl Registry<'static> {
    pub fn kernel() -> Self {
        Self::new(&KERNEL_COMMANDS)
    }
}

fn help(cx: &mut Context<'_>) -> fmt::Result {
    for entry in cx.registry.list() {
        writeln!(cx.out, "{} - {}", entry.name, entry.desc)?;
    }
    Ok(())
}

fn kerninfo(cx: &mut Context<'_>) -> fmt::Result {
    let layout = cx.layout;
    writeln!(cx.out, "Special kernel symbols:")?;
    writeln!(cx.out, "  _start                  {:08x} (phys)", layout.start)?;
    for (name, addr) in [
        ("entry", layout.entry),
        ("etext", layout.etext),
        ("edata", layout.edata),
        ("end", layout.end),
    ] {
        writeln!(
            cx.out,
            "  {:<5}  {:08x} (virt)  {:08x} (phys)",
            name,
            addr,
            layout.phys(addr)
        )?;
    }
    writeln!(
        cx.out,
        "Kernel executable memory footprint: {}KB",
        layout.footprint_kb()
    )
}

// Own frame so the walk starts from a live activation record.
#[inline(never)]
fn backtrace(cx: &mut Context<'_>) -> fmt::Result {
    let fp = match cx.stack.frame_pointer() {
        Some(fp) => fp,
        None => arch::fp(),
    };
    print_backtrace(&mut *cx.out, cx.stack, cx.resolver, fp, &cx.config.unwind).map(|_| ())
}

const BANNER_ART: [(u8, &str); 15] = [
    (30, "                 "),
    (30, "    @@@    _  ,-."),
    (31, "   @@@@@  (,-/)  )"),
    (31, "    @@@  {        }"),
    (35, "     | o-' 9       ;"),
    (35, "     |  \\         /     BOOM"),
    (34, "     |   `-.     (        TEDDY"),
    (33, "     |  ,'/  ,--.;          BOOM"),
    (33, " ,-. _,','  /   ||"),
    (32, " |  (  / _,'    /|"),
    (39, " >-. `( (    _,' |"),
    (37, " |  \\_.--`~~' `.  )"),
    (37, " |             ;-'"),
    (36, " `.__,.      ,'"),
    (36, "      `----'"),
];

fn banner(cx: &mut Context<'_>) -> fmt::Result {
    for (color, line) in BANNER_ART {
        if cx.config.ansi {
            write!(cx.out, "\x1b[0;{}m", color)?;
        }
        writeln!(cx.out, "{}", line)?;
    }
    if cx.config.ansi {
        write!(cx.out, "\x1b[0;37m")?;
    }
    Ok(())
}
