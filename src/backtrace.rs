//! Printing a walk of the frame chain.

use core::fmt::{self, Write};

use crate::fp::{Frame, FramePointerWalker, StopReason, UnwindConfig};
use crate::memory::StackMemory;
use crate::symbol::SymbolResolver;

/// Prints every frame reachable from `fp`, innermost first, and returns how
/// many were printed.
///
/// Each frame gets a summary line and a symbol line:
///
/// ```text
///   ebp f010ff18  eip f01000a5  args 00000000 00000001 ...
///          kern/init.c:24: test_backtrace+101
/// ```
pub fn print_backtrace<W, M, R>(
    out: &mut W,
    stack: &M,
    resolver: &R,
    fp: usize,
    config: &UnwindConfig,
) -> Result<usize, fmt::Error>
where
    W: Write + ?Sized,
    M: StackMemory + ?Sized,
    R: SymbolResolver + ?Sized,
{
    writeln!(out, "Stack backtrace:")?;

    let walker = FramePointerWalker::new(stack, *config);
    let mut frames = walker.walk(fp);
    let mut count = 0;
    for frame in frames.by_ref() {
        print_frame(out, &frame)?;
        print_symbol(out, resolver, frame.ra)?;
        count += 1;
    }

    match frames.stop_reason() {
        Some(StopReason::Sentinel) | None => {}
        Some(reason) => writeln!(out, "  ... {}", reason)?,
    }
    Ok(count)
}

fn print_frame<W: Write + ?Sized>(out: &mut W, frame: &Frame) -> fmt::Result {
    write!(out, "  ebp {:08x}  eip {:08x}  args", frame.fp, frame.ra)?;
    for arg in frame.args() {
        match arg {
            Some(word) => write!(out, " {:08x}", word)?,
            None => write!(out, " --------")?,
        }
    }
    writeln!(out)
}

fn print_symbol<W, R>(out: &mut W, resolver: &R, ra: usize) -> fmt::Result
where
    W: Write + ?Sized,
    R: SymbolResolver + ?Sized,
{
    match resolver.resolve(ra) {
        Some(info) => writeln!(
            out,
            "         {}:{}: {}+{}",
            info.file,
            info.line,
            info.name(),
            info.offset(ra)
        ),
        None => writeln!(out, "         <unknown>: no debug info"),
    }
}
