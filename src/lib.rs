//! Kernel monitor: a small command shell for inspecting a running kernel,
//! with a frame-pointer stack unwinder behind its `backtrace` command.
#![cfg_attr(not(test), no_std)]

pub mod arch;
mod backtrace;
mod config;
mod console;
mod fp;
mod layout;
pub mod logging;
mod memory;
pub mod monitor;
mod symbol;

pub use arch::FrameLayout;
pub use backtrace::print_backtrace;
pub use config::{Config, DEFAULT_PROMPT};
pub use console::Console;
pub use fp::{
    Frame, FramePointerWalker, Frames, StopReason, UnwindConfig, DEFAULT_ARG_WORDS,
    HARDENED_MAX_FRAMES, MAX_ARG_WORDS,
};
pub use layout::{KernelLayout, KERNBASE};
pub use memory::{KernelStack, StackImage, StackMemory, WORD};
pub use monitor::{Command, CommandEntry, Monitor, Registry, Status, EXIT_SENTINEL};
pub use symbol::{DebugInfo, LineEntry, NoSymbols, Symbol, SymbolResolver, SymbolTable};
