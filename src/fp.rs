//! Frame-pointer chain walking.
//!
//! Each activation record holds a link to its caller's record. Starting from
//! a frame pointer, [`Frames`] follows those links until it reads the zero
//! sentinel, yielding one [`Frame`] per record.

use core::fmt;

use log::{trace, warn};

use crate::arch::FrameLayout;
use crate::memory::{StackMemory, WORD};

/// Argument words shown per frame unless configured otherwise.
///
/// This is a display heuristic, not the callee's arity: the walker reads this
/// many words above the return address whatever the function takes, so
/// short-argument functions show stale stack contents.
pub const DEFAULT_ARG_WORDS: usize = 10;

/// Upper bound for [`UnwindConfig::arg_words`].
pub const MAX_ARG_WORDS: usize = 16;

/// Frame limit used by [`UnwindConfig::hardened`].
pub const HARDENED_MAX_FRAMES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnwindConfig {
    pub layout: FrameLayout,
    /// Heuristic argument words read per frame, clamped to [`MAX_ARG_WORDS`].
    pub arg_words: usize,
    /// Stop after this many frames. `None` follows the chain until the
    /// sentinel however long it is.
    pub max_frames: Option<usize>,
    /// Require every saved link to point strictly above the current frame.
    /// Catches cycles and most garbage links on downward-growing stacks.
    pub ascending: bool,
}

impl UnwindConfig {
    /// Follows the chain exactly as stored, with no bound.
    pub const fn new() -> Self {
        Self {
            layout: FrameLayout::NATIVE,
            arg_words: DEFAULT_ARG_WORDS,
            max_frames: None,
            ascending: false,
        }
    }

    /// Bounded walk that also refuses links pointing down the stack.
    pub const fn hardened() -> Self {
        Self {
            max_frames: Some(HARDENED_MAX_FRAMES),
            ascending: true,
            ..Self::new()
        }
    }

    fn arg_count(&self) -> usize {
        self.arg_words.min(MAX_ARG_WORDS)
    }
}

impl Default for UnwindConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One activation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub fp: usize,
    pub ra: usize,
    args: [Option<usize>; MAX_ARG_WORDS],
    nargs: usize,
}

impl Frame {
    /// Heuristic argument words, `None` where the word could not be read.
    pub fn args(&self) -> &[Option<usize>] {
        &self.args[..self.nargs]
    }
}

/// Why a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Reached the zero link that terminates the chain.
    Sentinel,
    /// Hit [`UnwindConfig::max_frames`].
    FrameLimit(usize),
    /// The frame at this address could not be read.
    Unreadable(usize),
    /// A link did not point above the frame holding it.
    NotAscending { from: usize, to: usize },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Sentinel => write!(f, "end of frame chain"),
            StopReason::FrameLimit(n) => write!(f, "backtrace truncated after {} frames", n),
            StopReason::Unreadable(addr) => write!(f, "unreadable frame at {:08x}", addr),
            StopReason::NotAscending { from, to } => {
                write!(f, "frame chain broken: {:08x} links to {:08x}", from, to)
            }
        }
    }
}

pub struct FramePointerWalker<M> {
    memory: M,
    config: UnwindConfig,
}

impl<M: StackMemory> FramePointerWalker<M> {
    pub fn new(memory: M, config: UnwindConfig) -> Self {
        Self { memory, config }
    }

    /// Walks the chain starting at `fp`.
    pub fn walk(&self, fp: usize) -> Frames<'_, M> {
        trace!("walk from fp {:#x}", fp);
        Frames {
            fp,
            depth: 0,
            stop: None,
            memory: &self.memory,
            config: &self.config,
        }
    }
}

/// Lazy iterator over the frames of one walk. Not restartable.
pub struct Frames<'a, M> {
    fp: usize,
    depth: usize,
    stop: Option<StopReason>,
    memory: &'a M,
    config: &'a UnwindConfig,
}

impl<M: StackMemory> Frames<'_, M> {
    /// Why the walk ended, once it has.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    fn slot(&self, slot: isize) -> Option<usize> {
        let off = slot.checked_mul(WORD as isize)?;
        self.fp.checked_add_signed(off)
    }

    fn read_slot(&self, slot: isize) -> Option<usize> {
        self.memory.read_word(self.slot(slot)?)
    }

    fn finish(&mut self, reason: StopReason) -> Option<Frame> {
        if reason != StopReason::Sentinel {
            warn!("backtrace stopped: {}", reason);
        }
        self.stop = Some(reason);
        None
    }
}

impl<M: StackMemory> Iterator for Frames<'_, M> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop.is_some() {
            return None;
        }
        if self.fp == 0 {
            return self.finish(StopReason::Sentinel);
        }
        if let Some(max) = self.config.max_frames {
            if self.depth >= max {
                return self.finish(StopReason::FrameLimit(max));
            }
        }

        let layout = self.config.layout;
        let (ra, next_fp) = match (
            self.read_slot(layout.ra_slot),
            self.read_slot(layout.fp_slot),
        ) {
            (Some(ra), Some(next_fp)) => (ra, next_fp),
            _ => return self.finish(StopReason::Unreadable(self.fp)),
        };

        let mut args = [None; MAX_ARG_WORDS];
        let nargs = self.config.arg_count();
        for (i, arg) in args.iter_mut().take(nargs).enumerate() {
            *arg = layout
                .args_slot
                .checked_add(i as isize)
                .and_then(|slot| self.read_slot(slot));
        }

        let frame = Frame {
            fp: self.fp,
            ra,
            args,
            nargs,
        };
        trace!("frame {}: fp {:#x} ra {:#x} next {:#x}", self.depth, self.fp, ra, next_fp);

        if self.config.ascending && next_fp != 0 && next_fp <= self.fp {
            let reason = StopReason::NotAscending {
                from: self.fp,
                to: next_fp,
            };
            warn!("backtrace stopped: {}", reason);
            self.stop = Some(reason);
        }
        self.fp = next_fp;
        self.depth += 1;
        Some(frame)
    }
}
