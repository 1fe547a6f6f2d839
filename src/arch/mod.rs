//! Frame-pointer register access and per-architecture frame layout.

#[cfg(target_arch = "riscv64")]
mod riscv;
#[cfg(target_arch = "riscv64")]
pub use riscv::*;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use x86::*;

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "aarch64")]
pub use aarch64::*;

#[cfg(not(any(
    target_arch = "riscv64",
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "aarch64"
)))]
mod fallback {
    use super::FrameLayout;

    pub const LAYOUT: FrameLayout = FrameLayout::X86;

    /// No frame-pointer register we know how to read: the walk is empty.
    #[inline(always)]
    pub fn fp() -> usize {
        0
    }
}
#[cfg(not(any(
    target_arch = "riscv64",
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "aarch64"
)))]
pub use fallback::*;

/// Where the interesting words of an activation record sit, in machine
/// words relative to the frame pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Saved caller frame pointer, the chain link.
    pub fp_slot: isize,
    /// Return address into the caller.
    pub ra_slot: isize,
    /// First of the heuristic argument words.
    pub args_slot: isize,
}

impl FrameLayout {
    /// `push ebp; mov ebp, esp`: `[fp] = caller fp`, `[fp + 1] = return address`,
    /// stacked arguments above that.
    pub const X86: FrameLayout = FrameLayout {
        fp_slot: 0,
        ra_slot: 1,
        args_slot: 2,
    };

    /// `fp - 16 = caller fp`, `fp - 8 = ra`; "arguments" are whatever the
    /// caller keeps right above.
    pub const RISCV: FrameLayout = FrameLayout {
        fp_slot: -2,
        ra_slot: -1,
        args_slot: 0,
    };

    /// Layout of the target this crate is compiled for.
    pub const NATIVE: FrameLayout = LAYOUT;
}
