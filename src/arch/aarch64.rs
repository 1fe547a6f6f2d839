use core::arch::asm;

use super::FrameLayout;

/// AAPCS64 frame records are `{ x29, x30 }` pairs, same shape as x86.
pub const LAYOUT: FrameLayout = FrameLayout::X86;

#[inline(always)]
pub fn fp() -> usize {
    let mut fp: usize;
    unsafe {
        asm!("mov {}, x29", out(reg) fp);
    }
    fp
}
