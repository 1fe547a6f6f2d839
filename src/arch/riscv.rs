use core::arch::asm;

use super::FrameLayout;

/// `s0` points just past the saved `ra`/`fp` pair.
pub const LAYOUT: FrameLayout = FrameLayout::RISCV;

#[inline(always)]
pub fn fp() -> usize {
    let mut fp: usize;
    unsafe {
        asm!("mv {}, s0", out(reg) fp);
    }
    fp
}
