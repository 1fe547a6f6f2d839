use core::arch::asm;

use super::FrameLayout;

pub const LAYOUT: FrameLayout = FrameLayout::X86;

#[cfg(target_arch = "x86")]
#[inline(always)]
pub fn fp() -> usize {
    let mut fp: usize;
    unsafe {
        asm!("mov {}, ebp", out(reg) fp);
    }
    fp
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn fp() -> usize {
    let mut fp: usize;
    unsafe {
        asm!("mov {}, rbp", out(reg) fp);
    }
    fp
}
