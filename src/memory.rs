//! Word-sized reads of stack memory.
//!
//! [`KernelStack`] is the only code in the crate that dereferences a raw
//! address. Everything above it sees `Option<usize>`.

use bit_field::BitField;
use core::mem::size_of;
use core::ops::Range;

pub const WORD: usize = size_of::<usize>();
const ALIGN_BITS: usize = WORD.trailing_zeros() as usize;

/// Source of stack words for the frame walker.
pub trait StackMemory {
    /// Reads the machine word at `addr`, or `None` if the address is not
    /// plausibly part of the stack.
    fn read_word(&self, addr: usize) -> Option<usize>;

    /// Frame pointer a walk over this memory starts from. `None` means the
    /// live frame-pointer register of the caller.
    fn frame_pointer(&self) -> Option<usize> {
        None
    }
}

impl<M: StackMemory + ?Sized> StackMemory for &M {
    fn read_word(&self, addr: usize) -> Option<usize> {
        (**self).read_word(addr)
    }

    fn frame_pointer(&self) -> Option<usize> {
        (**self).frame_pointer()
    }
}

fn read_value(addr: usize) -> usize {
    unsafe { (addr as *const usize).read_volatile() }
}

/// The live stack of the running kernel.
#[derive(Debug, Clone)]
pub struct KernelStack {
    bounds: Option<Range<usize>>,
}

impl KernelStack {
    /// Reads any non-null, word-aligned address.
    ///
    /// # Safety
    ///
    /// Every aligned address a frame chain may lead to must be mapped and
    /// readable. A corrupted chain makes this a wild read.
    pub const unsafe fn new() -> Self {
        Self { bounds: None }
    }

    /// Reads only inside `bounds`, typically the kernel stack.
    ///
    /// # Safety
    ///
    /// The whole of `bounds` must be mapped and readable for as long as the
    /// value lives.
    pub const unsafe fn with_bounds(bounds: Range<usize>) -> Self {
        Self {
            bounds: Some(bounds),
        }
    }

    fn plausible(&self, addr: usize) -> bool {
        if addr == 0 || addr.get_bits(0..ALIGN_BITS) != 0 {
            return false;
        }
        match &self.bounds {
            Some(bounds) => {
                addr >= bounds.start
                    && addr
                        .checked_add(WORD)
                        .map_or(false, |last| last <= bounds.end)
            }
            None => true,
        }
    }
}

impl StackMemory for KernelStack {
    fn read_word(&self, addr: usize) -> Option<usize> {
        if !self.plausible(addr) {
            return None;
        }
        // in bounds and aligned; mapping is the constructor's contract
        Some(read_value(addr))
    }
}

/// A captured copy of a stack, as if it were mapped at `base`.
#[derive(Debug, Clone, Copy)]
pub struct StackImage<'a> {
    base: usize,
    words: &'a [usize],
    fp: usize,
}

impl<'a> StackImage<'a> {
    /// `fp` is the innermost frame pointer at capture time, an address
    /// inside `[base, base + words.len() * WORD)` or 0 for an empty stack.
    pub const fn new(base: usize, words: &'a [usize], fp: usize) -> Self {
        Self { base, words, fp }
    }

    /// Address of the word at index `idx`.
    pub const fn addr_of(&self, idx: usize) -> usize {
        self.base + idx * WORD
    }
}

impl StackMemory for StackImage<'_> {
    fn read_word(&self, addr: usize) -> Option<usize> {
        let off = addr.checked_sub(self.base)?;
        if off % WORD != 0 {
            return None;
        }
        self.words.get(off / WORD).copied()
    }

    fn frame_pointer(&self) -> Option<usize> {
        Some(self.fp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_reads_aligned_words_only() {
        let words = [7, 8, 9];
        let image = StackImage::new(0x1000, &words, 0x1000);
        assert_eq!(image.read_word(0x1000), Some(7));
        assert_eq!(image.read_word(0x1000 + 2 * WORD), Some(9));
        assert_eq!(image.read_word(0x1000 + 3 * WORD), None);
        assert_eq!(image.read_word(0x1001), None);
        assert_eq!(image.read_word(0x0ff8), None);
        assert_eq!(image.frame_pointer(), Some(0x1000));
    }

    #[test]
    fn kernel_stack_rejects_implausible_addresses() {
        let words = [0x11usize, 0x22, 0x33];
        let base = words.as_ptr() as usize;
        let stack = unsafe { KernelStack::with_bounds(base..base + words.len() * WORD) };

        assert_eq!(stack.read_word(base), Some(0x11));
        assert_eq!(stack.read_word(base + 2 * WORD), Some(0x33));
        assert_eq!(stack.read_word(base + 3 * WORD), None);
        assert_eq!(stack.read_word(base + 1), None);
        assert_eq!(stack.read_word(0), None);
        assert_eq!(stack.frame_pointer(), None);
    }

    #[test]
    fn unbounded_stack_still_refuses_null() {
        let stack = unsafe { KernelStack::new() };
        assert_eq!(stack.read_word(0), None);
        assert_eq!(stack.read_word(WORD - 1), None);
    }
}
