//! Addresses of the loaded kernel image.

/// Virtual address the kernel is linked at.
pub const KERNBASE: usize = 0xF000_0000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelLayout {
    pub kernbase: usize,
    /// Physical entry point.
    pub start: usize,
    pub entry: usize,
    pub etext: usize,
    pub edata: usize,
    pub end: usize,
}

impl KernelLayout {
    /// Physical address of a kernel virtual address.
    pub fn phys(&self, virt: usize) -> usize {
        virt.wrapping_sub(self.kernbase)
    }

    /// Memory used by the image, rounded up to whole kilobytes.
    pub fn footprint_kb(&self) -> usize {
        let size = self.end.saturating_sub(self.entry);
        size / 1024 + usize::from(size % 1024 != 0)
    }

    /// Reads the linker-defined image symbols.
    #[cfg(feature = "linker-symbols")]
    pub fn from_linker(kernbase: usize) -> Self {
        use core::ptr::addr_of;

        extern "C" {
            static _start: u8;
            static entry: u8;
            static etext: u8;
            static edata: u8;
            static end: u8;
        }

        unsafe {
            Self {
                kernbase,
                start: addr_of!(_start) as usize,
                entry: addr_of!(entry) as usize,
                etext: addr_of!(etext) as usize,
                edata: addr_of!(edata) as usize,
                end: addr_of!(end) as usize,
            }
        }
    }
}
