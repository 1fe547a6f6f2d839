//! Address to source-location lookup.

/// Debug information for one instruction address.
///
/// Only valid for the duration of the lookup that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugInfo<'a> {
    pub file: &'a str,
    pub line: u32,
    /// Not necessarily ending at the name: only the first `fn_namelen` bytes
    /// belong to it.
    pub fn_name: &'a str,
    pub fn_namelen: usize,
    pub fn_addr: usize,
}

impl<'a> DebugInfo<'a> {
    /// Function name bounded by `fn_namelen`.
    pub fn name(&self) -> &'a str {
        let mut len = self.fn_namelen.min(self.fn_name.len());
        while !self.fn_name.is_char_boundary(len) {
            len -= 1;
        }
        &self.fn_name[..len]
    }

    /// Byte offset of `addr` from the start of the function.
    pub fn offset(&self, addr: usize) -> usize {
        addr.wrapping_sub(self.fn_addr)
    }
}

pub trait SymbolResolver {
    fn resolve(&self, addr: usize) -> Option<DebugInfo<'_>>;
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for &R {
    fn resolve(&self, addr: usize) -> Option<DebugInfo<'_>> {
        (**self).resolve(addr)
    }
}

/// Resolver for a kernel built without symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolResolver for NoSymbols {
    fn resolve(&self, _addr: usize) -> Option<DebugInfo<'_>> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEntry {
    pub addr: usize,
    pub line: u32,
}

/// One function of a symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'a> {
    /// `[start, end)` of the function's code.
    pub start: usize,
    pub end: usize,
    pub file: &'a str,
    /// Line of the function itself, used when no line entry covers an address.
    pub line: u32,
    /// May carry a `:type` suffix, as stab names do.
    pub name: &'a str,
    /// Sorted by address.
    pub lines: &'a [LineEntry],
}

/// Lookup over a start-sorted table of non-overlapping functions.
#[derive(Debug, Clone, Copy)]
pub struct SymbolTable<'a> {
    symbols: &'a [Symbol<'a>],
}

impl<'a> SymbolTable<'a> {
    pub const fn new(symbols: &'a [Symbol<'a>]) -> Self {
        Self { symbols }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn find(&self, addr: usize) -> Option<&'a Symbol<'a>> {
        let idx = self.symbols.partition_point(|sym| sym.start <= addr);
        let sym = self.symbols.get(idx.checked_sub(1)?)?;
        (addr < sym.end).then_some(sym)
    }
}

impl SymbolResolver for SymbolTable<'_> {
    fn resolve(&self, addr: usize) -> Option<DebugInfo<'_>> {
        let sym = self.find(addr)?;
        let idx = sym.lines.partition_point(|entry| entry.addr <= addr);
        let line = match idx.checked_sub(1).and_then(|i| sym.lines.get(i)) {
            Some(entry) if entry.addr >= sym.start => entry.line,
            _ => sym.line,
        };
        Some(DebugInfo {
            file: sym.file,
            line,
            fn_name: sym.name,
            fn_namelen: sym.name.find(':').unwrap_or(sym.name.len()),
            fn_addr: sym.start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SYMBOLS: [Symbol<'static>; 2] = [
        Symbol {
            start: 0x100000,
            end: 0x100040,
            file: "kern/init.c",
            line: 12,
            name: "test_backtrace:F(0,25)",
            lines: &[
                LineEntry { addr: 0x100008, line: 14 },
                LineEntry { addr: 0x100020, line: 16 },
            ],
        },
        Symbol {
            start: 0x100080,
            end: 0x1000a0,
            file: "kern/monitor.c",
            line: 60,
            name: "mon_backtrace",
            lines: &[],
        },
    ];

    #[test]
    fn resolves_line_and_bounded_name() {
        let table = SymbolTable::new(&SYMBOLS);
        assert_eq!(table.len(), 2);
        let info = table.resolve(0x100024).unwrap();
        assert_eq!(info.file, "kern/init.c");
        assert_eq!(info.line, 16);
        assert_eq!(info.name(), "test_backtrace");
        assert_eq!(info.offset(0x100024), 0x24);
    }

    #[test]
    fn falls_back_to_function_line() {
        let table = SymbolTable::new(&SYMBOLS);
        assert_eq!(table.resolve(0x100004).unwrap().line, 12);
        let info = table.resolve(0x100090).unwrap();
        assert_eq!(info.line, 60);
        assert_eq!(info.name(), "mon_backtrace");
    }

    #[test]
    fn misses_outside_every_function() {
        let table = SymbolTable::new(&SYMBOLS);
        assert!(table.resolve(0xfffff).is_none());
        assert!(table.resolve(0x100040).is_none());
        assert!(table.resolve(0x1000a0).is_none());
        let empty = SymbolTable::new(&[]);
        assert!(empty.is_empty());
        assert!(empty.resolve(0x100000).is_none());
        assert!(NoSymbols.resolve(0x100000).is_none());
    }

    #[test]
    fn name_never_overruns() {
        let info = DebugInfo {
            file: "a.c",
            line: 1,
            fn_name: "héllo",
            fn_namelen: 2,
            fn_addr: 0,
        };
        assert_eq!(info.name(), "h");

        let long = DebugInfo {
            fn_namelen: 100,
            ..info
        };
        assert_eq!(long.name(), "héllo");
    }
}
