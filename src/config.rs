//! Monitor configuration, fixed at build time.

use crate::fp::{UnwindConfig, DEFAULT_ARG_WORDS};

pub const DEFAULT_PROMPT: &str = "K> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub prompt: &'static str,
    /// Emit ANSI color escapes.
    pub ansi: bool,
    pub unwind: UnwindConfig,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            prompt: DEFAULT_PROMPT,
            ansi: true,
            unwind: UnwindConfig::new(),
        }
    }

    /// Defaults overridden by `KMON_ARG_WORDS` and `KMON_MAX_FRAMES` from
    /// the build environment.
    pub fn from_env() -> Self {
        Self::from_vars(option_env!("KMON_ARG_WORDS"), option_env!("KMON_MAX_FRAMES"))
    }

    fn from_vars(arg_words: Option<&str>, max_frames: Option<&str>) -> Self {
        let mut config = Self::new();
        config.unwind.arg_words = parse_usize(arg_words).unwrap_or(DEFAULT_ARG_WORDS);
        config.unwind.max_frames = parse_usize(max_frames).filter(|&n| n > 0);
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_usize(var: Option<&str>) -> Option<usize> {
    var?.trim().parse().ok()
}
