//! Thread creation and stack introspection types

use crate::Tick;

/// One machine word of task stack
pub type StackWord = u32;

/// Pattern the host writes over a fresh stack for high-water tracking
pub const STACK_FILL_WORD: StackWord = 0x2323_2323;

/// Thread entry point; receives the parameter given at creation
pub type ThreadEntry = fn(usize);

/// Everything the host needs to initialise a thread
///
/// The stack region is caller-provided memory that lives as long as the
/// thread; the host takes it over for the thread's lifetime.
#[derive(Debug)]
pub struct ThreadConfig {
    /// Human-readable name
    pub name: String,
    /// Entry point
    pub entry: ThreadEntry,
    /// Argument passed to `entry`
    pub parameter: usize,
    /// Stack memory
    pub stack: &'static mut [StackWord],
    /// Priority (0 is highest)
    pub priority: u8,
    /// Round-robin time slice in ticks
    pub time_slice: Tick,
}

/// Stack usage of a thread in words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackUsage {
    /// Total stack size
    pub size: usize,
    /// Words in use right now
    pub used: usize,
    /// Highest number of words ever in use
    pub max_used: usize,
}

impl StackUsage {
    /// Words currently free
    pub fn free(&self) -> usize {
        self.size.saturating_sub(self.used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_words() {
        let usage = StackUsage {
            size: 256,
            used: 40,
            max_used: 64,
        };
        assert_eq!(usage.free(), 216);
    }

    #[test]
    fn test_free_never_underflows() {
        let usage = StackUsage {
            size: 8,
            used: 10,
            max_used: 10,
        };
        assert_eq!(usage.free(), 0);
    }
}
