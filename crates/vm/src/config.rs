//! Engine configuration.

use serde::Deserialize;

/// Stack capacity used when none is configured, in bytes.
pub const DEFAULT_STACK_CAPACITY: u32 = 1024;

/// Settings fixed at construction time.
///
/// Deserializable so callers can keep it in a JSON settings file; every
/// field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MachineConfig {
    /// Stack size in bytes. `esp` and `ebp` start here and each push moves
    /// `esp` down by 4.
    #[serde(default = "MachineConfig::default_stack_capacity")]
    pub stack_capacity: u32,
}

impl MachineConfig {
    fn default_stack_capacity() -> u32 {
        DEFAULT_STACK_CAPACITY
    }

    pub fn with_stack_capacity(stack_capacity: u32) -> Self {
        Self { stack_capacity }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
        }
    }
}
