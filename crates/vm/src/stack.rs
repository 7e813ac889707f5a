//! The call/data stack.

/// A LIFO of 32-bit values.
///
/// Depth accounting lives in `esp`, which the machine keeps in the register
/// file; this type only holds the values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stack {
    values: Vec<u32>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: u32) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Option<u32> {
        self.values.pop()
    }

    /// Values from bottom to top.
    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }
}
