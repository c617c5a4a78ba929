use std::fmt::Display;

use alloy::primitives::U256;

use super::{constants::STACK_LIMIT, status::StatusCode};

/// The [`Stack`] struct represents the EVM stack.
///
/// It is a LIFO sequence of [`U256`] words bounded by [`STACK_LIMIT`]. The top of the stack is
/// the last element of the underlying vector. Every accessor is checked and reports
/// [`StatusCode::StackOverflow`] or [`StatusCode::StackUnderflow`] instead of panicking, so the
/// interpreter stays sound even when a block-level pre-check was skipped.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Stack {
    items: Vec<U256>,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    /// Creates a new [`Stack`].
    ///
    /// ```
    /// use bifrost_vm::core::stack::Stack;
    ///
    /// let stack = Stack::new();
    /// assert_eq!(stack.size(), 0);
    /// ```
    pub fn new() -> Stack {
        Stack { items: Vec::with_capacity(STACK_LIMIT) }
    }

    /// Push a value onto the stack.
    ///
    /// ```
    /// use bifrost_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).unwrap();
    /// assert_eq!(stack.size(), 1);
    /// ```
    #[inline]
    pub fn push(&mut self, value: U256) -> Result<(), StatusCode> {
        if self.items.len() >= STACK_LIMIT {
            return Err(StatusCode::StackOverflow);
        }
        self.items.push(value);
        Ok(())
    }

    /// Pop a value off the stack.
    ///
    /// ```
    /// use bifrost_vm::core::{stack::Stack, status::StatusCode};
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).unwrap();
    ///
    /// assert_eq!(stack.pop(), Ok(U256::from(0x00)));
    /// assert_eq!(stack.pop(), Err(StatusCode::StackUnderflow));
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Result<U256, StatusCode> {
        self.items.pop().ok_or(StatusCode::StackUnderflow)
    }

    /// Pop `N` values off the stack, top first.
    ///
    /// ```
    /// use bifrost_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).unwrap();
    /// stack.push(U256::from(0x01)).unwrap();
    /// stack.push(U256::from(0x02)).unwrap();
    ///
    /// // stack is now [0x02, 0x01, 0x00]
    /// let [a, b] = stack.pop_n::<2>().unwrap();
    /// assert_eq!(a, U256::from(0x02));
    /// assert_eq!(b, U256::from(0x01));
    ///
    /// // stack is now [0x00]
    /// assert_eq!(stack.size(), 1);
    /// ```
    #[inline]
    pub fn pop_n<const N: usize>(&mut self) -> Result<[U256; N], StatusCode> {
        if self.items.len() < N {
            return Err(StatusCode::StackUnderflow);
        }
        let mut values = [U256::ZERO; N];
        for value in values.iter_mut() {
            *value = self.items.pop().ok_or(StatusCode::StackUnderflow)?;
        }
        Ok(values)
    }

    /// Swap the top value and the nth value below it.
    ///
    /// ```
    /// use bifrost_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).unwrap();
    /// stack.push(U256::from(0x01)).unwrap();
    ///
    /// // stack is now [0x01, 0x00]
    /// stack.swap(1).unwrap();
    ///
    /// // stack is now [0x00, 0x01]
    /// assert_eq!(stack.pop(), Ok(U256::from(0x00)));
    /// assert_eq!(stack.pop(), Ok(U256::from(0x01)));
    /// ```
    #[inline]
    pub fn swap(&mut self, n: usize) -> Result<(), StatusCode> {
        let len = self.items.len();
        if n == 0 || len <= n {
            return Err(StatusCode::StackUnderflow);
        }
        self.items.swap(len - 1, len - 1 - n);
        Ok(())
    }

    /// Duplicate the nth value on the stack (1 is the top).
    ///
    /// ```
    /// use bifrost_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).unwrap();
    ///
    /// // stack is now [0x00]
    /// stack.dup(1).unwrap();
    ///
    /// // stack is now [0x00, 0x00]
    /// assert_eq!(stack.size(), 2);
    /// ```
    #[inline]
    pub fn dup(&mut self, n: usize) -> Result<(), StatusCode> {
        let value = self.peek(n.checked_sub(1).ok_or(StatusCode::StackUnderflow)?)?;
        self.push(value)
    }

    /// Peek at the value `index` slots below the top.
    ///
    /// ```
    /// use bifrost_vm::core::{stack::Stack, status::StatusCode};
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).unwrap();
    ///
    /// // stack is now [0x00]
    /// assert_eq!(stack.peek(0), Ok(U256::from(0x00)));
    /// assert_eq!(stack.peek(1), Err(StatusCode::StackUnderflow));
    /// ```
    #[inline]
    pub fn peek(&self, index: usize) -> Result<U256, StatusCode> {
        let len = self.items.len();
        if index >= len {
            return Err(StatusCode::StackUnderflow);
        }
        Ok(self.items[len - 1 - index])
    }

    /// Mutable access to the top value, for opcodes that replace it in place.
    #[inline]
    pub fn top_mut(&mut self) -> Result<&mut U256, StatusCode> {
        self.items.last_mut().ok_or(StatusCode::StackUnderflow)
    }

    /// Get the size of the stack
    #[inline]
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Check if the stack is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The stack contents, bottom first.
    pub fn as_slice(&self) -> &[U256] {
        &self.items
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stack = String::new();
        for value in self.items.iter().rev() {
            stack.push_str(&format!("{value:#x}, "));
        }
        write!(f, "[{}]", stack.trim_end_matches(", "))
    }
}
