//! Placement of the record buffer.
//!
//! A parse borrows exactly one record buffer for its whole run. Where that
//! buffer lives is decided here; everything downstream only sees `&mut [u8]`.

use crate::error::{ParseError, Result};

/// Capacity of the stack-placed record buffer.
pub const STACK_RECORD_CAPACITY: usize = 4096;

/// Hands a zeroed buffer of `width` bytes to `f` for the duration of the call.
pub trait BufferProvider {
    fn with_buffer<T>(&self, width: usize, f: impl FnOnce(&mut [u8]) -> Result<T>) -> Result<T>;
}

/// Allocates the buffer once on the heap.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapBuffer;

impl BufferProvider for HeapBuffer {
    fn with_buffer<T>(&self, width: usize, f: impl FnOnce(&mut [u8]) -> Result<T>) -> Result<T> {
        let mut buffer = vec![0u8; width].into_boxed_slice();
        f(&mut buffer)
    }
}

/// Places the buffer in a fixed `[u8; N]` on the calling frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackBuffer<const N: usize>;

impl<const N: usize> StackBuffer<N> {
    pub const CAPACITY: usize = N;

    /// Check that a record of `width` bytes fits.
    pub fn check(width: usize) -> Result<()> {
        if width > N {
            return Err(ParseError::buffer_too_small(width, N));
        }
        Ok(())
    }
}

impl<const N: usize> BufferProvider for StackBuffer<N> {
    fn with_buffer<T>(&self, width: usize, f: impl FnOnce(&mut [u8]) -> Result<T>) -> Result<T> {
        Self::check(width)?;
        let mut buffer = [0u8; N];
        f(&mut buffer[..width])
    }
}

/// Configuration switch between the two providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferPlacement {
    #[default]
    Heap,
    Stack,
}

impl BufferPlacement {
    pub const ALL: [BufferPlacement; 2] = [Self::Heap, Self::Stack];

    pub fn with_buffer<T>(
        self,
        width: usize,
        f: impl FnOnce(&mut [u8]) -> Result<T>,
    ) -> Result<T> {
        match self {
            Self::Heap => HeapBuffer.with_buffer(width, f),
            Self::Stack => StackBuffer::<STACK_RECORD_CAPACITY>.with_buffer(width, f),
        }
    }

    /// Fail early if this placement cannot hold a record of `width` bytes.
    pub fn check(self, width: usize) -> Result<()> {
        match self {
            Self::Heap => Ok(()),
            Self::Stack => StackBuffer::<STACK_RECORD_CAPACITY>::check(width),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Heap => "heap",
            Self::Stack => "stack",
        }
    }
}
