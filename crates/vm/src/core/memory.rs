use alloy::primitives::U256;

use super::{constants::WORD_SIZE, gas::GasSchedule};

/// The [`Memory`] struct represents the memory of an EVM.
///
/// Memory starts empty and only ever grows, always to a multiple of 32 bytes. The interpreter
/// charges for growth through [`Memory::expansion_cost`] before it touches a new region; the
/// accessors below grow the buffer themselves as well, so an access can never read or write out of
/// bounds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Creates a new, empty [`Memory`].
    pub fn new() -> Memory {
        Memory { data: Vec::with_capacity(4 * 1024) }
    }

    /// Gets the current size of the memory in bytes.
    ///
    /// ```
    /// use bifrost_vm::core::memory::Memory;
    ///
    /// let memory = Memory::new();
    /// assert_eq!(memory.size(), 0);
    /// ```
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Gets the current size of the memory in words.
    #[inline]
    pub fn words(&self) -> i64 {
        (self.data.len() / WORD_SIZE) as i64
    }

    /// The raw memory contents.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Extends the memory to cover `offset..offset + size`, rounded up to a whole word.
    /// A zero-sized access never extends the memory.
    ///
    /// ```
    /// use bifrost_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.extend(0, 0);
    /// assert_eq!(memory.size(), 0);
    /// memory.extend(4, 1);
    /// assert_eq!(memory.size(), 32);
    /// ```
    pub fn extend(&mut self, offset: usize, size: usize) {
        if size == 0 {
            return;
        }
        let new_size = offset.saturating_add(size).div_ceil(WORD_SIZE) * WORD_SIZE;
        if new_size > self.data.len() {
            self.data.resize(new_size, 0);
        }
    }

    /// Store the given bytes in the memory at the given offset.
    ///
    /// ```
    /// use bifrost_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store(31, &[0xff]);
    /// assert_eq!(memory.read(0, 32)[31], 0xff);
    /// ```
    pub fn store(&mut self, offset: usize, value: &[u8]) {
        self.extend(offset, value.len());
        self.data[offset..offset + value.len()].copy_from_slice(value);
    }

    /// Store a big-endian word at the given offset.
    #[inline]
    pub fn store_word(&mut self, offset: usize, value: U256) {
        self.store(offset, &value.to_be_bytes::<32>());
    }

    /// Store a single byte at the given offset.
    #[inline]
    pub fn store_byte(&mut self, offset: usize, value: u8) {
        self.store(offset, &[value]);
    }

    /// Copy `size` bytes of `source`, starting at `source_offset`, to `offset`. Bytes past the end
    /// of `source` are written as zero.
    ///
    /// ```
    /// use bifrost_vm::core::memory::Memory;
    ///
    /// let mut memory = Memory::new();
    /// memory.store_padded(0, 4, &[0xaa, 0xbb, 0xcc], 1);
    /// assert_eq!(&memory.read(0, 4), &[0xbb, 0xcc, 0x00, 0x00]);
    /// ```
    pub fn store_padded(&mut self, offset: usize, size: usize, source: &[u8], source_offset: usize) {
        if size == 0 {
            return;
        }
        self.extend(offset, size);

        let available = source.len().saturating_sub(source_offset).min(size);
        if available > 0 {
            self.data[offset..offset + available]
                .copy_from_slice(&source[source_offset..source_offset + available]);
        }
        self.data[offset + available..offset + size].fill(0);
    }

    /// Copy `size` bytes within memory from `source` to `destination`. The regions may overlap.
    pub fn copy_within(&mut self, destination: usize, source: usize, size: usize) {
        if size == 0 {
            return;
        }
        self.extend(destination.max(source), size);
        self.data.copy_within(source..source + size, destination);
    }

    /// Read the given number of bytes from the memory at the given offset.
    /// Bytes beyond the current memory size are read as zero.
    pub fn read(&self, offset: usize, size: usize) -> Vec<u8> {
        let mut value = vec![0u8; size];
        if offset < self.data.len() {
            let available = (self.data.len() - offset).min(size);
            value[..available].copy_from_slice(&self.data[offset..offset + available]);
        }
        value
    }

    /// Read the big-endian word at the given offset.
    #[inline]
    pub fn load_word(&self, offset: usize) -> U256 {
        let mut word = [0u8; 32];
        word.copy_from_slice(&self.read(offset, WORD_SIZE));
        U256::from_be_bytes(word)
    }

    /// Calculate the current memory cost.
    ///
    /// ```
    /// use bifrost_vm::core::{gas::GasSchedule, memory::Memory, revision::Revision};
    ///
    /// let mut memory = Memory::new();
    /// memory.store(0, &[0xff; 32]);
    /// assert_eq!(memory.memory_cost(GasSchedule::for_revision(Revision::Cancun)), 3);
    /// ```
    #[inline]
    pub fn memory_cost(&self, schedule: &GasSchedule) -> i64 {
        schedule.memory_cost(self.words())
    }

    /// Calculate the cost of extending the memory to cover `offset..offset + size`.
    ///
    /// ```
    /// use bifrost_vm::core::{gas::GasSchedule, memory::Memory, revision::Revision};
    ///
    /// let schedule = GasSchedule::for_revision(Revision::Cancun);
    /// let mut memory = Memory::new();
    /// memory.store(0, &[0xff; 32]);
    /// assert_eq!(memory.expansion_cost(schedule, 0, 32), 0);
    /// assert_eq!(memory.expansion_cost(schedule, 0, 64), 3);
    /// ```
    pub fn expansion_cost(&self, schedule: &GasSchedule, offset: usize, size: usize) -> i64 {
        if size == 0 {
            return 0;
        }
        let new_words = offset.saturating_add(size).div_ceil(WORD_SIZE) as i64;
        schedule.memory_expansion_cost(self.words(), new_words)
    }
}
