// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Linear memory and typed views over it.
//!
//! A module's linear memory is exposed as a [`MemoryBuffer`]. Growing the
//! memory replaces the buffer and detaches the old one, so any view built over
//! the old buffer stops working. [`ViewCache`] hands out views and rebuilds
//! them whenever the current buffer is not the one they were built over.

use core::ops::Range;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use hostlink_error::{Error, Result};
use log::{debug, trace};

/// Size of a linear memory page in bytes
pub const PAGE_SIZE: usize = 65536;

/// Backing store of a linear memory
#[derive(Debug, Default)]
pub struct MemoryBuffer {
    bytes: RefCell<Vec<u8>>,
    detached: Cell<bool>,
}

fn checked_range(ptr: u32, len: usize, size: usize) -> Result<Range<usize>> {
    let start = ptr as usize;
    match start.checked_add(len) {
        Some(end) if end <= size => Ok(start..end),
        _ => Err(Error::memory_out_of_bounds("Access outside linear memory")),
    }
}

impl MemoryBuffer {
    /// Create a zeroed buffer
    #[must_use]
    pub fn new(len: usize) -> Rc<Self> {
        Self::from_vec(vec![0; len])
    }

    /// Wrap existing bytes
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Rc<Self> {
        Rc::new(Self { bytes: RefCell::new(bytes), detached: Cell::new(false) })
    }

    /// Size in bytes; zero once detached
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.borrow().len()
    }

    /// Whether the buffer has no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the memory has moved on to a newer buffer
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }

    /// Move the contents out and mark this buffer detached
    pub fn detach(&self) -> Vec<u8> {
        self.detached.set(true);
        core::mem::take(&mut *self.bytes.borrow_mut())
    }

    fn check_attached(&self) -> Result<()> {
        if self.detached.get() {
            Err(Error::detached_buffer("Buffer detached by memory growth"))
        } else {
            Ok(())
        }
    }

    /// Copy `len` bytes starting at `ptr`
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or the range is out of bounds
    pub fn read(&self, ptr: u32, len: u32) -> Result<Vec<u8>> {
        self.with_bytes(ptr, len, <[u8]>::to_vec)
    }

    /// Run `f` over `len` bytes starting at `ptr` without copying
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or the range is out of bounds
    pub fn with_bytes<R>(&self, ptr: u32, len: u32, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        self.check_attached()?;
        let bytes = self.bytes.borrow();
        let range = checked_range(ptr, len as usize, bytes.len())?;
        Ok(f(&bytes[range]))
    }

    /// Write `data` starting at `ptr`
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or the range is out of bounds
    pub fn write(&self, ptr: u32, data: &[u8]) -> Result<()> {
        self.check_attached()?;
        let mut bytes = self.bytes.borrow_mut();
        let range = checked_range(ptr, data.len(), bytes.len())?;
        bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Copy `len` bytes from `src` to `dst`; the ranges may overlap
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or either range is out of bounds
    pub fn copy_within(&self, src: u32, dst: u32, len: u32) -> Result<()> {
        self.check_attached()?;
        let mut bytes = self.bytes.borrow_mut();
        let source = checked_range(src, len as usize, bytes.len())?;
        checked_range(dst, len as usize, bytes.len())?;
        bytes.copy_within(source, dst as usize);
        Ok(())
    }
}

/// A linear memory whose buffer may be replaced over time
pub trait LinearMemory {
    /// The current buffer
    fn buffer(&self) -> Rc<MemoryBuffer>;

    /// Current size in bytes
    fn size_in_bytes(&self) -> usize {
        self.buffer().len()
    }
}

/// Growable linear memory backed by a `Vec<u8>`
#[derive(Debug)]
pub struct VecMemory {
    current: RefCell<Rc<MemoryBuffer>>,
    pages: Cell<u32>,
    max_pages: Option<u32>,
}

impl VecMemory {
    /// Create a memory of `initial_pages` pages
    #[must_use]
    pub fn new(initial_pages: u32, max_pages: Option<u32>) -> Self {
        Self {
            current: RefCell::new(MemoryBuffer::new(initial_pages as usize * PAGE_SIZE)),
            pages: Cell::new(initial_pages),
            max_pages,
        }
    }

    /// Current size in pages
    #[must_use]
    pub fn size(&self) -> u32 {
        self.pages.get()
    }

    /// Grow by `pages` pages, returning the previous size in pages.
    ///
    /// A non-zero growth replaces the buffer; the old one is detached.
    ///
    /// # Errors
    ///
    /// Returns a memory error when the new size exceeds the maximum
    pub fn grow(&self, pages: u32) -> Result<u32> {
        let previous = self.pages.get();
        if pages == 0 {
            return Ok(previous);
        }
        let new_pages = previous
            .checked_add(pages)
            .ok_or(Error::memory_grow_error("Page count overflow"))?;
        if new_pages > self.max_pages.unwrap_or(u32::from(u16::MAX) + 1) {
            return Err(Error::memory_grow_error("Memory would exceed its maximum size"));
        }

        let old = Rc::clone(&self.current.borrow());
        let mut bytes = old.detach();
        bytes.resize(new_pages as usize * PAGE_SIZE, 0);
        *self.current.borrow_mut() = MemoryBuffer::from_vec(bytes);
        self.pages.set(new_pages);
        debug!("memory grew from {previous} to {new_pages} pages");
        Ok(previous)
    }

    /// Copy bytes out of the current buffer
    ///
    /// # Errors
    ///
    /// Fails when the range is out of bounds
    pub fn read(&self, ptr: u32, len: u32) -> Result<Vec<u8>> {
        self.buffer().read(ptr, len)
    }

    /// Write bytes into the current buffer
    ///
    /// # Errors
    ///
    /// Fails when the range is out of bounds
    pub fn write(&self, ptr: u32, data: &[u8]) -> Result<()> {
        self.buffer().write(ptr, data)
    }
}

impl LinearMemory for VecMemory {
    fn buffer(&self) -> Rc<MemoryBuffer> {
        Rc::clone(&self.current.borrow())
    }
}

/// Byte view over one buffer generation
#[derive(Debug)]
pub struct ByteView {
    buffer: Rc<MemoryBuffer>,
}

impl ByteView {
    /// Whether this view was built over `buffer`
    #[must_use]
    pub fn is_over(&self, buffer: &Rc<MemoryBuffer>) -> bool {
        Rc::ptr_eq(&self.buffer, buffer)
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the view covers no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// See [`MemoryBuffer::read`]
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or the range is out of bounds
    pub fn read(&self, ptr: u32, len: u32) -> Result<Vec<u8>> {
        self.buffer.read(ptr, len)
    }

    /// See [`MemoryBuffer::with_bytes`]
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or the range is out of bounds
    pub fn with_bytes<R>(&self, ptr: u32, len: u32, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        self.buffer.with_bytes(ptr, len, f)
    }

    /// See [`MemoryBuffer::write`]
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or the range is out of bounds
    pub fn write(&self, ptr: u32, data: &[u8]) -> Result<()> {
        self.buffer.write(ptr, data)
    }
}

/// Little-endian 32-bit word view over one buffer generation
#[derive(Debug)]
pub struct Int32View {
    buffer: Rc<MemoryBuffer>,
}

impl Int32View {
    /// Whether this view was built over `buffer`
    #[must_use]
    pub fn is_over(&self, buffer: &Rc<MemoryBuffer>) -> bool {
        Rc::ptr_eq(&self.buffer, buffer)
    }

    /// Length in words
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len() / 4
    }

    /// Whether the view covers no words
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn byte_offset(index: u32) -> Result<u32> {
        index.checked_mul(4).ok_or(Error::memory_out_of_bounds("Word index out of range"))
    }

    /// Read the word at `index`
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or the index is out of bounds
    pub fn get(&self, index: u32) -> Result<i32> {
        let word = self.buffer.with_bytes(Self::byte_offset(index)?, 4, |bytes| {
            [bytes[0], bytes[1], bytes[2], bytes[3]]
        })?;
        Ok(i32::from_le_bytes(word))
    }

    /// Write the word at `index`
    ///
    /// # Errors
    ///
    /// Fails when the buffer is detached or the index is out of bounds
    pub fn set(&self, index: u32, value: i32) -> Result<()> {
        self.buffer.write(Self::byte_offset(index)?, &value.to_le_bytes())
    }
}

/// Lazily rebuilt views over a [`LinearMemory`]
pub struct ViewCache {
    memory: Rc<dyn LinearMemory>,
    bytes: RefCell<Option<Rc<ByteView>>>,
    words: RefCell<Option<Rc<Int32View>>>,
    rebuilds: Cell<u64>,
}

impl core::fmt::Debug for ViewCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewCache").field("rebuilds", &self.rebuilds.get()).finish()
    }
}

impl ViewCache {
    /// Create an empty cache over `memory`
    #[must_use]
    pub fn new(memory: Rc<dyn LinearMemory>) -> Self {
        Self {
            memory,
            bytes: RefCell::new(None),
            words: RefCell::new(None),
            rebuilds: Cell::new(0),
        }
    }

    /// The underlying memory
    #[must_use]
    pub fn memory(&self) -> &Rc<dyn LinearMemory> {
        &self.memory
    }

    /// How many views have been built so far
    #[must_use]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds.get()
    }

    /// Byte view over the current buffer. Returns the cached instance while
    /// the buffer is unchanged.
    pub fn byte_view(&self) -> Rc<ByteView> {
        let current = self.memory.buffer();
        let mut cached = self.bytes.borrow_mut();
        if let Some(view) = cached.as_ref().filter(|view| view.is_over(&current)) {
            return Rc::clone(view);
        }
        trace!("rebuilding byte view over {} bytes", current.len());
        let view = Rc::new(ByteView { buffer: current });
        *cached = Some(Rc::clone(&view));
        self.rebuilds.set(self.rebuilds.get() + 1);
        view
    }

    /// Word view over the current buffer. Returns the cached instance while
    /// the buffer is unchanged.
    pub fn int32_view(&self) -> Rc<Int32View> {
        let current = self.memory.buffer();
        let mut cached = self.words.borrow_mut();
        if let Some(view) = cached.as_ref().filter(|view| view.is_over(&current)) {
            return Rc::clone(view);
        }
        trace!("rebuilding word view over {} bytes", current.len());
        let view = Rc::new(Int32View { buffer: current });
        *cached = Some(Rc::clone(&view));
        self.rebuilds.set(self.rebuilds.get() + 1);
        view
    }

    /// Store a `(ptr, len)` pair in the two words at `retptr`
    ///
    /// # Errors
    ///
    /// Returns a contract violation when `retptr` is not 4-byte aligned and a
    /// memory error when the slot is out of bounds
    pub fn write_pair(&self, retptr: u32, ptr: u32, len: u32) -> Result<()> {
        let index = Self::slot_index(retptr)?;
        let words = self.int32_view();
        words.set(index, ptr as i32)?;
        words.set(index + 1, len as i32)
    }

    /// Load the `(ptr, len)` pair stored at `retptr`
    ///
    /// # Errors
    ///
    /// Same conditions as [`ViewCache::write_pair`]
    pub fn read_pair(&self, retptr: u32) -> Result<(u32, u32)> {
        let index = Self::slot_index(retptr)?;
        let words = self.int32_view();
        Ok((words.get(index)? as u32, words.get(index + 1)? as u32))
    }

    fn slot_index(retptr: u32) -> Result<u32> {
        if retptr % 4 != 0 {
            return Err(Error::invalid_return_slot("Return slot is not 4-byte aligned"));
        }
        Ok(retptr / 4)
    }
}
