//! Stack memory for created fibers.
//!
//! Each created fiber owns a private anonymous mapping with one guard page
//! at the low end. Stacks grow downwards, so an overflow runs into the
//! `PROT_NONE` page and faults immediately instead of silently corrupting
//! whatever the allocator placed below the stack. The mapping is released
//! exactly once, when the owning fiber is dropped.

use libc::{MAP_ANON, MAP_FAILED, MAP_PRIVATE, PROT_NONE, PROT_READ, PROT_WRITE, _SC_PAGESIZE};
use std::ffi::c_void;
use std::io;
use std::ptr;

/// Returns the system page size in bytes.
pub(crate) fn page_size() -> usize {
    // Safety: sysconf with a valid name reads static configuration only.
    unsafe { libc::sysconf(_SC_PAGESIZE) as usize }
}

/// An owned, page-aligned stack mapping with a low-end guard page.
pub(crate) struct FiberStack {
    /// Base address of the whole mapping, guard page included.
    mapping: *mut c_void,

    /// Total mapped length in bytes, guard page included.
    mapped_len: usize,

    /// Usable stack length in bytes (excludes the guard page).
    usable_len: usize,
}

impl FiberStack {
    /// Maps a stack with at least `size` usable bytes.
    ///
    /// The request is rounded up to whole pages and one extra guard page is
    /// placed below the usable range. Fails with the OS error if the address
    /// space or memory for the mapping is exhausted.
    pub(crate) fn new(size: usize) -> io::Result<Self> {
        let page = page_size();
        let usable_len = size.div_ceil(page) * page;
        let mapped_len = usable_len + page;

        // Safety: a fresh private anonymous mapping; no fd, no offset.
        let mapping = unsafe {
            libc::mmap(
                ptr::null_mut(),
                mapped_len,
                PROT_READ | PROT_WRITE,
                MAP_PRIVATE | MAP_ANON,
                -1,
                0,
            )
        };
        if mapping == MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        // Safety: `mapping` is page-aligned and at least one page long.
        let rc = unsafe { libc::mprotect(mapping, page, PROT_NONE) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            // Safety: unmapping the mapping created above; nothing else has
            // seen it yet.
            unsafe { libc::munmap(mapping, mapped_len) };
            return Err(err);
        }

        Ok(Self {
            mapping,
            mapped_len,
            usable_len,
        })
    }

    /// Lowest usable stack address, just above the guard page.
    pub(crate) fn base(&self) -> *mut c_void {
        // Safety: the guard page lies within the mapping.
        unsafe {
            self.mapping
                .cast::<u8>()
                .add(self.mapped_len - self.usable_len)
                .cast()
        }
    }

    /// Usable stack length in bytes.
    pub(crate) fn len(&self) -> usize {
        self.usable_len
    }
}

impl Drop for FiberStack {
    fn drop(&mut self) {
        // Safety: `mapping`/`mapped_len` describe the mapping created in
        // `new`, released exactly once here.
        unsafe { libc::munmap(self.mapping, self.mapped_len) };
    }
}
