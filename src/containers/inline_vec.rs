use std::fmt;
use std::mem::{self, MaybeUninit};
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

/// A growable, order-preserving sequence with `N` inline element slots.
///
/// An `InlineVec<T, N>` behaves like a `Vec<T>`, except that the first `N`
/// elements live directly inside the value, so sequences that never exceed
/// `N` elements never touch the heap. Once the count outgrows the inline
/// capacity, the elements spill into heap storage and the sequence keeps
/// behaving like an unbounded vector. The migration is one-directional:
/// shrinking never moves elements back inline and never releases backing
/// capacity.
///
/// `N = 0` is allowed and means the sequence is always heap-backed.
///
/// Out-of-range access is a programming error and panics; it is never
/// reported as a recoverable result. The container performs no internal
/// synchronization: a value is owned and mutated by one thread at a time,
/// with any sharing arranged by the caller.
///
/// # Examples
///
/// ```rust,ignore
/// let mut queue: InlineVec<Task, 8> = InlineVec::new();
/// queue.push(task); // allocation-free while len() <= 8
/// ```
pub struct InlineVec<T, const N: usize> {
    storage: Storage<T, N>,
}

/// Active backing storage for an [`InlineVec`].
///
/// The inline variant tracks how many of its slots are initialized; the heap
/// variant delegates that bookkeeping to the `Vec` it wraps.
enum Storage<T, const N: usize> {
    /// Elements `[0, len)` of `buf` are initialized.
    Inline {
        buf: [MaybeUninit<T>; N],
        len: usize,
    },

    /// The sequence has spilled; all elements live in the `Vec`.
    Heap(Vec<T>),
}

impl<T, const N: usize> InlineVec<T, N> {
    /// Creates an empty sequence using inline storage.
    ///
    /// Performs no heap allocation.
    pub const fn new() -> Self {
        Self {
            storage: Storage::Inline {
                buf: [const { MaybeUninit::uninit() }; N],
                len: 0,
            },
        }
    }

    /// Creates an empty sequence with capacity for at least `capacity`
    /// elements.
    ///
    /// Requests within the inline capacity allocate nothing; larger requests
    /// go straight to heap storage.
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity <= N {
            Self::new()
        } else {
            Self {
                storage: Storage::Heap(Vec::with_capacity(capacity)),
            }
        }
    }

    /// Returns the number of live elements.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Inline { len, .. } => *len,
            Storage::Heap(vec) => vec.len(),
        }
    }

    /// Returns `true` if the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements the current backing storage can hold
    /// without growing.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Inline { .. } => N,
            Storage::Heap(vec) => vec.capacity(),
        }
    }

    /// Returns the compile-time inline capacity `N`.
    pub const fn inline_capacity(&self) -> usize {
        N
    }

    /// Appends an element to the back of the sequence.
    ///
    /// Spills to heap storage when the backing capacity is exhausted, moving
    /// all existing elements. Amortized O(1).
    pub fn push(&mut self, value: T) {
        if self.len() == self.capacity() {
            self.grow(self.len() + 1);
        }

        match &mut self.storage {
            Storage::Inline { buf, len } => {
                buf[*len].write(value);
                *len += 1;
            }
            // Capacity was ensured above, so this never reallocates.
            Storage::Heap(vec) => vec.push(value),
        }
    }

    /// Removes the last element and returns it.
    ///
    /// Backing capacity is retained.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn pop(&mut self) -> T {
        assert!(!self.is_empty(), "pop called on an empty InlineVec");

        match &mut self.storage {
            Storage::Inline { buf, len } => {
                *len -= 1;
                // Safety: slot `len` was initialized and is read exactly once;
                // the decrement above removes it from the live range.
                unsafe { buf[*len].assume_init_read() }
            }
            Storage::Heap(vec) => vec.pop().unwrap(),
        }
    }

    /// Drops every element, keeping the backing storage.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Ensures the backing storage can hold at least `capacity` elements.
    ///
    /// Growth allocates at least double the previous capacity, so repeated
    /// reservations stay amortized O(1).
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            self.grow(capacity);
        }
    }

    /// Grows or shrinks the sequence to exactly `new_len` elements.
    ///
    /// Growing appends default-valued elements; shrinking drops trailing
    /// elements in place. Backing capacity never decreases.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        let len = self.len();

        if new_len > len {
            self.reserve(new_len);
            for _ in len..new_len {
                self.push(T::default());
            }
        } else {
            self.truncate(new_len);
        }
    }

    /// Returns a reference to the first element.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn front(&self) -> &T {
        assert!(!self.is_empty(), "front called on an empty InlineVec");
        &self[0]
    }

    /// Returns a mutable reference to the first element.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn front_mut(&mut self) -> &mut T {
        assert!(!self.is_empty(), "front called on an empty InlineVec");
        &mut self[0]
    }

    /// Returns a reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn back(&self) -> &T {
        assert!(!self.is_empty(), "back called on an empty InlineVec");
        &self[self.len() - 1]
    }

    /// Returns a mutable reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn back_mut(&mut self) -> &mut T {
        assert!(!self.is_empty(), "back called on an empty InlineVec");
        let last = self.len() - 1;
        &mut self[last]
    }

    /// Returns the live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            // Safety: slots `[0, len)` are initialized, contiguous, and
            // properly aligned for `T`.
            Storage::Inline { buf, len } => unsafe {
                slice::from_raw_parts(buf.as_ptr().cast::<T>(), *len)
            },
            Storage::Heap(vec) => vec.as_slice(),
        }
    }

    /// Returns the live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.storage {
            // Safety: as in `as_slice`, plus exclusive access through `&mut`.
            Storage::Inline { buf, len } => unsafe {
                slice::from_raw_parts_mut(buf.as_mut_ptr().cast::<T>(), *len)
            },
            Storage::Heap(vec) => vec.as_mut_slice(),
        }
    }

    /// Replaces the contents with a clone of every element in `other`.
    ///
    /// The two sequences may use different inline capacities; the copy is
    /// stored inline if it fits this sequence's own inline capacity.
    pub fn copy_from<const M: usize>(&mut self, other: &InlineVec<T, M>)
    where
        T: Clone,
    {
        self.clear();
        self.reserve(other.len());

        for item in other.iter() {
            self.push(item.clone());
        }
    }

    /// Moves every element out of `other` into this sequence, replacing the
    /// current contents.
    ///
    /// If `other` had spilled to heap storage, this sequence takes that
    /// storage whole; otherwise the inline elements are moved one by one.
    /// `other` is left empty and remains safe to reuse.
    pub fn take_from<const M: usize>(&mut self, other: &mut InlineVec<T, M>) {
        self.clear();

        match &mut other.storage {
            Storage::Heap(vec) => {
                self.storage = Storage::Heap(mem::take(vec));
            }
            Storage::Inline { buf, len } => {
                let count = *len;
                *len = 0;

                self.reserve(count);
                for slot in buf.iter().take(count) {
                    // Safety: slots `[0, count)` were initialized; zeroing
                    // `len` above retired them, so each is read exactly once.
                    self.push(unsafe { slot.assume_init_read() });
                }
            }
        }
    }

    /// Drops the elements beyond `new_len` and shortens the live range.
    fn truncate(&mut self, new_len: usize) {
        match &mut self.storage {
            Storage::Inline { buf, len } => {
                if new_len >= *len {
                    return;
                }

                let tail = *len - new_len;
                // Retire the slots before dropping so a panicking destructor
                // cannot lead to a double drop.
                *len = new_len;

                // Safety: slots `[new_len, new_len + tail)` were initialized
                // and are no longer part of the live range.
                unsafe {
                    ptr::drop_in_place(slice::from_raw_parts_mut(
                        buf.as_mut_ptr().cast::<T>().add(new_len),
                        tail,
                    ));
                }
            }
            Storage::Heap(vec) => vec.truncate(new_len),
        }
    }

    /// Grows the backing storage to hold at least `min_capacity` elements.
    ///
    /// The new capacity is at least double the previous one. An inline
    /// sequence spills to fresh heap storage; it never migrates back.
    fn grow(&mut self, min_capacity: usize) {
        let new_capacity = min_capacity.max(self.capacity() * 2);

        if let Storage::Heap(vec) = &mut self.storage {
            if vec.capacity() < new_capacity {
                vec.reserve_exact(new_capacity - vec.len());
            }
            return;
        }

        let mut spilled = Vec::with_capacity(new_capacity);

        if let Storage::Inline { buf, len } = &mut self.storage {
            // Safety: slots `[0, len)` are initialized; they are copied into
            // the heap block and retired from the inline buffer in one step.
            unsafe {
                ptr::copy_nonoverlapping(buf.as_ptr().cast::<T>(), spilled.as_mut_ptr(), *len);
                spilled.set_len(*len);
            }
            *len = 0;
        }

        self.storage = Storage::Heap(spilled);
    }
}

impl<T, const N: usize> Drop for InlineVec<T, N> {
    /// Drops the initialized inline elements.
    ///
    /// Heap storage is a `Vec` and cleans up after itself.
    fn drop(&mut self) {
        if let Storage::Inline { buf, len } = &mut self.storage {
            // Safety: slots `[0, len)` are initialized and dropped once.
            unsafe {
                ptr::drop_in_place(slice::from_raw_parts_mut(
                    buf.as_mut_ptr().cast::<T>(),
                    *len,
                ));
            }
        }
    }
}

impl<T, const N: usize> Deref for InlineVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for InlineVec<T, N> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> Default for InlineVec<T, N> {
    /// Returns an empty sequence, equivalent to [`InlineVec::new`].
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Clone for InlineVec<T, N> {
    /// Produces an independent sequence with its own storage.
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity(self.len());
        for item in self.iter() {
            out.push(item.clone());
        }
        out
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for InlineVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

/// Equality is over contents only; the inline capacities of the two sides
/// are irrelevant.
impl<T: PartialEq, const N: usize, const M: usize> PartialEq<InlineVec<T, M>> for InlineVec<T, N> {
    fn eq(&self, other: &InlineVec<T, M>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize> Eq for InlineVec<T, N> {}

impl<T: PartialEq, const N: usize> PartialEq<[T]> for InlineVec<T, N> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a InlineVec<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut InlineVec<T, N> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
