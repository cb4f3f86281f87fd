//! The array form of [`ExclusiveOwner`]: one owned heap slice.
//!
//! The deleter receives the whole `NonNull<[E]>`, so [`DefaultDelete`]
//! drops every element and frees the slice as a `Box<[E]>` would.

use core::iter;
use core::ops::{Index, IndexMut};
use core::ptr::{self, NonNull};
use core::slice;

use alloc::vec::Vec;

use crate::{DefaultDelete, Deleter, ExclusiveOwner};

impl<E> ExclusiveOwner<[E]> {
    /// Allocates `len` default-initialized elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::ExclusiveOwner;
    ///
    /// let mut tab = ExclusiveOwner::<[i32]>::new_slice(100);
    /// tab[0] = 1;
    ///
    /// assert_eq!(tab.len(), 100);
    /// assert_eq!(tab[0], 1);
    /// assert_eq!(tab[99], 0);
    /// ```
    pub fn new_slice(len: usize) -> Self
    where
        E: Default,
    {
        Self::from_vec(iter::repeat_with(E::default).take(len).collect())
    }

    /// Owns the elements of `vec`, shrinking its storage to fit.
    #[inline]
    pub fn from_vec(vec: Vec<E>) -> Self {
        Self::from(vec.into_boxed_slice())
    }

    /// Takes ownership of a slice produced by `Box<[E]>::into_raw` or by
    /// [`release`](ExclusiveOwner::release) on a slice owner.
    ///
    /// A null `data` yields an empty owner.
    ///
    /// # Safety
    ///
    /// - If non-null, `data` and `len` must describe exactly one boxed slice.
    /// - No other owner may adopt the slice.
    #[inline]
    pub unsafe fn from_raw_parts(data: *mut E, len: usize) -> Self {
        // SAFETY: forwarded to the caller.
        unsafe { Self::from_raw(ptr::slice_from_raw_parts_mut(data, len)) }
    }

    /// Moves the elements out into a `Vec`, empty if the owner is.
    #[inline]
    pub fn into_vec(self) -> Vec<E> {
        self.into_box().map(<[E]>::into_vec).unwrap_or_default()
    }
}

impl<E, D: Deleter<[E]>> ExclusiveOwner<[E], D> {
    /// Number of owned elements, `0` if the owner is empty.
    ///
    /// Unlike slices, `len() == 0` does not imply [`is_empty`](ExclusiveOwner::is_empty):
    /// an owner of a zero-length slice is still owning.
    #[inline]
    pub fn len(&self) -> usize {
        self.get().map_or(0, NonNull::len)
    }

    /// The owned elements, or an empty slice if the owner is empty.
    #[inline]
    pub fn as_slice(&self) -> &[E] {
        self.as_ref().unwrap_or(&[])
    }

    /// The owned elements, or an empty slice if the owner is empty.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [E] {
        self.as_mut().unwrap_or(&mut [])
    }

    /// Iterates over the owned elements.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, E> {
        self.as_slice().iter()
    }

    /// Iterates mutably over the owned elements.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, E> {
        self.as_mut_slice().iter_mut()
    }
}

impl<E> From<Vec<E>> for ExclusiveOwner<[E], DefaultDelete> {
    #[inline]
    fn from(vec: Vec<E>) -> Self {
        Self::from_vec(vec)
    }
}

impl<E, D: Deleter<[E]>> Index<usize> for ExclusiveOwner<[E], D> {
    type Output = E;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &E {
        &self.as_slice()[index]
    }
}

impl<E, D: Deleter<[E]>> IndexMut<usize> for ExclusiveOwner<[E], D> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut E {
        &mut self.as_mut_slice()[index]
    }
}

impl<'a, E, D: Deleter<[E]>> IntoIterator for &'a ExclusiveOwner<[E], D> {
    type Item = &'a E;
    type IntoIter = slice::Iter<'a, E>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, E, D: Deleter<[E]>> IntoIterator for &'a mut ExclusiveOwner<[E], D> {
    type Item = &'a mut E;
    type IntoIter = slice::IterMut<'a, E>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
