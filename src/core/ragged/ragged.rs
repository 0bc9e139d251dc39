use std::ops::{Index, IndexMut};

use crate::error::{EsvmError, Result};

/// Element type that can live inside a [`Ragged`] container.
///
/// Leaves report a depth of `0` and are default-constructed when a container
/// is pre-sized; a `Ragged<E>` is one level deeper than `E`.
pub trait Nested: Sized {
    const DEPTH: usize;

    /// Builds a value whose level `i` holds `sizes[i]` branches. Levels past
    /// the end of `sizes` are left empty.
    fn with_sizes(sizes: &[usize]) -> Self;

    /// Number of leaves reachable from this value.
    fn leaf_count(&self) -> usize;
}

/// Implements [`Nested`] as a leaf for types with a meaningful `Default`.
#[macro_export]
macro_rules! nested_leaf {
    ($($t:ty),* $(,)?) => {
        $(
            impl $crate::core::ragged::Nested for $t {
                const DEPTH: usize = 0;

                fn with_sizes(_sizes: &[usize]) -> Self {
                    <$t as ::std::default::Default>::default()
                }

                fn leaf_count(&self) -> usize {
                    1
                }
            }
        )*
    };
}

nested_leaf!(f64, f32, i32, i64, u32, u64, usize, bool, String, Vec<f64>);

/// Nested sequence whose sibling branches may have independent lengths.
///
/// A `Ragged<Ragged<T>>` is a two-level container over leaves `T`. Levels can
/// be pre-sized (see [`Ragged::uniform`] and [`Ragged::with_sizes`]) or grown
/// one branch at a time with [`Ragged::push`]; growing one branch never
/// touches its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct Ragged<E> {
    branches: Vec<E>,
}

impl<E> Default for Ragged<E> {
    fn default() -> Self {
        Self {
            branches: Vec::new(),
        }
    }
}

impl<E> Ragged<E> {
    /// Empty, append-growable container.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            branches: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&E> {
        let len = self.branches.len();
        self.branches
            .get(index)
            .ok_or(EsvmError::Index { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut E> {
        let len = self.branches.len();
        self.branches
            .get_mut(index)
            .ok_or(EsvmError::Index { index, len })
    }

    /// Replaces the branch at `index`, returning the previous value.
    pub fn set(&mut self, index: usize, value: E) -> Result<E> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Appends to this branch only and returns the index of the new element.
    pub fn push(&mut self, value: E) -> usize {
        self.branches.push(value);
        self.branches.len() - 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.branches.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, E> {
        self.branches.iter_mut()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.branches
    }

    pub fn into_inner(self) -> Vec<E> {
        self.branches
    }
}

impl<E: Nested> Ragged<E> {
    /// Every level gets `n` branches; leaves are default-constructed.
    pub fn uniform(n: usize) -> Self {
        <Self as Nested>::with_sizes(&vec![n; <Self as Nested>::DEPTH])
    }

    /// Level `i` gets `sizes[i]` branches, applied uniformly within the level.
    pub fn with_sizes(sizes: &[usize]) -> Self {
        <Self as Nested>::with_sizes(sizes)
    }

    pub fn depth(&self) -> usize {
        <Self as Nested>::DEPTH
    }

    pub fn leaf_count(&self) -> usize {
        <Self as Nested>::leaf_count(self)
    }
}

impl<E> Ragged<Ragged<E>> {
    /// Length of every child branch.
    pub fn lengths(&self) -> Vec<usize> {
        self.branches.iter().map(Ragged::len).collect()
    }
}

impl<E: Nested> Nested for Ragged<E> {
    const DEPTH: usize = E::DEPTH + 1;

    fn with_sizes(sizes: &[usize]) -> Self {
        match sizes.split_first() {
            Some((&n, rest)) => Self {
                branches: (0..n).map(|_| E::with_sizes(rest)).collect(),
            },
            None => Self::new(),
        }
    }

    fn leaf_count(&self) -> usize {
        self.branches.iter().map(Nested::leaf_count).sum()
    }
}

impl<E> Index<usize> for Ragged<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        &self.branches[index]
    }
}

impl<E> IndexMut<usize> for Ragged<E> {
    fn index_mut(&mut self, index: usize) -> &mut E {
        &mut self.branches[index]
    }
}

impl<E> From<Vec<E>> for Ragged<E> {
    fn from(branches: Vec<E>) -> Self {
        Self { branches }
    }
}

impl<E> FromIterator<E> for Ragged<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            branches: iter.into_iter().collect(),
        }
    }
}

impl<E> IntoIterator for Ragged<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.branches.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Ragged<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.branches.iter()
    }
}
