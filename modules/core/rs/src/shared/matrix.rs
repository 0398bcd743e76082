use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use derive_getters::Dissolve;
use derive_more::{Constructor, Display};

use super::{Element, StoreError};

/// Dimensions of a row-major 2D buffer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Display, Constructor, Dissolve)]
#[display("{rows}x{cols}")]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// True if any of the dimensions is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Flat row-major index of the cell, if it's inside the shape.
    #[inline(always)]
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }
}

pub(crate) struct Buffer<T: Element> {
    shape: Shape,
    cells: Box<[T::Atomic]>,
}

impl<T: Element> Buffer<T> {
    pub(crate) fn zeroed(shape: Shape) -> Self {
        let cells = (0..shape.len()).map(|_| T::zeroed()).collect();
        Self { shape, cells }
    }
}

/// A view over a named shared buffer.
///
/// Handles are produced by [`super::Store::allocate`] and [`super::Store::attach`] and
/// must be returned through [`super::Store::release`]. Any number of workers may read
/// and write through the same handle; writes to the same cell must not race.
pub struct Handle<T: Element> {
    name: String,
    pub(crate) buffer: Arc<Buffer<T>>,
}

impl<T: Element> Handle<T> {
    pub(crate) fn new(name: String, buffer: Arc<Buffer<T>>) -> Self {
        Self { name, buffer }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Shape {
        self.buffer.shape
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Result<T, StoreError> {
        let ind = self.index(row, col)?;
        Ok(T::load(&self.buffer.cells[ind]))
    }

    #[inline(always)]
    pub fn set(&self, row: usize, col: usize, value: T) -> Result<(), StoreError> {
        let ind = self.index(row, col)?;
        T::store(&self.buffer.cells[ind], value);
        Ok(())
    }

    /// Row-major snapshot of the whole buffer.
    pub fn rows(&self) -> Vec<Vec<T>> {
        let shape = self.shape();
        if shape.is_empty() {
            return Vec::new();
        }
        let rows = self.buffer.cells.chunks(shape.cols);
        rows.map(|row| row.iter().map(T::load).collect()).collect()
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Result<usize, StoreError> {
        let shape = self.shape();
        match shape.index(row, col) {
            Some(ind) => Ok(ind),
            None => Err(StoreError::OutOfBounds {
                name: self.name.clone(),
                row,
                col,
                shape,
            }),
        }
    }
}

impl<T: Element> Debug for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("name", &self.name)
            .field("item", &T::NAME)
            .field("shape", &self.shape())
            .finish()
    }
}
