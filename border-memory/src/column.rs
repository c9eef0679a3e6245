//! Columnar storage of a single field.
use crate::{
    error::{MemoryError, Result},
    schema::{DType, FieldSpec},
};
use ndarray::{ArrayD, Axis, IxDyn, Slice};

/// Values of a field for a number of records.
///
/// The first axis of the underlying array is the batch axis, the remaining axes
/// are the element shape of the field. Memories keep one `Column` of length
/// `capacity` per field and return freshly allocated columns when sampled.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// 32-bit floating point values.
    F32(ArrayD<f32>),

    /// 64-bit signed integers.
    I64(ArrayD<i64>),

    /// Boolean flags.
    Bool(ArrayD<bool>),
}

#[inline]
fn copy_rows<T: Clone>(
    dst: &mut ArrayD<T>,
    dst_start: usize,
    src: &ArrayD<T>,
    src_start: usize,
    n: usize,
) {
    dst.slice_axis_mut(Axis(0), Slice::from(dst_start..dst_start + n))
        .assign(&src.slice_axis(Axis(0), Slice::from(src_start..src_start + n)));
}

fn shape_with_batch(n: usize, elem_shape: &[usize]) -> Vec<usize> {
    let mut shape = Vec::with_capacity(elem_shape.len() + 1);
    shape.push(n);
    shape.extend_from_slice(elem_shape);
    shape
}

impl Column {
    /// Creates a column of `n` default-valued elements of the given field.
    pub fn zeros(spec: &FieldSpec, n: usize) -> Self {
        let shape = IxDyn(&shape_with_batch(n, &spec.shape));
        match spec.dtype {
            DType::F32 => Self::F32(ArrayD::from_elem(shape, 0f32)),
            DType::I64 => Self::I64(ArrayD::from_elem(shape, 0i64)),
            DType::Bool => Self::Bool(ArrayD::from_elem(shape, false)),
        }
    }

    /// Creates a column of `f32` values from a flat vector.
    ///
    /// The length of `data` must be a multiple of the product of `elem_shape`.
    pub fn from_f32(elem_shape: &[usize], data: Vec<f32>) -> Result<Self> {
        let n = Self::infer_len(elem_shape, data.len())?;
        ArrayD::from_shape_vec(IxDyn(&shape_with_batch(n, elem_shape)), data)
            .map(Self::F32)
            .map_err(|e| MemoryError::SchemaMismatch(e.to_string()))
    }

    /// Creates a column of `i64` values from a flat vector.
    pub fn from_i64(elem_shape: &[usize], data: Vec<i64>) -> Result<Self> {
        let n = Self::infer_len(elem_shape, data.len())?;
        ArrayD::from_shape_vec(IxDyn(&shape_with_batch(n, elem_shape)), data)
            .map(Self::I64)
            .map_err(|e| MemoryError::SchemaMismatch(e.to_string()))
    }

    /// Creates a column of boolean values from a flat vector.
    pub fn from_bool(elem_shape: &[usize], data: Vec<bool>) -> Result<Self> {
        let n = Self::infer_len(elem_shape, data.len())?;
        ArrayD::from_shape_vec(IxDyn(&shape_with_batch(n, elem_shape)), data)
            .map(Self::Bool)
            .map_err(|e| MemoryError::SchemaMismatch(e.to_string()))
    }

    fn infer_len(elem_shape: &[usize], len: usize) -> Result<usize> {
        let elem_len: usize = elem_shape.iter().product();
        if elem_len == 0 || len % elem_len != 0 {
            return Err(MemoryError::SchemaMismatch(format!(
                "{} values cannot be split into elements of shape {:?}",
                len, elem_shape
            )));
        }
        Ok(len / elem_len)
    }

    /// Number of elements, i.e., the length of the batch axis.
    pub fn len(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    /// Returns `true` if the column has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I64(_) => DType::I64,
            Self::Bool(_) => DType::Bool,
        }
    }

    /// Shape including the batch axis.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F32(a) => a.shape(),
            Self::I64(a) => a.shape(),
            Self::Bool(a) => a.shape(),
        }
    }

    /// Shape of a single element.
    pub fn elem_shape(&self) -> &[usize] {
        let shape = self.shape();
        if shape.is_empty() {
            shape
        } else {
            &shape[1..]
        }
    }

    /// Checks that the column holds elements of the given field.
    pub fn conforms_to(&self, spec: &FieldSpec) -> Result<()> {
        if self.shape().is_empty() {
            return Err(MemoryError::SchemaMismatch(format!(
                "field `{}` has no batch axis",
                spec.name
            )));
        }
        if self.dtype() != spec.dtype {
            return Err(MemoryError::SchemaMismatch(format!(
                "field `{}` expects {:?}, got {:?}",
                spec.name,
                spec.dtype,
                self.dtype()
            )));
        }
        if self.elem_shape() != spec.shape.as_slice() {
            return Err(MemoryError::SchemaMismatch(format!(
                "field `{}` expects element shape {:?}, got {:?}",
                spec.name,
                spec.shape,
                self.elem_shape()
            )));
        }
        Ok(())
    }

    /// Gathers the elements at `ixs` into a new column, keeping the order of `ixs`.
    pub fn select(&self, ixs: &[usize]) -> Self {
        match self {
            Self::F32(a) => Self::F32(a.select(Axis(0), ixs)),
            Self::I64(a) => Self::I64(a.select(Axis(0), ixs)),
            Self::Bool(a) => Self::Bool(a.select(Axis(0), ixs)),
        }
    }

    /// Copies `n` elements of `src` starting at `src_start` into this column at `dst_start`.
    pub fn copy_rows_from(
        &mut self,
        dst_start: usize,
        src: &Column,
        src_start: usize,
        n: usize,
    ) -> Result<()> {
        match (self, src) {
            (Self::F32(dst), Self::F32(src)) => copy_rows(dst, dst_start, src, src_start, n),
            (Self::I64(dst), Self::I64(src)) => copy_rows(dst, dst_start, src, src_start, n),
            (Self::Bool(dst), Self::Bool(src)) => copy_rows(dst, dst_start, src, src_start, n),
            (dst, src) => {
                return Err(MemoryError::SchemaMismatch(format!(
                    "cannot copy {:?} into {:?}",
                    src.dtype(),
                    dst.dtype()
                )))
            }
        }
        Ok(())
    }

    /// Returns `true` if any value of the element at `ix` is non-zero.
    ///
    /// This is how terminal flags are read regardless of their element type.
    pub fn is_set(&self, ix: usize) -> bool {
        match self {
            Self::F32(a) => a.index_axis(Axis(0), ix).iter().any(|v| *v != 0.0),
            Self::I64(a) => a.index_axis(Axis(0), ix).iter().any(|v| *v != 0),
            Self::Bool(a) => a.index_axis(Axis(0), ix).iter().any(|v| *v),
        }
    }

    /// Returns the underlying array if the column holds `f32` values.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            Self::F32(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the underlying array if the column holds `i64` values.
    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            Self::I64(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the underlying array if the column holds boolean values.
    pub fn as_bool(&self) -> Option<&ArrayD<bool>> {
        match self {
            Self::Bool(a) => Some(a),
            _ => None,
        }
    }
}

impl From<ArrayD<f32>> for Column {
    fn from(a: ArrayD<f32>) -> Self {
        Self::F32(a)
    }
}

impl From<ArrayD<i64>> for Column {
    fn from(a: ArrayD<i64>) -> Self {
        Self::I64(a)
    }
}

impl From<ArrayD<bool>> for Column {
    fn from(a: ArrayD<bool>) -> Self {
        Self::Bool(a)
    }
}
