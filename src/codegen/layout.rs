//! Declaration and array model
//!
//! Arrays are stored with one padding slot on each side of every
//! dimension: a logical extent of `n` becomes a physical list of `n + 2`
//! elements. Slot 0 and slot `n + 1` are never written by generated code,
//! which lets a 1-based PL/I subscript index the 0-based list directly,
//! with no offset arithmetic at the access site.

use crate::error::TranslateError;
use crate::parser::ast::{DataType, DeclItem, SourceLocation};

/// Largest supported array rank
pub const MAX_RANK: usize = 2;

/// Physical padding added to every dimension
pub const PADDING: usize = 2;

/// Storage classification of a declared name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    ScalarNumeric,
    ScalarText,
    ArrayNumeric,
    ArrayText,
}

impl VarKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, VarKind::ScalarNumeric | VarKind::ArrayNumeric)
    }

    /// Literal each storage slot starts out with
    fn initial_element(self) -> &'static str {
        if self.is_numeric() {
            "0"
        } else {
            "''"
        }
    }
}

/// Logical extents of one array, 1 or 2 dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLayout {
    extents: Vec<usize>,
}

impl ArrayLayout {
    /// Validate declared extents: one or two dimensions, each at least 1
    pub fn new(dims: &[i64], location: SourceLocation) -> Result<Self, TranslateError> {
        if dims.len() > MAX_RANK {
            return Err(TranslateError::declaration(
                format!(
                    "Arrays of {} dimensions are not supported (at most {})",
                    dims.len(),
                    MAX_RANK
                ),
                location,
            ));
        }

        let extents = dims
            .iter()
            .map(|&n| {
                usize::try_from(n).ok().filter(|n| *n > 0).ok_or_else(|| {
                    TranslateError::declaration(
                        format!("Array extent must be at least 1, found {}", n),
                        location,
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { extents })
    }

    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Storage length per dimension (logical extent + padding)
    pub fn physical_extents(&self) -> Vec<usize> {
        self.extents.iter().map(|n| n + PADDING).collect()
    }
}

/// A declared variable as seen by the code generator
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub data_type: DataType,
    pub kind: VarKind,
    pub layout: Option<ArrayLayout>,
    pub location: SourceLocation,
}

impl Symbol {
    pub fn from_item(item: &DeclItem, data_type: &DataType) -> Result<Self, TranslateError> {
        let layout = if item.dims.is_empty() {
            None
        } else {
            Some(ArrayLayout::new(&item.dims, item.location)?)
        };

        let kind = match (data_type.is_numeric(), layout.is_some()) {
            (true, false) => VarKind::ScalarNumeric,
            (false, false) => VarKind::ScalarText,
            (true, true) => VarKind::ArrayNumeric,
            (false, true) => VarKind::ArrayText,
        };

        Ok(Self {
            name: item.name.clone(),
            data_type: data_type.clone(),
            kind,
            layout,
            location: item.location,
        })
    }

    /// Number of subscripts a reference must carry
    pub fn rank(&self) -> usize {
        self.layout.as_ref().map_or(0, ArrayLayout::rank)
    }

    /// Right-hand side of the initializing assignment
    pub fn initializer(&self) -> String {
        let element = self.kind.initial_element();
        let extents = self
            .layout
            .as_ref()
            .map(ArrayLayout::physical_extents)
            .unwrap_or_default();

        match extents.as_slice() {
            [] => element.to_string(),
            [n] => format!("[{}] * {}", element, n),
            [rows, cols, ..] => format!("[[{}] * {} for _ in range({})]", element, cols, rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, dims: &[i64]) -> DeclItem {
        DeclItem {
            name: name.to_string(),
            dims: dims.to_vec(),
            location: SourceLocation::new(1, 1),
        }
    }

    const BIN: DataType = DataType::FixedBinary {
        precision: Some(15),
    };

    const TEXT: DataType = DataType::Character {
        length: 10,
        varying: false,
    };

    #[test]
    fn test_scalar_initializers() {
        let x = Symbol::from_item(&item("x", &[]), &BIN).unwrap();
        assert_eq!(x.kind, VarKind::ScalarNumeric);
        assert_eq!(x.initializer(), "0");

        let s = Symbol::from_item(&item("s", &[]), &TEXT).unwrap();
        assert_eq!(s.kind, VarKind::ScalarText);
        assert_eq!(s.initializer(), "''");
    }

    #[test]
    fn test_array_padding() {
        let a = Symbol::from_item(&item("a", &[10]), &BIN).unwrap();
        assert_eq!(a.kind, VarKind::ArrayNumeric);
        assert_eq!(a.rank(), 1);
        assert_eq!(a.initializer(), "[0] * 12");

        let m = Symbol::from_item(&item("m", &[3, 4]), &TEXT).unwrap();
        assert_eq!(m.kind, VarKind::ArrayText);
        assert_eq!(m.layout.as_ref().unwrap().physical_extents(), vec![5, 6]);
        assert_eq!(m.initializer(), "[[''] * 6 for _ in range(5)]");
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(
            Symbol::from_item(&item("z", &[0]), &BIN),
            Err(TranslateError::Declaration { .. })
        ));
        assert!(matches!(
            Symbol::from_item(&item("c", &[2, 2, 2]), &BIN),
            Err(TranslateError::Declaration { .. })
        ));
    }
}
