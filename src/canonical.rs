//! Canonical Projection Module
//!
//! This module provides the ordering-insensitive comparison discipline shared by the
//! SED-ML and COMBINE data models.
//!
//! # Key Components
//!
//! - [`Tuple`]: A totally ordered, hashable projection of an entity
//! - [`Canonical`]: Trait implemented by every entity, providing `to_tuple` and `is_equal`
//! - [`none_sorted`]: Builds a sorted sequence from child projections
//! - [`are_lists_equal`]: Compares two lists of entities as unordered multisets
//!
//! Missing values project to [`Tuple::None`], which sorts before any other value.

use std::sync::Arc;

use ordered_float::OrderedFloat;

/// A canonical projection of an entity.
///
/// Variant order matters: the derived `Ord` compares variants first, so `None`
/// sorts before any value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tuple {
    None,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Seq(Vec<Tuple>),
}

impl Tuple {
    /// Creates a sequence projection from the given items, keeping their order.
    pub fn seq(items: impl IntoIterator<Item = Tuple>) -> Self {
        Tuple::Seq(items.into_iter().collect())
    }
}

impl From<bool> for Tuple {
    fn from(value: bool) -> Self {
        Tuple::Bool(value)
    }
}

impl From<i64> for Tuple {
    fn from(value: i64) -> Self {
        Tuple::Int(value)
    }
}

impl From<u32> for Tuple {
    fn from(value: u32) -> Self {
        Tuple::Int(value as i64)
    }
}

impl From<f64> for Tuple {
    fn from(value: f64) -> Self {
        Tuple::Float(OrderedFloat(value))
    }
}

impl From<&str> for Tuple {
    fn from(value: &str) -> Self {
        Tuple::Str(value.to_string())
    }
}

impl From<&String> for Tuple {
    fn from(value: &String) -> Self {
        Tuple::Str(value.clone())
    }
}

impl From<String> for Tuple {
    fn from(value: String) -> Self {
        Tuple::Str(value)
    }
}

impl<T: Into<Tuple>> From<Option<T>> for Tuple {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Tuple::None)
    }
}

/// Structural projection and comparison of data model entities.
///
/// Implementors must keep both methods consistent: two entities are `is_equal`
/// exactly when their tuple projections are equal.
pub trait Canonical {
    /// Returns a fully ordered projection with children sorted.
    fn to_tuple(&self) -> Tuple;

    /// Deep structural equality, insensitive to the order of child lists.
    fn is_equal(&self, other: &Self) -> bool;
}

impl<T: Canonical + ?Sized> Canonical for Arc<T> {
    fn to_tuple(&self) -> Tuple {
        self.as_ref().to_tuple()
    }

    fn is_equal(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || self.as_ref().is_equal(other.as_ref())
    }
}

/// Builds a sorted sequence projection, placing missing values first.
///
/// # Arguments
///
/// * `items` - Projections of child entities
///
/// # Returns
///
/// A [`Tuple::Seq`] with the items in ascending order.
pub fn none_sorted(items: impl IntoIterator<Item = Tuple>) -> Tuple {
    let mut items: Vec<Tuple> = items.into_iter().collect();
    items.sort();
    Tuple::Seq(items)
}

/// Projects a list of entities into a sorted sequence.
pub fn sorted_tuples<T: Canonical>(items: &[T]) -> Tuple {
    none_sorted(items.iter().map(Canonical::to_tuple))
}

/// Projects an optional entity, mapping `None` to [`Tuple::None`].
pub fn optional_tuple<T: Canonical>(item: &Option<T>) -> Tuple {
    item.as_ref().map_or(Tuple::None, Canonical::to_tuple)
}

/// Compares two optional entities structurally.
pub fn are_options_equal<T: Canonical>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.is_equal(b),
        _ => false,
    }
}

/// Compares two floats the way their projections compare: NaN equals NaN.
pub fn are_floats_equal(a: f64, b: f64) -> bool {
    OrderedFloat(a) == OrderedFloat(b)
}

/// Compares two optional floats, see [`are_floats_equal`].
pub fn are_optional_floats_equal(a: Option<f64>, b: Option<f64>) -> bool {
    a.map(OrderedFloat) == b.map(OrderedFloat)
}

/// Determines whether two lists contain the same entities, regardless of order.
///
/// Every element of `a` must be matched by a distinct, structurally equal element
/// of `b`, so repeated entities are counted.
///
/// # Arguments
///
/// * `a` - First list of entities
/// * `b` - Second list of entities
///
/// # Returns
///
/// `true` if both lists are equal as multisets.
pub fn are_lists_equal<T: Canonical>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        let candidate = b
            .iter()
            .enumerate()
            .position(|(idx, other)| !used[idx] && item.is_equal(other));

        match candidate {
            Some(idx) => {
                used[idx] = true;
                true
            }
            None => false,
        }
    })
}
