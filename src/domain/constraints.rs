use super::Ring;

/// Allowed region plus forbidden obstacles.
///
/// An empty `outer` ring means "unconstrained", not "constrain to nothing".
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    pub outer: Ring,
    pub inner: Vec<Ring>,
}

impl ConstraintSet {
    pub fn new(outer: Ring, inner: Vec<Ring>) -> Self {
        Self { outer, inner }
    }

    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn has_outer(&self) -> bool {
        !self.outer.is_empty()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.outer.is_empty() && self.inner.is_empty()
    }
}
