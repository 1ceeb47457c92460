use std::fmt::Display;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct DebruijnIndex {
    depth: u32,
}

impl DebruijnIndex {
    pub const ONE: DebruijnIndex = DebruijnIndex::new(1);
    pub const INNERMOST: DebruijnIndex = DebruijnIndex::new(0);

    #[must_use]
    pub const fn new(depth: u32) -> Self {
        DebruijnIndex { depth }
    }

    #[must_use]
    pub const fn depth(self) -> u32 {
        self.depth
    }

    /// Whether this index refers to a binder inside `outer_binder` levels of abstraction.
    #[must_use]
    pub const fn within(self, outer_binder: DebruijnIndex) -> bool {
        self.depth < outer_binder.depth
    }

    #[must_use]
    pub const fn shifted_in_by(self, amount: DebruijnIndex) -> DebruijnIndex {
        DebruijnIndex::new(self.depth + amount.depth)
    }

    #[must_use]
    pub const fn shifted_out_by(self, amount: DebruijnIndex) -> Option<DebruijnIndex> {
        if self.within(amount) {
            None
        } else {
            Some(DebruijnIndex::new(self.depth - amount.depth))
        }
    }

    #[must_use]
    pub const fn shifted_in(self) -> DebruijnIndex {
        self.shifted_in_by(DebruijnIndex::ONE)
    }
}

impl From<usize> for DebruijnIndex {
    fn from(depth: usize) -> Self {
        DebruijnIndex::new(depth as u32)
    }
}

impl Display for DebruijnIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.depth)
    }
}
