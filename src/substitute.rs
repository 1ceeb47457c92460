use crate::{debruijn::DebruijnIndex, error::ShiftError, ir::Term};

impl Term {
    /// Beta-substitution: replaces the variable bound by the abstraction this term is the body of
    /// with `value`, then removes that binder.
    #[tracing::instrument(level = "debug", skip_all, fields(term = %self, value = %value))]
    pub fn substituted(self, value: Term) -> Result<Term, ShiftError> {
        let value_shifted = value.shifted_in(DebruijnIndex::ONE);
        let substituted = self.substituted_with(DebruijnIndex::INNERMOST, &value_shifted);
        substituted.shifted_out(DebruijnIndex::ONE)
    }

    /// Replaces each occurrence of the free variable `target` with a copy of `replacement`, shifted
    /// by the number of binders between the root and the occurrence.
    pub fn substituted_with(self, target: DebruijnIndex, replacement: &Term) -> Term {
        #[tracing::instrument(level = "trace")]
        fn walk(term: Term, target: DebruijnIndex, outer: DebruijnIndex, subst: &Term) -> Term {
            match term {
                Term::Variable(name, idx) => {
                    if idx.depth() == target.depth() + outer.depth() {
                        tracing::trace!(%subst, ?outer, ?idx, "shifting in");
                        subst.clone().shifted_in(outer)
                    } else {
                        Term::Variable(name, idx)
                    }
                }
                Term::Abstraction(name, body) => Term::Abstraction(
                    name,
                    Box::new(walk(*body, target, outer.shifted_in(), subst)),
                ),
                Term::Application(lhs, rhs) => Term::Application(
                    Box::new(walk(*lhs, target, outer, subst)),
                    Box::new(walk(*rhs, target, outer, subst)),
                ),
            }
        }

        walk(self, target, DebruijnIndex::INNERMOST, replacement)
    }
}
