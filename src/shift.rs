use crate::{debruijn::DebruijnIndex, error::ShiftError, ir::Term};

#[derive(Clone, Copy, PartialEq, Debug)]
enum Direction {
    In,
    Out,
}

impl Term {
    /// Moves every variable that is free at `outer_binder` by `amount` in `direction`. Variables
    /// bound inside the term keep their index.
    #[tracing::instrument(level = "trace")]
    fn shifted(
        self,
        amount: DebruijnIndex,
        outer_binder: DebruijnIndex,
        direction: Direction,
    ) -> Result<Term, ShiftError> {
        Ok(match self {
            Term::Abstraction(name, body) => Term::Abstraction(
                name,
                Box::new(body.shifted(amount, outer_binder.shifted_in(), direction)?),
            ),
            Term::Application(lhs, rhs) => Term::Application(
                Box::new(lhs.shifted(amount, outer_binder, direction)?),
                Box::new(rhs.shifted(amount, outer_binder, direction)?),
            ),
            Term::Variable(name, idx) if idx.within(outer_binder) => Term::Variable(name, idx),
            Term::Variable(name, idx) => match direction {
                Direction::In => Term::Variable(name, idx.shifted_in_by(amount)),
                Direction::Out => match idx.shifted_out_by(amount) {
                    Some(shifted) => Term::Variable(name, shifted),
                    None => {
                        return Err(ShiftError {
                            name,
                            index: idx,
                            distance: -i64::from(amount.depth()),
                        })
                    }
                },
            },
        })
    }

    pub fn shifted_in(self, amount: DebruijnIndex) -> Term {
        match self.shifted(amount, DebruijnIndex::INNERMOST, Direction::In) {
            Ok(term) => term,
            Err(err) => unreachable!("shifting in cannot underflow: {err}"),
        }
    }

    pub fn shifted_out(self, amount: DebruijnIndex) -> Result<Term, ShiftError> {
        self.shifted(amount, DebruijnIndex::INNERMOST, Direction::Out)
    }

    /// Adds `distance` to the index of every free variable in the term.
    pub fn shifted_by(self, distance: i32) -> Result<Term, ShiftError> {
        let amount = DebruijnIndex::new(distance.unsigned_abs());
        if distance < 0 {
            self.shifted_out(amount)
        } else {
            Ok(self.shifted_in(amount))
        }
    }
}
