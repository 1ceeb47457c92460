use crate::{error::EvalError, ir::Term};

/// Outcome of a single reduction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One subterm was rewritten.
    Reduced(Term),
    /// No rule applies: the term is in normal form and is handed back unchanged.
    Stuck(Term),
}

impl Step {
    fn map(self, f: impl FnOnce(Term) -> Term) -> Step {
        match self {
            Step::Reduced(term) => Step::Reduced(f(term)),
            Step::Stuck(term) => Step::Stuck(f(term)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    NormalForm,
    /// The step limit ran out before a normal form was reached.
    StepLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub term: Term,
    pub steps: usize,
    pub halt: Halt,
}

/// Call-by-value small-step evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    fuel: Option<usize>,
}

impl Evaluator {
    /// An evaluator without a step limit. A divergent term keeps it busy forever.
    pub fn new() -> Self {
        Self { fuel: None }
    }

    /// An evaluator that gives up after `fuel` reductions.
    pub fn with_fuel(fuel: usize) -> Self {
        Self { fuel: Some(fuel) }
    }

    /// Performs one reduction, leftmost-outermost under call-by-value.
    #[tracing::instrument(level = "trace")]
    pub fn eval1(term: Term) -> Result<Step, EvalError> {
        Ok(match term {
            Term::Application(lhs, rhs) if lhs.is_value() && rhs.is_value() => match *lhs {
                Term::Abstraction(_, body) => Step::Reduced(body.substituted(*rhs)?),
                lhs => Step::Stuck(Term::Application(Box::new(lhs), rhs)),
            },
            Term::Application(lhs, rhs) if lhs.is_value() => {
                Self::eval1(*rhs)?.map(|rhs| Term::Application(lhs, Box::new(rhs)))
            }
            Term::Application(lhs, rhs) => {
                Self::eval1(*lhs)?.map(|lhs| Term::Application(Box::new(lhs), rhs))
            }
            term => Step::Stuck(term),
        })
    }

    /// Reduces `term` until no rule applies or the fuel runs out.
    #[tracing::instrument(level = "debug", skip_all, fields(term = %term))]
    pub fn eval(&self, term: Term) -> Result<Evaluation, EvalError> {
        let mut term = term;
        let mut steps = 0;
        loop {
            if self.fuel.map_or(false, |fuel| steps >= fuel) {
                tracing::debug!(steps, "step limit reached");
                return Ok(Evaluation {
                    term,
                    steps,
                    halt: Halt::StepLimit,
                });
            }
            match Self::eval1(term)? {
                Step::Reduced(next) => {
                    steps += 1;
                    tracing::trace!(steps, term = %next, "reduced");
                    term = next;
                }
                Step::Stuck(normal) => {
                    tracing::debug!(steps, term = %normal, "normal form");
                    return Ok(Evaluation {
                        term: normal,
                        steps,
                        halt: Halt::NormalForm,
                    });
                }
            }
        }
    }
}
