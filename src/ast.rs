/*
Grammar:

Program = Term
Term    = Abs | App | Var | "(" Term ")"
λ       = "l" | "λ" | "\"
Abs     = λ Var ":" Type "." Term
App     = Term ws Term
Type    = "Bool" ("->" "Bool")*
Var     = any run of characters other than whitespace and ".():-λ\"

An abstraction body extends as far to the right as possible.
*/

use std::{fmt::Display, mem};

use crate::{
    debruijn::DebruijnIndex,
    error::StructuralError,
    ir::{Ident, Term},
};

/// Type annotation on an abstraction. Parsed, then thrown away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Bool,
    Arrow(Box<Type>, Box<Type>),
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => write!(f, "Bool"),
            Type::Arrow(from, to) => write!(f, "({from} → {to})"),
        }
    }
}

/// An entry on the builder's stack: a term that may still be missing pieces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartialTerm {
    #[default]
    Empty,
    Abstraction {
        name: Ident,
        body: Option<Box<PartialTerm>>,
        /// Set once the closing parenthesis has been seen; the body takes no further terms.
        sealed: bool,
    },
    Application(Box<PartialTerm>, Box<PartialTerm>),
    Variable(Ident, DebruijnIndex),
}

impl PartialTerm {
    pub fn abstraction(name: Ident) -> Self {
        PartialTerm::Abstraction {
            name,
            body: None,
            sealed: false,
        }
    }

    /// Whether this node has everything it needs. Children are checked when they are combined in,
    /// so only the node itself is inspected.
    pub fn is_complete(&self) -> bool {
        match self {
            PartialTerm::Empty => false,
            PartialTerm::Abstraction { name, body, .. } => !name.is_empty() && body.is_some(),
            PartialTerm::Application(_, _) => true,
            PartialTerm::Variable(name, _) => !name.is_empty(),
        }
    }

    pub fn is_open_abstraction(&self) -> bool {
        matches!(self, PartialTerm::Abstraction { sealed: false, .. })
    }

    pub fn seal(&mut self) {
        if let PartialTerm::Abstraction { sealed, .. } = self {
            *sealed = true;
        }
    }

    /// Attaches `next` to the right of this term.
    ///
    /// An open abstraction hands `next` to its body; everything else turns into an application
    /// with `next` as the argument.
    #[tracing::instrument(level = "trace")]
    pub fn combine(&mut self, next: PartialTerm) -> Result<(), StructuralError> {
        if !next.is_complete() {
            return Err(StructuralError::Incomplete {
                what: "combined term",
            });
        }
        match self {
            PartialTerm::Empty => *self = next,
            PartialTerm::Abstraction {
                body: Some(body),
                sealed: false,
                ..
            } => body.combine(next)?,
            PartialTerm::Abstraction {
                body: body @ None,
                sealed: false,
                ..
            } => *body = Some(Box::new(next)),
            _ => {
                let current = mem::take(self);
                *self = PartialTerm::Application(Box::new(current), Box::new(next));
            }
        }
        Ok(())
    }
}

impl TryFrom<PartialTerm> for Term {
    type Error = StructuralError;

    fn try_from(partial: PartialTerm) -> Result<Self, Self::Error> {
        match partial {
            PartialTerm::Empty => Err(StructuralError::Incomplete { what: "empty slot" }),
            PartialTerm::Abstraction { body: None, .. } => Err(StructuralError::Incomplete {
                what: "abstraction without a body",
            }),
            PartialTerm::Abstraction {
                name,
                body: Some(body),
                ..
            } => Ok(Term::Abstraction(name, Box::new(Term::try_from(*body)?))),
            PartialTerm::Application(lhs, rhs) => Ok(Term::Application(
                Box::new(Term::try_from(*lhs)?),
                Box::new(Term::try_from(*rhs)?),
            )),
            PartialTerm::Variable(name, _) if name.is_empty() => {
                Err(StructuralError::Incomplete {
                    what: "variable without a name",
                })
            }
            PartialTerm::Variable(name, idx) => Ok(Term::Variable(name, idx)),
        }
    }
}
