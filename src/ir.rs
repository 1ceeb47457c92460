use std::{fmt::Display, str::FromStr};

use extend::ext;
use im::Vector;
use smol_str::SmolStr;

use crate::{debruijn::DebruijnIndex, error::UnknownPolicy};

pub type Ident = SmolStr;

/// A finished term. Every case owns all of its children, so a `Term` is always well formed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Term {
    Abstraction(Ident, Box<Term>),
    Application(Box<Term>, Box<Term>),
    Variable(Ident, DebruijnIndex),
}

impl Term {
    pub fn is_value(&self) -> bool {
        matches!(self, Term::Abstraction(_, _))
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Variable(name, idx) => write!(f, "[{name}={idx}]"),
            Term::Abstraction(name, body) => write!(f, "{{λ {name}. {body}}}"),
            Term::Application(lhs, rhs) => write!(f, "({lhs} <- {rhs})"),
        }
    }
}

/// How names that no enclosing abstraction binds are given an index.
///
/// A free variable is placed above every bound name: its index is the current binding depth plus
/// the alphabet position of its first letter (`a` = 0, case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreeVariables {
    /// Only single-letter free names are accepted.
    #[default]
    SingleLetter,
    /// Longer free names are accepted and indexed by their first letter alone, so `xs` and `x`
    /// share an index.
    FirstLetter,
}

impl FromStr for FreeVariables {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-letter" => Ok(FreeVariables::SingleLetter),
            "first-letter" => Ok(FreeVariables::FirstLetter),
            other => Err(UnknownPolicy(other.to_owned())),
        }
    }
}

#[ext]
impl char {
    fn alphabet_rank(self) -> Option<u32> {
        self.is_ascii_alphabetic()
            .then(|| self.to_ascii_lowercase() as u32 - 'a' as u32)
    }
}

/// Names bound by the abstractions enclosing the current parse position, innermost first.
#[derive(Clone, Debug, Default)]
pub struct BindingContext {
    bound: Vector<Ident>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self {
            bound: Vector::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.bound.len()
    }

    pub fn bind(&mut self, name: Ident) {
        self.bound.push_front(name);
    }

    /// Drops the innermost bindings until only `depth` remain.
    pub fn restore(&mut self, depth: usize) {
        while self.bound.len() > depth {
            self.bound.pop_front();
        }
    }

    pub fn index_of(&self, name: &str) -> Option<DebruijnIndex> {
        self.bound
            .iter()
            .position(|bound| bound.as_str() == name)
            .map(DebruijnIndex::from)
    }

    pub fn free_index(&self, name: &str, policy: FreeVariables) -> Option<DebruijnIndex> {
        let mut chars = name.chars();
        let rank = chars.next()?.alphabet_rank()?;
        if policy == FreeVariables::SingleLetter && chars.next().is_some() {
            return None;
        }
        Some(DebruijnIndex::new(self.depth() as u32 + rank))
    }

    /// Resolves `name` to its index, `None` if it is free and `policy` cannot index it.
    #[tracing::instrument(level = "trace", ret)]
    pub fn resolve(&self, name: &str, policy: FreeVariables) -> Option<DebruijnIndex> {
        self.index_of(name)
            .or_else(|| self.free_index(name, policy))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    macro_rules! t_ {
        ($name: ident @ $idx: expr) => {
            $crate::ir::Term::Variable(
                ::smol_str::SmolStr::from(stringify!($name)),
                $crate::debruijn::DebruijnIndex::new($idx),
            )
        };
        ($v: ident -> $b: expr) => {
            $crate::ir::Term::Abstraction(
                ::smol_str::SmolStr::from(stringify!($v)),
                Box::new($b.into()),
            )
        };
        ($a: expr , $b: expr) => {
            $crate::ir::Term::Application(Box::new($a.into()), Box::new($b.into()))
        };
    }

    pub(crate) use t_ as t;

    /// Parses `source` with the default options, panicking on failure.
    pub(crate) fn term(source: &str) -> Term {
        crate::parse::program(source, crate::parse::ParseOptions::default())
            .unwrap_or_else(|e| panic!("failed to parse {source:?}: {e}"))
    }

    macro_rules! printing_tests {
        ($($test: ident : $a: expr => $b: expr);* $(;)?) => {
            $(
                paste::paste! {
                    #[test]
                    fn [<test_print_ $test>]() {
                        ::pretty_assertions::assert_eq!($a.to_string().as_str(), $b);
                    }
                }
            )*
        };
    }

    printing_tests! {
        var         :   t!(x @ 23)                              => "[x=23]";
        abs         :   t!(x -> t!(x @ 0))                      => "{λ x. [x=0]}";
        app         :   t!(t!(x -> t!(x @ 0)), t!(y @ 24))      => "({λ x. [x=0]} <- [y=24])";
        nested      :   term("l x:Bool. l y:Bool. x y")         => "{λ x. {λ y. ([x=1] <- [y=0])}}";
    }

    #[test]
    fn bound_names_shadow_outer_ones() {
        let mut ctx = BindingContext::new();
        ctx.bind("x".into());
        ctx.bind("y".into());
        ctx.bind("x".into());
        assert_eq!(ctx.index_of("x"), Some(DebruijnIndex::new(0)));
        assert_eq!(ctx.index_of("y"), Some(DebruijnIndex::new(1)));
        assert_eq!(ctx.index_of("z"), None);
        ctx.restore(2);
        assert_eq!(ctx.index_of("x"), Some(DebruijnIndex::new(1)));
        assert_eq!(ctx.depth(), 2);
    }

    #[test]
    fn free_names_sit_above_bound_ones() {
        let mut ctx = BindingContext::new();
        assert_eq!(
            ctx.resolve("a", FreeVariables::SingleLetter),
            Some(DebruijnIndex::new(0))
        );
        ctx.bind("f".into());
        assert_eq!(
            ctx.resolve("Z", FreeVariables::SingleLetter),
            Some(DebruijnIndex::new(26))
        );
        assert_eq!(
            ctx.resolve("f", FreeVariables::SingleLetter),
            Some(DebruijnIndex::INNERMOST)
        );
    }

    #[test]
    fn free_variable_policies() {
        let ctx = BindingContext::new();
        assert_eq!(ctx.resolve("xs", FreeVariables::SingleLetter), None);
        assert_eq!(
            ctx.resolve("xs", FreeVariables::FirstLetter),
            Some(DebruijnIndex::new(23))
        );
        assert_eq!(ctx.resolve("_x", FreeVariables::FirstLetter), None);
        assert_eq!(ctx.resolve("1", FreeVariables::FirstLetter), None);
    }

    #[test]
    fn policy_names() {
        assert_eq!(
            "first-letter".parse::<FreeVariables>().ok(),
            Some(FreeVariables::FirstLetter)
        );
        assert!("letters".parse::<FreeVariables>().is_err());
    }
}
