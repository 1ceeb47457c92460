pub mod ast;
pub mod debruijn;
pub mod error;
pub mod eval;
pub mod ir;
pub mod lex;
pub mod parse;
pub mod shift;
pub mod substitute;

use crate::{
    error::Error,
    eval::{Evaluation, Evaluator},
    parse::ParseOptions,
};

/// Parses `source` and evaluates it to normal form (or until `evaluator` runs out of fuel).
pub fn run(source: &str, options: ParseOptions, evaluator: &Evaluator) -> Result<Evaluation, Error> {
    let term = parse::program(source, options)?;
    tracing::debug!(%term, "parsed");
    Ok(evaluator.eval(term)?)
}
