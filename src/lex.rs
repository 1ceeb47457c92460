use std::fmt::Display;

use nom::branch::alt;
use nom::bytes::complete::take_till1;
use nom::character::complete::multispace0;
use nom::combinator::value;
use nom::error::VerboseError;
use nom::IResult;
use nom::Parser;
use nom_supreme::tag::complete::tag;
use nom_supreme::ParserExt;

use crate::{error::LexError, ir::Ident};

type LexResult<'a, O, E = VerboseError<&'a str>> = IResult<&'a str, O, E>;
type Input<'a> = &'a str;

const LAMBDA_WORD: &str = "l";
const BOOL_WORD: &str = "Bool";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Variable(Ident),
    Lambda,
    LambdaDot,
    OpenParen,
    CloseParen,
    Colon,
    Arrow,
    KeywordBool,
    End,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Variable(name) => write!(f, "{name}"),
            Token::Lambda => write!(f, "λ"),
            Token::LambdaDot => write!(f, "."),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::Colon => write!(f, ":"),
            Token::Arrow => write!(f, "→"),
            Token::KeywordBool => write!(f, "Ɓ"),
            Token::End => write!(f, "<END>"),
        }
    }
}

/// A token together with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub offset: usize,
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | '(' | ')' | ':' | '-' | 'λ' | '\\')
}

fn punctuation(input: Input<'_>) -> LexResult<'_, Token> {
    alt((
        value(Token::OpenParen, tag("(")),
        value(Token::CloseParen, tag(")")),
        value(Token::LambdaDot, tag(".")),
        value(Token::Colon, tag(":")),
        value(Token::Arrow, tag("->")),
        value(Token::Lambda, alt((tag("λ"), tag("\\")))),
    ))(input)
}

fn word(input: Input<'_>) -> LexResult<'_, Token> {
    take_till1(is_separator)
        .map(|word: &str| match word {
            LAMBDA_WORD => Token::Lambda,
            BOOL_WORD => Token::KeywordBool,
            name => Token::Variable(name.into()),
        })
        .parse(input)
}

fn token(input: Input<'_>) -> LexResult<'_, Token> {
    alt((punctuation.context("punctuation"), word.context("word")))(input)
}

/// Splits program text into [`Lexeme`]s. The stream ends with a single [`Token::End`], or stops
/// right after the first [`LexError`].
pub struct Lexer<'a> {
    source: Input<'a>,
    rest: Input<'a>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: Input<'a>) -> Self {
        Self {
            source,
            rest: source,
            finished: false,
        }
    }

    fn offset(&self) -> usize {
        self.source.len() - self.rest.len()
    }

    fn invalid(&mut self) -> LexError {
        self.finished = true;
        let text = self.rest.chars().next().map(String::from).unwrap_or_default();
        LexError::InvalidToken {
            text: text.into(),
            offset: self.offset(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Lexeme, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Ok((rest, _)) = multispace0::<_, VerboseError<&str>>(self.rest) {
            self.rest = rest;
        }
        let offset = self.offset();
        if self.rest.is_empty() {
            self.finished = true;
            return Some(Ok(Lexeme {
                token: Token::End,
                offset,
            }));
        }
        match token(self.rest) {
            Ok((rest, token)) => {
                self.rest = rest;
                tracing::trace!(%token, offset, "lexed");
                Some(Ok(Lexeme { token, offset }))
            }
            Err(_) => Some(Err(self.invalid())),
        }
    }
}

/// Tokenizes the whole of `source`, including the trailing [`Token::End`].
pub fn tokens(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source)
        .map(|lexeme| lexeme.map(|lexeme| lexeme.token))
        .collect()
}
