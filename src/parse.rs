use crate::{
    ast::{PartialTerm, Type},
    error::{LexError, ParseError, StructuralError, SyntaxError},
    ir::{BindingContext, FreeVariables, Ident, Term},
    lex::{Lexeme, Lexer, Token},
};

type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub free_variables: FreeVariables,
}

/// Parses a whole program.
pub fn program(source: &str, options: ParseOptions) -> ParseResult<Term> {
    Parser::new(Lexer::new(source), options).parse_program()
}

/// An open parenthesis: where its group starts on the term stack, and how many names were bound
/// when it was opened.
#[derive(Debug, Clone, Copy)]
struct Group {
    slot: usize,
    depth: usize,
}

/// Builds a [`Term`] from a token stream, one token at a time.
///
/// Terms under construction live on a stack of [`PartialTerm`] slots. A slot is pushed for the
/// program, for every `(` and for every abstraction, and each newly read variable is combined into
/// the topmost slot.
pub struct Parser<I> {
    tokens: I,
    options: ParseOptions,
    bindings: BindingContext,
    stack: Vec<PartialTerm>,
    groups: Vec<Group>,
    offset: usize,
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Lexeme, LexError>>,
{
    pub fn new(tokens: I, options: ParseOptions) -> Self {
        Self {
            tokens,
            options,
            bindings: BindingContext::new(),
            stack: vec![PartialTerm::Empty],
            groups: Vec::new(),
            offset: 0,
        }
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        match self.tokens.next().transpose()? {
            Some(Lexeme { token, offset }) => {
                self.offset = offset;
                Ok(token)
            }
            None => Ok(Token::End),
        }
    }

    fn expected(&self, expected: &'static str, found: Token) -> ParseError {
        SyntaxError::Expected {
            expected,
            found,
            offset: self.offset,
        }
        .into()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn parse_program(mut self) -> ParseResult<Term> {
        loop {
            match self.next_token()? {
                Token::End => break,
                Token::Lambda => self.abstraction()?,
                Token::Variable(name) => self.variable(name)?,
                Token::OpenParen => {
                    self.groups.push(Group {
                        slot: self.stack.len(),
                        depth: self.bindings.depth(),
                    });
                    self.stack.push(PartialTerm::Empty);
                }
                Token::CloseParen => self.close_group()?,
                found => {
                    return Err(SyntaxError::UnexpectedToken {
                        found,
                        offset: self.offset,
                    }
                    .into())
                }
            }
        }

        if !self.groups.is_empty() {
            return Err(SyntaxError::UnmatchedOpenParen.into());
        }
        while self.stack.len() > 1 {
            self.combine_top()?;
        }
        match self.stack.pop() {
            Some(PartialTerm::Empty) | None => Err(SyntaxError::EmptyProgram.into()),
            Some(program) => Ok(Term::try_from(program)?),
        }
    }

    /// `λ name : type .` opens a new abstraction slot and binds `name` for everything after it.
    fn abstraction(&mut self) -> ParseResult<()> {
        let name = match self.next_token()? {
            Token::Variable(name) => name,
            found => return Err(self.expected("a variable name", found)),
        };
        match self.next_token()? {
            Token::Colon => {}
            found => return Err(self.expected("`:`", found)),
        }
        let ty = self.ty()?;
        tracing::trace!(%name, %ty, "ignoring type annotation");

        self.bindings.bind(name.clone());
        self.stack.push(PartialTerm::abstraction(name));
        Ok(())
    }

    /// `Bool (-> Bool)* .`, consuming the dot that starts the body.
    fn ty(&mut self) -> ParseResult<Type> {
        let mut parts = Vec::new();
        loop {
            match self.next_token()? {
                Token::KeywordBool => parts.push(Type::Bool),
                found => return Err(self.expected("`Bool`", found)),
            }
            match self.next_token()? {
                Token::LambdaDot => break,
                Token::Arrow => continue,
                found => return Err(self.expected("`->` or `.`", found)),
            }
        }
        let ty = parts
            .into_iter()
            .rev()
            .reduce(|to, from| Type::Arrow(Box::new(from), Box::new(to)))
            .unwrap_or(Type::Bool);
        Ok(ty)
    }

    fn variable(&mut self, name: Ident) -> ParseResult<()> {
        let idx = self
            .bindings
            .resolve(&name, self.options.free_variables)
            .ok_or_else(|| SyntaxError::UnsupportedFreeVariable {
                name: name.clone(),
                offset: self.offset,
            })?;
        self.top()?.combine(PartialTerm::Variable(name, idx))?;
        Ok(())
    }

    /// `)` finishes the innermost group: everything pushed since its `(` folds into the group's
    /// slot, a group holding an abstraction stops absorbing terms, and the group joins whatever
    /// precedes it. Names bound inside the group go out of scope.
    fn close_group(&mut self) -> ParseResult<()> {
        let group = self
            .groups
            .pop()
            .ok_or(SyntaxError::UnmatchedCloseParen {
                offset: self.offset,
            })?;
        if self.stack.len() == group.slot + 1 && self.stack[group.slot] == PartialTerm::Empty {
            return Err(SyntaxError::EmptyGroup {
                offset: self.offset,
            }
            .into());
        }
        while self.stack.len() > group.slot + 1 {
            self.combine_top()?;
        }
        let top = self.top()?;
        if top.is_open_abstraction() {
            top.seal();
        }
        self.combine_top()?;
        self.bindings.restore(group.depth);
        Ok(())
    }

    fn top(&mut self) -> Result<&mut PartialTerm, StructuralError> {
        self.stack
            .last_mut()
            .ok_or(StructuralError::Incomplete {
                what: "term stack",
            })
    }

    /// Pops the topmost slot and combines it into the one below.
    #[tracing::instrument(level = "trace", skip(self))]
    fn combine_top(&mut self) -> ParseResult<()> {
        let term = match self.stack.pop() {
            Some(term) if self.stack.is_empty() => {
                self.stack.push(term);
                return Err(StructuralError::Incomplete {
                    what: "enclosing slot",
                }
                .into());
            }
            Some(PartialTerm::Abstraction {
                name, body: None, ..
            }) => return Err(SyntaxError::MissingBody { name }.into()),
            Some(term) => term,
            None => {
                return Err(StructuralError::Incomplete {
                    what: "term stack",
                }
                .into())
            }
        };
        self.top()?.combine(term)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ir::test::t;

    fn parse(source: &str) -> ParseResult<Term> {
        program(source, ParseOptions::default())
    }

    macro_rules! parse_tests {
        ($($name: ident : $input: expr => $output: expr);* $(;)?) => {
            paste::paste! {
                $(
                    #[test]
                    fn [<test_parse_ $name>]() {
                        assert_eq!(parse($input), $output);
                    }
                )*
            }
        };
    }

    parse_tests! {
        variable            :   "x"                                 => Ok(t!(x @ 23));
        free_pair           :   "x y"                               => Ok(t!(t!(x @ 23), t!(y @ 24)));
        left_assoc          :   "s t u"                             => Ok(t!(t!(t!(s @ 18), t!(t @ 19)), t!(u @ 20)));
        identity            :   "l x:Bool. x"                       => Ok(t!(x -> t!(x @ 0)));
        nested              :   "l x:Bool. l y:Bool. x y"           => Ok(t!(x -> t!(y -> t!(t!(x @ 1), t!(y @ 0)))));
        body_extends_right  :   "l x:Bool. x x x"                   => Ok(t!(x -> t!(t!(t!(x @ 0), t!(x @ 0)), t!(x @ 0))));
        free_under_binder   :   "l x:Bool. x y"                     => Ok(t!(x -> t!(t!(x @ 0), t!(y @ 25))));
        shadowing           :   "l x:Bool. l y:Bool. l x:Bool. x y" => Ok(t!(x -> t!(y -> t!(x -> t!(t!(x @ 0), t!(y @ 1))))));
        arrow_type          :   "l f:Bool->Bool->Bool. f"           => Ok(t!(f -> t!(f @ 0)));
        glyphs              :   r"λx:Bool. \y:Bool. x"              => Ok(t!(x -> t!(y -> t!(x @ 1))));
        applied_identity    :   "(l x:Bool. x) y"                   => Ok(t!(t!(x -> t!(x @ 0)), t!(y @ 24)));
        grouped_arguments   :   "f (g h) k"                         => Ok(t!(t!(t!(f @ 5), t!(t!(g @ 6), t!(h @ 7))), t!(k @ 10)));
        redundant_parens    :   "((l x:Bool. x))"                   => Ok(t!(x -> t!(x @ 0)));
        lambda_in_argument  :   "l f:Bool. f (l x:Bool. x) f"       => Ok(t!(f -> t!(t!(t!(f @ 0), t!(x -> t!(x @ 0))), t!(f @ 0))));
        curried_in_parens   :   "l f:Bool. f (l x:Bool. l z:Bool. x) f"
            => Ok(t!(f -> t!(t!(t!(f @ 0), t!(x -> t!(z -> t!(x @ 1)))), t!(f @ 0))));
        trailing_lambda     :   "f l x:Bool. x y"                   => Ok(t!(t!(f @ 5), t!(x -> t!(t!(x @ 0), t!(y @ 25)))));
        scope_ends_at_paren :   "(f l x:Bool. x) x"                 => Ok(t!(t!(t!(f @ 5), t!(x -> t!(x @ 0))), t!(x @ 23)));
        two_arguments       :   "(l x:Bool. l y:Bool. x) (l a:Bool. a) (l b:Bool. b)"
            => Ok(t!(t!(t!(x -> t!(y -> t!(x @ 1))), t!(a -> t!(a @ 0))), t!(b -> t!(b @ 0))));
        omega               :   "(l x:Bool. x x) (l x:Bool. x x)"
            => Ok(t!(t!(x -> t!(t!(x @ 0), t!(x @ 0))), t!(x -> t!(t!(x @ 0), t!(x @ 0)))));

        unmatched_open      :   "(l x:Bool. x"                      => Err(SyntaxError::UnmatchedOpenParen.into());
        unmatched_close     :   "x)"                                => Err(SyntaxError::UnmatchedCloseParen { offset: 1 }.into());
        empty_program       :   "   "                               => Err(SyntaxError::EmptyProgram.into());
        empty_group         :   "x ()"                              => Err(SyntaxError::EmptyGroup { offset: 3 }.into());
        missing_body        :   "l x:Bool."                         => Err(SyntaxError::MissingBody { name: "x".into() }.into());
        missing_body_group  :   "(l x:Bool.) y"                     => Err(SyntaxError::MissingBody { name: "x".into() }.into());
        missing_colon       :   "l x Bool. x"                       => Err(SyntaxError::Expected { expected: "`:`", found: Token::KeywordBool, offset: 4 }.into());
        missing_name        :   "l :Bool. x"                        => Err(SyntaxError::Expected { expected: "a variable name", found: Token::Colon, offset: 2 }.into());
        missing_type        :   "l x:. x"                           => Err(SyntaxError::Expected { expected: "`Bool`", found: Token::LambdaDot, offset: 4 }.into());
        dangling_arrow      :   "l x:Bool->. x"                     => Err(SyntaxError::Expected { expected: "`Bool`", found: Token::LambdaDot, offset: 10 }.into());
        type_without_dot    :   "l x:Bool x"                        => Err(SyntaxError::Expected { expected: "`->` or `.`", found: Token::Variable("x".into()), offset: 9 }.into());
        stray_dot           :   "x . y"                             => Err(SyntaxError::UnexpectedToken { found: Token::LambdaDot, offset: 2 }.into());
        long_free_name      :   "foo"                               => Err(SyntaxError::UnsupportedFreeVariable { name: "foo".into(), offset: 0 }.into());
        invalid_token       :   "x - y"                             => Err(LexError::InvalidToken { text: "-".into(), offset: 2 }.into());
    }

    #[test]
    fn first_letter_policy_truncates_free_names() {
        let options = ParseOptions {
            free_variables: FreeVariables::FirstLetter,
        };
        assert_eq!(
            program("l f:Bool. foo f", options),
            Ok(t!(f -> t!(t!(foo @ 6), t!(f @ 0))))
        );
    }

    #[test]
    fn long_names_may_be_bound() {
        assert_eq!(parse("l foo:Bool. foo"), Ok(t!(foo -> t!(foo @ 0))));
    }

    #[test]
    fn accepts_any_token_source() {
        let tokens = [
            Token::Lambda,
            Token::Variable("x".into()),
            Token::Colon,
            Token::KeywordBool,
            Token::LambdaDot,
            Token::Variable("x".into()),
        ]
        .into_iter()
        .enumerate()
        .map(|(offset, token)| Ok::<_, LexError>(Lexeme { token, offset }));
        let parsed = Parser::new(tokens, ParseOptions::default()).parse_program();
        assert_eq!(parsed, Ok(t!(x -> t!(x @ 0))));
    }

    #[test]
    fn types_nest_to_the_right() {
        let mut parser = Parser::new(
            Lexer::new("Bool -> Bool -> Bool ."),
            ParseOptions::default(),
        );
        let boolean = || Box::new(Type::Bool);
        assert_eq!(
            parser.ty(),
            Ok(Type::Arrow(
                boolean(),
                Box::new(Type::Arrow(boolean(), boolean()))
            ))
        );
    }
}
