use std::rc::Rc;

use thiserror::Error;

use crate::{
    ast::{Identifier, Statement},
    expression_parsing::{self, Precedence},
    lexer::{Token, TokenKind},
};

#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {got} instead")]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("expected next token to be {expected}, got EOF instead")]
    PrematureEndOfInput { expected: Expected },
    #[error("could not parse \"{literal}\" as integer")]
    ParseIntError { literal: Rc<str> },
    #[error("no prefix parse function for {0} found")]
    NoPrefixFunction(Token),
}

#[derive(Debug, PartialEq)]
pub enum Expected {
    Token(TokenKind),
    Identifier,
    Expression,
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Identifier => write!(f, "IDENT"),
            Expected::Expression => write!(f, "an expression"),
        }
    }
}

impl ParseError {
    pub(crate) fn premature_end_expected_expression() -> Self {
        ParseError::PrematureEndOfInput {
            expected: Expected::Expression,
        }
    }

    pub(crate) fn unexpected_token(expected: TokenKind, got: Option<Token>) -> ParseError {
        match got {
            Some(got) => ParseError::UnexpectedToken {
                expected: Expected::Token(expected),
                got,
            },
            None => ParseError::PrematureEndOfInput {
                expected: Expected::Token(expected),
            },
        }
    }

    pub(crate) fn unexpected_other(expected: Expected, got: Option<Token>) -> ParseError {
        match got {
            Some(got) => ParseError::UnexpectedToken { expected, got },
            None => ParseError::PrematureEndOfInput { expected },
        }
    }
}

pub struct Parser<'a> {
    pub(crate) iter: std::iter::Peekable<crate::lexer::Tokenizer<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: crate::lexer::Tokenizer<'a>) -> Self {
        let iter = tokenizer.peekable();
        Self { iter }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Rc<str>, ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(name),
            _ => Err(ParseError::unexpected_other(Expected::Identifier, token)),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token { kind, .. }) if kind == token_kind => Ok(()),
            _ => Err(ParseError::unexpected_token(token_kind, token)),
        }
    }

    /// Parses until the tokens run out. Statement separators (`;`) are
    /// optional; a parse error skips ahead to the next `;` so that several
    /// errors per input can be reported.
    pub fn parse_program(&mut self) -> Result<crate::ast::Program, Vec<ParseError>> {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while self.iter.peek().is_some() {
            match self.parse_statement() {
                Ok(statement) => {
                    statements.push(statement);
                }
                Err(err) => {
                    errors.push(err);
                    for token in self.iter.by_ref() {
                        if token.kind == TokenKind::SemiColon {
                            break;
                        }
                    }
                    continue;
                }
            }
            self.iter
                .next_if(|token| token.kind == TokenKind::SemiColon);
        }
        if errors.is_empty() {
            Ok(crate::ast::Program { statements })
        } else {
            Err(errors)
        }
    }

    pub fn parse_statement(&mut self) -> Result<crate::ast::Statement, ParseError> {
        let token = self.iter.peek();
        match token.map(|t| &t.kind) {
            Some(TokenKind::Let) => Ok(Statement::Let(self.parse_let_statement()?)),
            Some(TokenKind::Return) => Ok(Statement::Return(self.parse_return_statement()?)),
            Some(TokenKind::While) => Ok(Statement::While(self.parse_while_statement()?)),
            _ => Ok(Statement::Expression(self.parse_expression_statement()?)),
        }
    }

    fn parse_let_statement(&mut self) -> Result<crate::ast::LetStatement, ParseError> {
        self.expect_token(TokenKind::Let)?;
        let name = self.parse_ident()?;
        self.expect_token(TokenKind::Assign)?;
        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(crate::ast::LetStatement {
            identifier: Identifier { name },
            value,
        })
    }

    fn parse_return_statement(&mut self) -> Result<crate::ast::ReturnStatement, ParseError> {
        self.expect_token(TokenKind::Return)?;
        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(crate::ast::ReturnStatement { value })
    }

    // The mandatory parentheses around the condition arrive as an ordinary
    // grouped expression, same as for `if`.
    fn parse_while_statement(&mut self) -> Result<crate::ast::WhileStatement, ParseError> {
        self.expect_token(TokenKind::While)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_token(TokenKind::LBrace)?;
        let body = expression_parsing::parse_block_statement(self)?;

        Ok(crate::ast::WhileStatement { condition, body })
    }

    fn parse_expression_statement(&mut self) -> Result<crate::ast::Expression, ParseError> {
        self.parse_expression(Precedence::Lowest)
    }

    pub fn parse_expression(
        &mut self,
        precedence: Precedence,
    ) -> Result<crate::ast::Expression, ParseError> {
        let Some(token) = self.iter.next() else {
            return Err(ParseError::premature_end_expected_expression());
        };
        let mut left_expression = expression_parsing::prefix_parsing(token, self)?;

        loop {
            let Some(next_token) = self.iter.peek() else {
                break;
            };

            let statement_ended = next_token.kind == TokenKind::SemiColon;
            let next_precedence = expression_parsing::precedence(&next_token.kind);
            if statement_ended || precedence >= next_precedence {
                break;
            }

            let Some(next_token) = self.iter.next() else {
                break;
            };
            let Some(infix_parse_function) =
                expression_parsing::infix_parsing_function(next_token.kind)
            else {
                break;
            };
            left_expression = infix_parse_function(left_expression, self)?;
        }

        Ok(left_expression)
    }
}
