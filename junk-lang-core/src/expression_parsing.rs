use crate::ast::{BlockStatement, Expression};
use crate::lexer::{Token, TokenKind};
use crate::parser::{ParseError, Parser};

#[derive(PartialOrd, PartialEq, Debug)]
pub enum Precedence {
    Lowest = 0,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

pub fn precedence(token: &TokenKind) -> Precedence {
    match token {
        TokenKind::Equal => Precedence::Equals,
        TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan => Precedence::LessGreater,
        TokenKind::GreaterThan => Precedence::LessGreater,
        TokenKind::Plus => Precedence::Sum,
        TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk => Precedence::Product,
        TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn prefix_operation(
    operator: crate::ast::PrefixOperator,
) -> impl FnOnce(&mut Parser) -> Result<Expression, ParseError> {
    move |parser| {
        Ok(Expression::PrefixOperation(
            operator,
            Box::new(parser.parse_expression(Precedence::Prefix)?),
        ))
    }
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parser.parse_expression(Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;
    Ok(expression)
}

fn parse_expression_list(
    parser: &mut Parser,
    terminator: TokenKind,
) -> Result<Vec<Expression>, ParseError> {
    let mut elements = Vec::new();

    loop {
        match parser.iter.peek() {
            Some(next) if next.kind == terminator => {
                parser.iter.next();
                return Ok(elements);
            }
            Some(_) => elements.push(parser.parse_expression(Precedence::Lowest)?),
            None => return Err(ParseError::premature_end_expected_expression()),
        }

        match parser.iter.next() {
            Some(Token {
                kind: TokenKind::Comma,
                ..
            }) => {}
            Some(next) if next.kind == terminator => return Ok(elements),
            next => return Err(ParseError::unexpected_token(terminator, next)),
        }
    }
}

fn parse_array_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expressions = parse_expression_list(parser, TokenKind::RBracket)?;
    Ok(Expression::ArrayLiteral(expressions))
}

// Unlike expression lists, a comma here must introduce another pair.
fn parse_hash_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut pairs = Vec::new();

    if parser
        .iter
        .next_if(|token| token.kind == TokenKind::RBrace)
        .is_some()
    {
        return Ok(Expression::HashLiteral(pairs));
    }

    loop {
        let key = parser.parse_expression(Precedence::Lowest)?;
        parser.expect_token(TokenKind::Colon)?;
        let value = parser.parse_expression(Precedence::Lowest)?;
        pairs.push((key, value));

        match parser.iter.next() {
            Some(Token {
                kind: TokenKind::Comma,
                ..
            }) => {}
            Some(Token {
                kind: TokenKind::RBrace,
                ..
            }) => return Ok(Expression::HashLiteral(pairs)),
            next => return Err(ParseError::unexpected_token(TokenKind::RBrace, next)),
        }
    }
}

fn parse_if_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = Box::new(parser.parse_expression(Precedence::Lowest)?);

    parser.expect_token(TokenKind::LBrace)?;
    let consequence = parse_block_statement(parser)?;

    let mut alternative = None;
    if parser
        .iter
        .next_if(|token| token.kind == TokenKind::Else)
        .is_some()
    {
        parser.expect_token(TokenKind::LBrace)?;
        alternative = Some(parse_block_statement(parser)?);
    }

    Ok(Expression::IfExpression {
        condition,
        consequence,
        alternative,
    })
}

pub(crate) fn parse_block_statement(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let mut statements = Vec::new();

    loop {
        match parser.iter.peek() {
            Some(Token {
                kind: TokenKind::RBrace,
                ..
            }) => {
                parser.iter.next();
                return Ok(BlockStatement { statements });
            }
            None => {
                return Err(ParseError::unexpected_token(TokenKind::RBrace, None));
            }
            Some(_) => {
                statements.push(parser.parse_statement()?);
                parser
                    .iter
                    .next_if(|token| token.kind == TokenKind::SemiColon);
            }
        }
    }
}

fn parse_function_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let (parameters, body) = parse_parameters_and_body(parser)?;
    Ok(Expression::FunctionLiteral { parameters, body })
}

// Same surface shape as a function literal, different keyword.
fn parse_macro_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let (parameters, body) = parse_parameters_and_body(parser)?;
    Ok(Expression::MacroLiteral { parameters, body })
}

fn parse_parameters_and_body(
    parser: &mut Parser,
) -> Result<(Vec<crate::ast::Identifier>, BlockStatement), ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let parameters = parse_parameters(parser)?;
    parser.expect_token(TokenKind::LBrace)?;
    let body = parse_block_statement(parser)?;
    Ok((parameters, body))
}

fn parse_parameters(parser: &mut Parser) -> Result<Vec<crate::ast::Identifier>, ParseError> {
    let mut identifiers = Vec::new();

    loop {
        let next = parser.iter.next();
        match next {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => identifiers.push(crate::ast::Identifier { name }),
            // Empty parameter list or trailing comma.
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => return Ok(identifiers),
            _ => Err(ParseError::unexpected_token(TokenKind::RParen, next))?,
        }

        let next = parser.iter.next();
        match next {
            Some(Token {
                kind: TokenKind::Comma,
                ..
            }) => continue,
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => return Ok(identifiers),
            _ => Err(ParseError::unexpected_token(TokenKind::RParen, next))?,
        }
    }
}

pub fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident(name) => Ok(Expression::Identifier(crate::ast::Identifier { name })),
        TokenKind::Int(literal) => literal
            .parse()
            .map(Expression::IntegerLiteral)
            .map_err(|_| ParseError::ParseIntError { literal }),
        TokenKind::String(value) => Ok(Expression::StringLiteral(value.as_ref().to_owned())),
        TokenKind::True => Ok(Expression::BooleanLiteral(true)),
        TokenKind::False => Ok(Expression::BooleanLiteral(false)),
        TokenKind::Bang => prefix_operation(crate::ast::PrefixOperator::Bang)(parser),
        TokenKind::Minus => prefix_operation(crate::ast::PrefixOperator::Minus)(parser),
        TokenKind::LParen => parse_grouped_expression(parser),
        TokenKind::LBracket => parse_array_literal(parser),
        TokenKind::LBrace => parse_hash_literal(parser),
        TokenKind::If => parse_if_expression(parser),
        TokenKind::Function => parse_function_literal(parser),
        TokenKind::Macro => parse_macro_literal(parser),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

type InfixFunction = Box<dyn FnOnce(Expression, &mut Parser) -> Result<Expression, ParseError>>;

fn infix_operation(token: TokenKind, operator: crate::ast::InfixOperator) -> InfixFunction {
    Box::new(
        move |left: Expression, parser: &mut Parser| -> Result<Expression, ParseError> {
            // Passing our own precedence to the right-hand side makes every
            // binary operator left-associative.
            let new_precedence = precedence(&token);
            Ok(Expression::InfixOperation(
                operator,
                Box::new(left),
                Box::new(parser.parse_expression(new_precedence)?),
            ))
        },
    )
}

fn parse_call_function(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let arguments = parse_expression_list(parser, TokenKind::RParen)?;

    Ok(Expression::CallExpression {
        function: Box::new(left),
        arguments,
    })
}

fn parse_index_expression(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let index = parser.parse_expression(Precedence::Lowest)?;
    parser.expect_token(TokenKind::RBracket)?;

    Ok(Expression::IndexExpression {
        left: Box::new(left),
        index: Box::new(index),
    })
}

pub fn infix_parsing_function(token: TokenKind) -> Option<InfixFunction> {
    use crate::ast::InfixOperator;

    match token {
        TokenKind::Plus => Some(infix_operation(TokenKind::Plus, InfixOperator::Plus)),
        TokenKind::Minus => Some(infix_operation(TokenKind::Minus, InfixOperator::Minus)),
        TokenKind::LessThan => Some(infix_operation(
            TokenKind::LessThan,
            InfixOperator::LessThan,
        )),
        TokenKind::GreaterThan => Some(infix_operation(
            TokenKind::GreaterThan,
            InfixOperator::GreaterThan,
        )),
        TokenKind::Equal => Some(infix_operation(TokenKind::Equal, InfixOperator::Equal)),
        TokenKind::NotEqual => Some(infix_operation(
            TokenKind::NotEqual,
            InfixOperator::NotEqual,
        )),
        TokenKind::Asterisk => Some(infix_operation(
            TokenKind::Asterisk,
            InfixOperator::Multiply,
        )),
        TokenKind::Slash => Some(infix_operation(TokenKind::Slash, InfixOperator::Divide)),
        TokenKind::LParen => Some(Box::new(parse_call_function)),
        TokenKind::LBracket => Some(Box::new(parse_index_expression)),
        _ => None,
    }
}
