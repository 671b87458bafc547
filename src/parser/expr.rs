//! The expression builder.
//!
//! Expressions are parsed from a bounded token slice that ends in an
//! end-of-expression sentinel. Binary operators are combined by precedence
//! climbing against the unit's precedence table, so operators declared with
//! `binary` take part exactly like the built in ones.

use crate::{
    ast::ast::Node,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    MK_ERROR,
};

use super::{context::ParseContext, lookups::is_operator, parser::Parser};

/// Largest element count accepted in `var name[N]`.
pub const MAX_ARRAY_SIZE: f64 = 65536.0;

/// Builds one expression from `tokens`, which must end in an
/// end-of-expression token. The whole slice has to be consumed.
pub fn build_expression(
    tokens: Vec<Token>,
    context: &mut ParseContext,
    needs_return_token: bool,
) -> Result<Node, Error> {
    let mut parser = Parser::new(tokens);
    parser.set_needs_return_token(needs_return_token);
    parse_whole_slice(&mut parser, context)
}

/// Builds the header expression of an `if` or `for`. A `return` anywhere in
/// the slice is rejected.
pub fn build_condition(tokens: Vec<Token>, context: &mut ParseContext) -> Result<Node, Error> {
    let mut parser = Parser::new(tokens);
    parser.set_in_condition(true);
    parse_whole_slice(&mut parser, context)
}

fn parse_whole_slice(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    let expression = parse_expr(parser, context)?;

    let trailing = parser.current_token()?;
    if trailing.kind != TokenKind::EndOfExpression {
        return MK_ERROR!(
            ErrorImpl::TrailingExpressionToken {
                token: trailing.lexeme.clone(),
            },
            trailing.position
        );
    }

    Ok(expression)
}

pub fn parse_expr(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    let lhs = parse_unary_expr(parser, context)?;
    parse_binary_rhs(parser, context, 0, lhs)
}

/// Parses a prefix operator application, or falls through to a primary.
pub fn parse_unary_expr(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    let operator = parser.current_token()?.single_char().filter(|c| is_operator(*c));

    match operator {
        Some(operator) => {
            parser.advance()?;
            let operand = parse_unary_expr(parser, context)?;
            Ok(Node::unary(operator, operand))
        }
        None => parse_primary_expr(parser, context),
    }
}

/// Precedence climbing over the binary operators following `lhs`.
///
/// Operators binding weaker than `min_precedence` are left for the caller.
/// When the operator after the right hand side binds tighter than the one
/// just consumed, it claims that right hand side first.
pub fn parse_binary_rhs(
    parser: &mut Parser,
    context: &mut ParseContext,
    min_precedence: i32,
    mut lhs: Node,
) -> Result<Node, Error> {
    loop {
        let token_precedence = context.token_precedence(parser.current_token()?);
        if token_precedence < min_precedence {
            return Ok(lhs);
        }

        let operator_token = parser.advance()?;
        let Some(operator) = operator_token.single_char() else {
            return Ok(lhs);
        };

        let mut rhs = parse_unary_expr(parser, context)?;

        let next_precedence = context.token_precedence(parser.current_token()?);
        if token_precedence < next_precedence {
            rhs = parse_binary_rhs(parser, context, token_precedence + 1, rhs)?;
        }

        lhs = Node::binary(operator, lhs, rhs);
    }
}

pub fn parse_primary_expr(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    match parser.current_token_kind()? {
        TokenKind::Number => parse_number_expr(parser),
        TokenKind::String => {
            let token = parser.advance()?;
            Ok(Node::StringLiteral(token.literal.unwrap_or_default()))
        }
        TokenKind::Identifier => parse_identifier_expr(parser, context),
        TokenKind::OpenParen => parse_grouping_expr(parser, context),
        TokenKind::Var => parse_var_expr(parser, context),
        TokenKind::Return => parse_return_expr(parser, context),
        _ => {
            let token = parser.current_token()?;
            MK_ERROR!(
                ErrorImpl::UnknownExpressionToken {
                    lexeme: token.lexeme.clone(),
                    kind: token.kind.to_string(),
                },
                token.position
            )
        }
    }
}

fn parse_number_literal(token: &Token) -> Result<f64, Error> {
    let text = token.literal.as_deref().unwrap_or(&token.lexeme);

    text.parse::<f64>().or_else(|_| {
        MK_ERROR!(
            ErrorImpl::NumberParseError {
                token: text.to_string(),
            },
            token.position
        )
    })
}

pub fn parse_number_expr(parser: &mut Parser) -> Result<Node, Error> {
    let token = parser.advance()?;
    Ok(Node::NumberLiteral(parse_number_literal(&token)?))
}

pub fn parse_grouping_expr(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    parser.advance()?; // (

    let expression = parse_expr(parser, context)?;
    parser.expect(TokenKind::CloseParen, "')'")?;

    Ok(expression)
}

/// `name`, `name[index]` or `name(args, ...)`.
pub fn parse_identifier_expr(
    parser: &mut Parser,
    context: &mut ParseContext,
) -> Result<Node, Error> {
    let identifier = parser.advance()?;
    let name = identifier.lexeme.clone();

    match parser.current_token_kind()? {
        TokenKind::OpenBracket => {
            parser.advance()?;
            let index = parse_expr(parser, context)?;
            parser.expect(TokenKind::CloseBracket, "']'")?;

            if context.array_size(&name).is_none() {
                return MK_ERROR!(ErrorImpl::UnknownArray { name }, identifier.position);
            }

            Ok(Node::ArrayElementRef {
                array_name: name,
                index: Box::new(index),
            })
        }
        TokenKind::OpenParen => {
            parser.advance()?;
            let args = parse_argument_list(parser, context, "')' or ',' in argument list")?;

            Ok(Node::Call { callee: name, args })
        }
        _ => {
            if !context.is_variable(&name) {
                return MK_ERROR!(ErrorImpl::UnknownVariable { name }, identifier.position);
            }

            Ok(Node::VariableRef(name))
        }
    }
}

/// Parses `e0, e1, ...)` after an opening parenthesis has been consumed.
fn parse_argument_list(
    parser: &mut Parser,
    context: &mut ParseContext,
    expected: &str,
) -> Result<Vec<Node>, Error> {
    let mut args = vec![];

    if parser.current_token_kind()? != TokenKind::CloseParen {
        loop {
            args.push(parse_expr(parser, context)?);

            if parser.current_token_kind()? == TokenKind::CloseParen {
                break;
            }

            parser.expect(TokenKind::Comma, expected)?;
        }
    }

    parser.advance()?; // )
    Ok(args)
}

/// `var name [= expr]` or `var name[N] [= (e0, e1, ...)]`.
pub fn parse_var_expr(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    let var_token = parser.advance()?;
    let name = parser
        .expect(TokenKind::Identifier, "identifier after var")?
        .lexeme;

    if parser.current_token_kind()? == TokenKind::OpenBracket {
        parser.advance()?;

        let size_token = parser.current_token()?.clone();
        if size_token.kind != TokenKind::Number {
            return MK_ERROR!(
                ErrorImpl::InvalidArraySize {
                    token: size_token.lexeme,
                },
                size_token.position
            );
        }
        let size = parse_number_literal(&size_token)?;
        if size < 0.0 || size.fract() != 0.0 || size > MAX_ARRAY_SIZE {
            return MK_ERROR!(
                ErrorImpl::InvalidArraySize {
                    token: size_token.lexeme,
                },
                size_token.position
            );
        }
        let size = size as usize;
        parser.advance()?;
        parser.expect(TokenKind::CloseBracket, "']' here")?;

        let initial_values = if parser.current_token_kind()? == TokenKind::Assignment {
            parser.advance()?;
            parser.expect(TokenKind::OpenParen, "'(' to open the array initializer")?;
            parse_argument_list(parser, context, "')' or ',' in array initializer")?
        } else {
            vec![Node::NumberLiteral(0.0); size]
        };

        if initial_values.len() != size {
            return MK_ERROR!(
                ErrorImpl::ArraySizeMismatch {
                    declared: size,
                    initialized: initial_values.len(),
                },
                var_token.position
            );
        }

        context.declare_array(&name, size);
        return Ok(Node::ArrayDecl {
            name,
            size,
            initial_values,
        });
    }

    let initializer = if parser.current_token_kind()? == TokenKind::Assignment {
        parser.advance()?;
        Some(Box::new(parse_expr(parser, context)?))
    } else {
        None
    };

    context.declare_variable(&name);
    Ok(Node::VarDecl { name, initializer })
}

pub fn parse_return_expr(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    let return_token = parser.advance()?;
    if parser.in_condition() {
        return MK_ERROR!(ErrorImpl::ReturnInCondition, return_token.position);
    }

    let current = parser.current_token()?;
    if current.kind == TokenKind::EndOfExpression {
        if parser.needs_return_token() {
            return MK_ERROR!(ErrorImpl::ReturnWithoutValue, current.position);
        }
        return Ok(Node::Return(None));
    }

    if !parser.needs_return_token() {
        return MK_ERROR!(ErrorImpl::ReturnInVoidFunction, current.position);
    }

    let value = parse_expr(parser, context)?;
    Ok(Node::Return(Some(Box::new(value))))
}
