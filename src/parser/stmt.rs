//! The AST builder: top level declarations, prototypes, blocks and control
//! flow. Expression statements are cut out of the token stream here and
//! handed to the expression builder as self-contained slices.

use tracing::debug;

use crate::{
    ast::{
        ast::Node,
        prototype::{
            FunctionDef, Prototype, PrototypeArgument, ReturnType, DEFAULT_BINARY_PRECEDENCE,
        },
    },
    errors::{
        errors::{Error, ErrorImpl},
        handler::ErrorHandler,
    },
    lexer::tokens::{Token, TokenKind},
    MK_ERROR,
};

use super::{
    context::ParseContext,
    expr::{build_condition, build_expression},
    lookups::is_overloadable,
    lowering::Lowering,
    parser::Parser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopLevelState {
    ExpectDeclaration,
    /// Skipping tokens after a failed declaration. Nothing is reported
    /// until the next `fn`, `extern` or end of file.
    Recovering,
}

/// Parses a whole compilation unit and forwards every well formed
/// declaration to `lowering`.
///
/// Failed declarations are reported into `handler` and skipped, so one call
/// can surface many diagnostics. The only `Err` returned is a fatal error
/// (the token cursor ran off the stream), which has already been reported
/// when this returns.
pub fn parse_token_list<L: Lowering + ?Sized>(
    tokens: Vec<Token>,
    context: &mut ParseContext,
    lowering: &mut L,
    handler: &mut ErrorHandler,
) -> Result<(), Error> {
    let mut parser = Parser::new(tokens);

    if let Err(error) = parse_declarations(&mut parser, context, lowering, handler) {
        handler.report(&error);
        return Err(error);
    }

    Ok(())
}

fn parse_declarations<L: Lowering + ?Sized>(
    parser: &mut Parser,
    context: &mut ParseContext,
    lowering: &mut L,
    handler: &mut ErrorHandler,
) -> Result<(), Error> {
    let mut state = TopLevelState::ExpectDeclaration;

    loop {
        let kind = parser.current_token_kind()?;

        state = match (state, kind) {
            (_, TokenKind::EOF) => return Ok(()),
            (TopLevelState::Recovering, TokenKind::Fn | TokenKind::Extern) => {
                TopLevelState::ExpectDeclaration
            }
            (TopLevelState::Recovering, _) => {
                parser.advance()?;
                TopLevelState::Recovering
            }
            (TopLevelState::ExpectDeclaration, TokenKind::Fn) => {
                handle_definition(parser, context, lowering, handler)?
            }
            (TopLevelState::ExpectDeclaration, TokenKind::Extern) => {
                handle_extern(parser, context, lowering, handler)?
            }
            (TopLevelState::ExpectDeclaration, _) => {
                let token = parser.current_token()?;
                handler.report(&Error::new(
                    ErrorImpl::UnexpectedTopLevel {
                        token: token.lexeme.clone(),
                    },
                    token.position,
                ));
                TopLevelState::Recovering
            }
        };
    }
}

fn handle_definition<L: Lowering + ?Sized>(
    parser: &mut Parser,
    context: &mut ParseContext,
    lowering: &mut L,
    handler: &mut ErrorHandler,
) -> Result<TopLevelState, Error> {
    let start = parser.get_position();

    match parse_definition(parser, context, handler) {
        Ok(function) => {
            debug!("parsed definition: {}", function);

            if let Err(error) = lowering.lower_definition(&function, handler) {
                handler.report(&error.with_fallback_position(start));
            }
            Ok(TopLevelState::ExpectDeclaration)
        }
        Err(error) => recover(parser, handler, error),
    }
}

fn handle_extern<L: Lowering + ?Sized>(
    parser: &mut Parser,
    context: &mut ParseContext,
    lowering: &mut L,
    handler: &mut ErrorHandler,
) -> Result<TopLevelState, Error> {
    let start = parser.get_position();

    match parse_extern(parser, context, handler) {
        Ok(prototype) => {
            debug!("parsed extern: {}", prototype);

            if let Err(error) = lowering.lower_extern(&prototype, handler) {
                handler.report(&error.with_fallback_position(start));
            }
            Ok(TopLevelState::ExpectDeclaration)
        }
        Err(error) => recover(parser, handler, error),
    }
}

/// Reports a failed declaration and steps over the offending token, unless
/// the cursor already sits on the next declaration or at the end.
fn recover(
    parser: &mut Parser,
    handler: &mut ErrorHandler,
    error: Error,
) -> Result<TopLevelState, Error> {
    if error.is_fatal() {
        return Err(error);
    }
    handler.report(&error);

    let at_boundary = matches!(
        parser.current_token_kind()?,
        TokenKind::Fn | TokenKind::Extern | TokenKind::EOF
    );
    if !at_boundary && !parser.is_penultimate() {
        parser.advance()?;
    }

    Ok(TopLevelState::Recovering)
}

pub fn parse_definition(
    parser: &mut Parser,
    context: &mut ParseContext,
    handler: &mut ErrorHandler,
) -> Result<FunctionDef, Error> {
    let fn_token = parser.advance()?;
    let prototype = parse_prototype(parser, context, handler)?;

    context.enter_function(&prototype);
    parser.set_needs_return_token(prototype.needs_return_value());

    let body = parse_block(parser, context)?;

    if prototype.needs_return_value() && !body.always_returns() {
        return MK_ERROR!(
            ErrorImpl::MissingReturn {
                function: prototype.name.clone(),
            },
            fn_token.position
        );
    }

    Ok(FunctionDef { prototype, body })
}

pub fn parse_extern(
    parser: &mut Parser,
    context: &mut ParseContext,
    handler: &mut ErrorHandler,
) -> Result<Prototype, Error> {
    parser.advance()?; // extern
    let prototype = parse_prototype(parser, context, handler)?;
    parser.expect(TokenKind::Semicolon, "terminating semicolon")?;

    Ok(prototype)
}

/// `name(args) type`, `unary <op>(arg) type` or `binary <op> [prec](a, b) type`.
///
/// Arguments may be separated by commas and may carry a `: type`
/// annotation; unannotated arguments are doubles. A binary operator's
/// precedence is installed into `context` as soon as its prototype parses.
pub fn parse_prototype(
    parser: &mut Parser,
    context: &mut ParseContext,
    handler: &mut ErrorHandler,
) -> Result<Prototype, Error> {
    let name_token = parser.current_token()?.clone();

    let (name, arity, precedence) = match name_token.kind {
        TokenKind::Identifier => {
            parser.advance()?;
            (name_token.lexeme, 0, 0)
        }
        TokenKind::Unary => {
            parser.advance()?;
            let operator = parse_operator(parser, "unary")?;
            (format!("unary{}", operator), 1, 0)
        }
        TokenKind::Binary => {
            parser.advance()?;
            let operator = parse_operator(parser, "binary")?;
            let precedence = parse_precedence(parser)?;
            (format!("binary{}", operator), 2, precedence)
        }
        _ => {
            return MK_ERROR!(
                ErrorImpl::MissingPrototypeName {
                    token: name_token.lexeme,
                },
                name_token.position
            )
        }
    };

    parser.expect(TokenKind::OpenParen, "'(' in prototype")?;

    let mut args = vec![];
    while parser.current_token_kind()? == TokenKind::Identifier {
        let arg_name = parser.advance()?.lexeme;

        if parser.current_token_kind()? == TokenKind::Colon {
            parser.advance()?;
            let type_token = parser.advance()?;
            args.push(PrototypeArgument::new(
                &arg_name,
                &type_token.lexeme,
                handler,
                Some(type_token.position),
            ));
        } else {
            args.push(PrototypeArgument::double(&arg_name));
        }

        if parser.current_token_kind()? == TokenKind::Comma {
            parser.advance()?;
        }
    }

    parser.expect(TokenKind::CloseParen, "')' or ',' in prototype")?;

    let type_token = parser.current_token()?;
    let return_type = match type_token.kind {
        TokenKind::Void => ReturnType::Void,
        TokenKind::Double => ReturnType::Double,
        _ => {
            return MK_ERROR!(
                ErrorImpl::MissingReturnType {
                    token: type_token.lexeme.clone(),
                },
                type_token.position
            )
        }
    };
    parser.advance()?;

    if arity != 0 && args.len() != arity {
        return MK_ERROR!(
            ErrorImpl::InvalidOperatorArity {
                operator: name.chars().last().unwrap_or_default(),
                expected: arity,
                received: args.len(),
            },
            name_token.position
        );
    }

    let mut prototype = Prototype::new(&name, args, return_type);
    if arity != 0 {
        prototype.is_operator = true;
        prototype.precedence = precedence;
    }

    if let (true, Some(operator)) = (prototype.is_binary_op(), prototype.operator_char()) {
        context.install_binary_operator(operator, prototype.binary_precedence());
    }

    Ok(prototype)
}

fn parse_operator(parser: &mut Parser, kind: &str) -> Result<char, Error> {
    let token = parser.advance()?;

    match token.single_char().filter(|c| is_overloadable(*c)) {
        Some(operator) => Ok(operator),
        None => MK_ERROR!(
            ErrorImpl::InvalidOperator {
                kind: kind.to_string(),
                token: token.lexeme,
            },
            token.position
        ),
    }
}

/// The optional precedence literal of a binary operator, in `1..=100`.
fn parse_precedence(parser: &mut Parser) -> Result<u32, Error> {
    if parser.current_token_kind()? != TokenKind::Number {
        return Ok(DEFAULT_BINARY_PRECEDENCE);
    }

    let token = parser.advance()?;
    let text = token.literal.as_deref().unwrap_or(&token.lexeme);

    match text.parse::<f64>() {
        Ok(value) if (1.0..=100.0).contains(&value) => Ok(value as u32),
        _ => MK_ERROR!(
            ErrorImpl::InvalidPrecedence {
                precedence: token.lexeme,
            },
            token.position
        ),
    }
}

/// `{ statement* }`. Returns a [`Node::Block`].
pub fn parse_block(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    parser.expect(TokenKind::OpenCurly, "'{' at the start of the block")?;

    let mut statements = vec![];
    loop {
        let statement = match parser.current_token_kind()? {
            TokenKind::CloseCurly => break,
            TokenKind::EOF => {
                return MK_ERROR!(
                    ErrorImpl::UnexpectedEndOfFile {
                        construct: String::from("a block"),
                    },
                    parser.get_position()
                )
            }
            TokenKind::OpenCurly => parse_block(parser, context)?,
            TokenKind::If => parse_if_stmt(parser, context)?,
            TokenKind::For => parse_for_stmt(parser, context)?,
            _ => parse_expression_stmt(parser, context)?,
        };

        statements.push(statement);
    }

    parser.advance()?; // }
    Ok(Node::Block(statements))
}

/// A `;` terminated expression.
pub fn parse_expression_stmt(
    parser: &mut Parser,
    context: &mut ParseContext,
) -> Result<Node, Error> {
    let (tokens, _) =
        collect_expression_tokens(parser, &[TokenKind::Semicolon], "';' after expression")?;

    build_expression(tokens, context, parser.needs_return_token())
}

/// `if (cond) { ... } [else { ... }]`
pub fn parse_if_stmt(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    parser.advance()?; // if
    parser.expect(TokenKind::OpenParen, "open parentheses")?;

    let (tokens, _) =
        collect_expression_tokens(parser, &[TokenKind::CloseParen], "')' after if condition")?;
    let condition = build_condition(tokens, context)?;

    let then_block = parse_block(parser, context)?;

    let else_block = if parser.current_token_kind()? == TokenKind::Else {
        parser.advance()?;
        Some(Box::new(parse_block(parser, context)?))
    } else {
        None
    };

    let then_returns = then_block.always_returns();
    let else_returns = else_block.as_ref().is_some_and(|block| block.always_returns());

    Ok(Node::If {
        condition: Box::new(condition),
        then_block: Box::new(then_block),
        else_block,
        then_returns,
        else_returns,
    })
}

/// `for (var name = start, end[, step]) { ... }`
///
/// The loop variable is only in scope for `end`, `step` and the body. A
/// variable of the same name declared before the loop is visible again after
/// it.
pub fn parse_for_stmt(parser: &mut Parser, context: &mut ParseContext) -> Result<Node, Error> {
    parser.advance()?; // for
    parser.expect(TokenKind::OpenParen, "'(' after for")?;
    parser.expect(TokenKind::Var, "'var' to declare the loop variable")?;
    let var_name = parser
        .expect(TokenKind::Identifier, "identifier after var")?
        .lexeme;
    parser.expect(TokenKind::Assignment, "'=' after the loop variable")?;

    let (tokens, _) =
        collect_expression_tokens(parser, &[TokenKind::Comma], "',' after the loop start")?;
    let start = build_condition(tokens, context)?;

    let shadows_outer = !context.declare_variable(&var_name);

    let (tokens, terminator) = collect_expression_tokens(
        parser,
        &[TokenKind::Comma, TokenKind::CloseParen],
        "',' or ')' after the loop end",
    )?;
    let end = build_condition(tokens, context)?;

    let step = if terminator == TokenKind::Comma {
        let (tokens, _) = collect_expression_tokens(
            parser,
            &[TokenKind::CloseParen],
            "')' after the loop step",
        )?;
        Some(Box::new(build_condition(tokens, context)?))
    } else {
        None
    };

    let body = parse_block(parser, context)?;

    if !shadows_outer {
        context.forget_variable(&var_name);
    }

    Ok(Node::For {
        var_name,
        start: Box::new(start),
        end: Box::new(end),
        step,
        body: Box::new(body),
    })
}

/// Cuts one expression out of the stream.
///
/// Collects tokens up to the first of `terminators` found outside any
/// parentheses, consumes that terminator and appends an end-of-expression
/// sentinel at its position. Braces never belong to an expression, so
/// meeting one means the terminator is missing.
fn collect_expression_tokens(
    parser: &mut Parser,
    terminators: &[TokenKind],
    expected: &str,
) -> Result<(Vec<Token>, TokenKind), Error> {
    let mut tokens = vec![];
    let mut depth = 0usize;

    loop {
        let token = parser.current_token()?;

        if depth == 0 && terminators.contains(&token.kind) {
            break;
        }

        match token.kind {
            TokenKind::EOF => {
                return MK_ERROR!(
                    ErrorImpl::UnexpectedEndOfFile {
                        construct: String::from("an expression"),
                    },
                    token.position
                )
            }
            TokenKind::OpenCurly | TokenKind::CloseCurly => {
                return MK_ERROR!(
                    ErrorImpl::ExpectedToken {
                        expected: expected.to_string(),
                        found: token.describe(),
                    },
                    token.position
                )
            }
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => depth = depth.saturating_sub(1),
            _ => {}
        }

        tokens.push(parser.advance()?);
    }

    let terminator = parser.advance()?;
    tokens.push(Token::end_of_expression(terminator.position));

    Ok((tokens, terminator.kind))
}
