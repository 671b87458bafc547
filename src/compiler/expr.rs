use inkwell::{
    values::{BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, PointerValue},
    FloatPredicate,
};

use crate::{
    ast::ast::Node,
    errors::errors::{Error, ErrorImpl},
};

use super::{
    compiler::{codegen_error, lowering_error, Compiler},
    stmt::{gen_array_decl, gen_statement, gen_var_decl},
};

/// Generates LLVM IR for the given node and returns its value.
///
/// Statement nodes evaluate to `0.0`, as do calls to void functions.
pub fn gen_expression<'ctx>(
    compiler: &mut Compiler<'ctx>,
    node: &Node,
) -> Result<BasicValueEnum<'ctx>, Error> {
    match node {
        Node::NumberLiteral(value) => Ok(compiler.context.f64_type().const_float(*value).into()),
        Node::StringLiteral(value) => Ok(compiler
            .builder
            .build_global_string_ptr(value, "str")?
            .as_pointer_value()
            .into()),
        Node::VariableRef(name) => {
            let variable = *compiler.named_values.get(name).ok_or_else(|| {
                lowering_error(ErrorImpl::UnknownVariable { name: name.clone() })
            })?;

            Ok(compiler.builder.build_load(variable.pointer, name)?)
        }
        Node::VarDecl { name, initializer } => gen_var_decl(compiler, name, initializer.as_deref()),
        Node::ArrayDecl {
            name,
            size,
            initial_values,
        } => gen_array_decl(compiler, name, *size, initial_values),
        Node::ArrayElementRef { array_name, index } => {
            let element = gen_element_pointer(compiler, array_name, index)?;
            Ok(compiler.builder.build_load(element, array_name)?)
        }
        Node::BinaryOp { operator, lhs, rhs } => gen_binary(compiler, *operator, lhs, rhs),
        Node::UnaryOp { operator, operand } => {
            let operand = gen_expression(compiler, operand)?;

            let function = compiler
                .get_function(&format!("unary{}", operator))
                .ok_or_else(|| {
                    lowering_error(ErrorImpl::UnknownUnaryOperator {
                        operator: *operator,
                    })
                })?;

            gen_call_value(compiler, function, &[operand], "unop")
        }
        Node::Call { callee, args } => {
            let function = compiler.get_function(callee).ok_or_else(|| {
                lowering_error(ErrorImpl::UnknownFunction {
                    name: callee.clone(),
                })
            })?;

            let expected = function.count_params() as usize;
            let variadic = function.get_type().is_var_arg();
            if args.len() < expected || (!variadic && args.len() != expected) {
                return Err(lowering_error(ErrorImpl::IncorrectArgumentCount {
                    expected,
                    received: args.len(),
                }));
            }

            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(gen_expression(compiler, arg)?);
            }

            gen_call_value(compiler, function, &values, "calltmp")
        }
        Node::Block(_) | Node::If { .. } | Node::For { .. } | Node::Return(_) => {
            gen_statement(compiler, node)?;
            Ok(compiler.context.f64_type().const_zero().into())
        }
    }
}

/// Unwraps a double, or fails if the value is a string.
pub fn as_float<'ctx>(value: BasicValueEnum<'ctx>) -> Result<FloatValue<'ctx>, Error> {
    match value {
        BasicValueEnum::FloatValue(value) => Ok(value),
        other => Err(codegen_error(format!(
            "expected a double operand, found {}",
            other.get_type().print_to_string()
        ))),
    }
}

/// Emits a call after checking argument types against the callee's
/// parameters. Void results become `0.0`.
pub fn gen_call_value<'ctx>(
    compiler: &Compiler<'ctx>,
    function: FunctionValue<'ctx>,
    values: &[BasicValueEnum<'ctx>],
    name: &str,
) -> Result<BasicValueEnum<'ctx>, Error> {
    for (index, (value, param)) in values.iter().zip(function.get_param_iter()).enumerate() {
        if value.get_type() != param.get_type() {
            return Err(codegen_error(format!(
                "argument {} of '{}' has the wrong type",
                index + 1,
                function.get_name().to_string_lossy()
            )));
        }
    }

    let args: Vec<BasicMetadataValueEnum<'ctx>> =
        values.iter().map(|value| (*value).into()).collect();

    let name = if function.get_type().get_return_type().is_some() {
        name
    } else {
        ""
    };

    let call = compiler.builder.build_call(function, &args, name)?;
    Ok(call
        .try_as_basic_value()
        .left()
        .unwrap_or_else(|| compiler.context.f64_type().const_zero().into()))
}

/// Address of `array_name[index]`. The index is truncated to an unsigned
/// integer.
pub fn gen_element_pointer<'ctx>(
    compiler: &mut Compiler<'ctx>,
    array_name: &str,
    index: &Node,
) -> Result<PointerValue<'ctx>, Error> {
    let array = *compiler.arrays.get(array_name).ok_or_else(|| {
        lowering_error(ErrorImpl::UnknownArray {
            name: array_name.to_string(),
        })
    })?;

    let index = as_float(gen_expression(compiler, index)?)?;
    let i64_type = compiler.context.i64_type();
    let index = compiler
        .builder
        .build_float_to_unsigned_int(index, i64_type, "index")?;

    let element = unsafe {
        compiler
            .builder
            .build_in_bounds_gep(array, &[i64_type.const_zero(), index], "element")?
    };

    Ok(element)
}

fn gen_binary<'ctx>(
    compiler: &mut Compiler<'ctx>,
    operator: char,
    lhs: &Node,
    rhs: &Node,
) -> Result<BasicValueEnum<'ctx>, Error> {
    if operator == '=' {
        return gen_assignment(compiler, lhs, rhs);
    }

    let left = gen_expression(compiler, lhs)?;
    let right = gen_expression(compiler, rhs)?;

    let builder = &compiler.builder;
    let value: BasicValueEnum<'ctx> = match operator {
        '+' => builder
            .build_float_add(as_float(left)?, as_float(right)?, "addtmp")?
            .into(),
        '-' => builder
            .build_float_sub(as_float(left)?, as_float(right)?, "subtmp")?
            .into(),
        '*' => builder
            .build_float_mul(as_float(left)?, as_float(right)?, "multmp")?
            .into(),
        '<' => {
            let comparison = builder.build_float_compare(
                FloatPredicate::ULT,
                as_float(left)?,
                as_float(right)?,
                "cmptmp",
            )?;
            builder
                .build_unsigned_int_to_float(comparison, compiler.context.f64_type(), "booltmp")?
                .into()
        }
        _ => {
            let function = compiler
                .get_function(&format!("binary{}", operator))
                .ok_or_else(|| lowering_error(ErrorImpl::UnknownBinaryOperator { operator }))?;

            gen_call_value(compiler, function, &[left, right], "binop")?
        }
    };

    Ok(value)
}

/// `=` writes to a variable or an array element and yields the stored value.
fn gen_assignment<'ctx>(
    compiler: &mut Compiler<'ctx>,
    lhs: &Node,
    rhs: &Node,
) -> Result<BasicValueEnum<'ctx>, Error> {
    match lhs {
        Node::VariableRef(name) => {
            let value = gen_expression(compiler, rhs)?;

            let variable = *compiler.named_values.get(name).ok_or_else(|| {
                lowering_error(ErrorImpl::UnknownVariable { name: name.clone() })
            })?;
            if variable.value_type != value.get_type() {
                return Err(codegen_error(format!(
                    "cannot assign a value of another type to '{}'",
                    name
                )));
            }

            compiler.builder.build_store(variable.pointer, value)?;
            Ok(value)
        }
        Node::ArrayElementRef { array_name, index } => {
            let value = as_float(gen_expression(compiler, rhs)?)?;
            let element = gen_element_pointer(compiler, array_name, index)?;

            compiler.builder.build_store(element, value)?;
            Ok(value.into())
        }
        _ => Err(lowering_error(ErrorImpl::InvalidAssignmentTarget)),
    }
}
