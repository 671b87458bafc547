use inkwell::{module::Linkage, values::BasicValueEnum, AddressSpace, FloatPredicate};
use tracing::trace;

use crate::{ast::ast::Node, errors::errors::Error};

use super::{
    compiler::{codegen_error, Compiler},
    expr::{as_float, gen_expression},
};

/// Generates a node whose value is not needed.
pub fn gen_statement<'ctx>(compiler: &mut Compiler<'ctx>, node: &Node) -> Result<(), Error> {
    match node {
        Node::Block(_) => gen_block(compiler, node),
        Node::If {
            condition,
            then_block,
            else_block,
            then_returns,
            else_returns,
        } => gen_if(
            compiler,
            condition,
            then_block,
            else_block.as_deref(),
            *then_returns,
            *else_returns,
        ),
        Node::For {
            var_name,
            start,
            end,
            step,
            body,
        } => gen_for(compiler, var_name, start, end, step.as_deref(), body),
        Node::Return(value) => gen_return(compiler, value.as_deref()),
        _ => gen_expression(compiler, node).map(|_| ()),
    }
}

pub fn gen_block<'ctx>(compiler: &mut Compiler<'ctx>, block: &Node) -> Result<(), Error> {
    let statements = match block {
        Node::Block(statements) => statements.as_slice(),
        other => std::slice::from_ref(other),
    };

    for statement in statements {
        compiler.ensure_open_block()?;
        trace!("lowering {}", statement);
        gen_statement(compiler, statement)?;
    }

    Ok(())
}

fn gen_if<'ctx>(
    compiler: &mut Compiler<'ctx>,
    condition: &Node,
    then_block: &Node,
    else_block: Option<&Node>,
    then_returns: bool,
    else_returns: bool,
) -> Result<(), Error> {
    let condition = as_float(gen_expression(compiler, condition)?)?;
    let zero = compiler.context.f64_type().const_zero();
    let condition = compiler.builder.build_float_compare(
        FloatPredicate::ONE,
        condition,
        zero,
        "ifcond",
    )?;

    let function = compiler.current_function()?;
    let then_bb = compiler.context.append_basic_block(function, "then");
    let else_bb = else_block.map(|_| compiler.context.append_basic_block(function, "else"));
    // Without an else the false edge goes straight to the merge block.
    let merge_bb = match else_bb {
        Some(_) => None,
        None => Some(compiler.context.append_basic_block(function, "ifcont")),
    };

    let false_target = else_bb
        .or(merge_bb)
        .ok_or_else(|| codegen_error("if without a false edge"))?;
    compiler
        .builder
        .build_conditional_branch(condition, then_bb, false_target)?;

    compiler.builder.position_at_end(then_bb);
    gen_block(compiler, then_block)?;
    let then_end = if then_returns {
        None
    } else {
        compiler.open_block()
    };

    let mut else_end = None;
    if let (Some(else_bb), Some(else_block)) = (else_bb, else_block) {
        compiler.builder.position_at_end(else_bb);
        gen_block(compiler, else_block)?;
        if !else_returns {
            else_end = compiler.open_block();
        }
    }

    let open_ends: Vec<_> = then_end.into_iter().chain(else_end).collect();
    if open_ends.is_empty() && merge_bb.is_none() {
        // Both branches returned; whatever follows is unreachable.
        return Ok(());
    }

    let merge = match merge_bb {
        Some(merge) => merge,
        None => compiler.context.append_basic_block(function, "ifcont"),
    };
    for end in open_ends {
        compiler.builder.position_at_end(end);
        compiler.builder.build_unconditional_branch(merge)?;
    }
    compiler.builder.position_at_end(merge);

    Ok(())
}

fn gen_for<'ctx>(
    compiler: &mut Compiler<'ctx>,
    var_name: &str,
    start: &Node,
    end: &Node,
    step: Option<&Node>,
    body: &Node,
) -> Result<(), Error> {
    let function = compiler.current_function()?;
    let f64_type = compiler.context.f64_type();

    // The start value cannot see the loop variable.
    let start = as_float(gen_expression(compiler, start)?)?;
    let variable = compiler.create_entry_block_alloca(function, var_name, f64_type.into())?;
    compiler.builder.build_store(variable.pointer, start)?;

    let loop_bb = compiler.context.append_basic_block(function, "loop");
    compiler.builder.build_unconditional_branch(loop_bb)?;
    compiler.builder.position_at_end(loop_bb);

    let shadowed = compiler.named_values.insert(var_name.to_string(), variable);

    gen_block(compiler, body)?;
    compiler.ensure_open_block()?;

    let step = match step {
        Some(step) => as_float(gen_expression(compiler, step)?)?,
        None => f64_type.const_float(1.0),
    };

    let end_condition = as_float(gen_expression(compiler, end)?)?;

    let current = as_float(compiler.builder.build_load(variable.pointer, var_name)?)?;
    let next = compiler.builder.build_float_add(current, step, "nextvar")?;
    compiler.builder.build_store(variable.pointer, next)?;

    let end_condition = compiler.builder.build_float_compare(
        FloatPredicate::ONE,
        end_condition,
        f64_type.const_zero(),
        "loopcond",
    )?;

    let after_bb = compiler.context.append_basic_block(function, "afterloop");
    compiler
        .builder
        .build_conditional_branch(end_condition, loop_bb, after_bb)?;
    compiler.builder.position_at_end(after_bb);

    match shadowed {
        Some(outer) => compiler.named_values.insert(var_name.to_string(), outer),
        None => compiler.named_values.remove(var_name),
    };

    Ok(())
}

fn gen_return<'ctx>(compiler: &mut Compiler<'ctx>, value: Option<&Node>) -> Result<(), Error> {
    match value {
        Some(value) => {
            let value = as_float(gen_expression(compiler, value)?)?;
            compiler.builder.build_return(Some(&value))?;
        }
        None => {
            compiler.builder.build_return(None)?;
        }
    }

    Ok(())
}

/// `var name [= init]`: an entry block slot typed after its initializer,
/// `0.0` when there is none.
pub fn gen_var_decl<'ctx>(
    compiler: &mut Compiler<'ctx>,
    name: &str,
    initializer: Option<&Node>,
) -> Result<BasicValueEnum<'ctx>, Error> {
    let function = compiler.current_function()?;

    let value = match initializer {
        Some(initializer) => gen_expression(compiler, initializer)?,
        None => compiler.context.f64_type().const_zero().into(),
    };

    let variable = compiler.create_entry_block_alloca(function, name, value.get_type())?;
    compiler.builder.build_store(variable.pointer, value)?;
    compiler.named_values.insert(name.to_string(), variable);

    Ok(value)
}

/// `var name[N] = (...)`: a zero initialized global `[N x double]` with
/// common linkage, filled element by element.
pub fn gen_array_decl<'ctx>(
    compiler: &mut Compiler<'ctx>,
    name: &str,
    size: usize,
    initial_values: &[Node],
) -> Result<BasicValueEnum<'ctx>, Error> {
    let size = u32::try_from(size)
        .map_err(|_| codegen_error(format!("array {} is too large", name)))?;
    let array_type = compiler.context.f64_type().array_type(size);

    let global = compiler
        .module
        .add_global(array_type, Some(AddressSpace::default()), name);
    global.set_linkage(Linkage::Common);
    global.set_initializer(&array_type.const_zero());
    let array = global.as_pointer_value();

    let i64_type = compiler.context.i64_type();
    for (index, initial_value) in initial_values.iter().enumerate() {
        let value = as_float(gen_expression(compiler, initial_value)?)?;
        let element = unsafe {
            compiler.builder.build_in_bounds_gep(
                array,
                &[i64_type.const_zero(), i64_type.const_int(index as u64, false)],
                &format!("{}{}", name, index),
            )?
        };
        compiler.builder.build_store(element, value)?;
    }

    compiler.arrays.insert(name.to_string(), array);
    Ok(array.into())
}
