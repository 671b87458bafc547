//! Main compiler module.
//!
//! Holds the LLVM context, module and builder for one compilation unit and
//! implements [`Lowering`] so the AST builder can hand declarations over as
//! soon as they parse. Also owns target setup and object emission.

use std::{collections::HashMap, path::Path};

use anyhow::{anyhow, Context as _};
use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    passes::PassManager,
    targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine},
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum},
    values::{FunctionValue, PointerValue},
    AddressSpace, OptimizationLevel,
};
use tracing::{debug, info};

use crate::{
    ast::prototype::{ArgType, FunctionDef, Prototype, ReturnType},
    errors::{
        errors::{Error, ErrorImpl},
        handler::ErrorHandler,
    },
    parser::lowering::Lowering,
    Position,
};

use super::stmt::gen_block;

/// A stack slot together with the type stored in it.
#[derive(Debug, Clone, Copy)]
pub struct Variable<'ctx> {
    pub pointer: PointerValue<'ctx>,
    pub value_type: BasicTypeEnum<'ctx>,
}

/// The state of code generation for one compilation unit.
///
/// Variables and arrays are function local and are reset whenever a new
/// definition starts. Prototypes outlive the functions generated from them,
/// so a declaration can be materialised again on demand.
pub struct Compiler<'ctx> {
    /// Reference to the LLVM context
    pub context: &'ctx Context,
    /// The LLVM module being built
    pub module: Module<'ctx>,
    /// The LLVM IR builder
    pub builder: Builder<'ctx>,

    /// Scalars of the function being generated
    pub named_values: HashMap<String, Variable<'ctx>>,
    /// Global `[N x double]` storage of the arrays declared by the function
    pub arrays: HashMap<String, PointerValue<'ctx>>,
    /// Every prototype seen so far, by name
    pub function_protos: HashMap<String, Prototype>,
}

pub(super) fn codegen_error(message: impl Into<String>) -> Error {
    Error::new(
        ErrorImpl::CodegenFailed {
            message: message.into(),
        },
        Position::null(),
    )
}

pub(super) fn lowering_error(error: ErrorImpl) -> Error {
    Error::new(error, Position::null())
}

impl<'ctx> Compiler<'ctx> {
    /// Creates a compiler with an empty module named `module_name`.
    ///
    /// The built-in functions are not installed; call
    /// [`Compiler::install_builtins`] before lowering user code.
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        Compiler {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            named_values: HashMap::new(),
            arrays: HashMap::new(),
            function_protos: HashMap::new(),
        }
    }

    pub fn string_type(&self) -> BasicTypeEnum<'ctx> {
        self.context
            .i8_type()
            .ptr_type(AddressSpace::default())
            .as_basic_type_enum()
    }

    fn arg_type(&self, arg_type: ArgType) -> BasicTypeEnum<'ctx> {
        match arg_type {
            ArgType::Double => self.context.f64_type().as_basic_type_enum(),
            ArgType::String => self.string_type(),
        }
    }

    /// Declares `prototype` in the module with external linkage and named
    /// parameters.
    pub fn gen_prototype(&self, prototype: &Prototype) -> FunctionValue<'ctx> {
        let params: Vec<BasicMetadataTypeEnum<'ctx>> = prototype
            .args
            .iter()
            .map(|arg| self.arg_type(arg.arg_type).into())
            .collect();

        let function_type = match prototype.return_type {
            ReturnType::Void => self.context.void_type().fn_type(&params, false),
            ReturnType::Double => self.context.f64_type().fn_type(&params, false),
        };

        let function =
            self.module
                .add_function(&prototype.name, function_type, Some(Linkage::External));

        for (param, arg) in function.get_param_iter().zip(prototype.args.iter()) {
            param.set_name(&arg.name);
        }

        function
    }

    /// Looks `name` up in the module, declaring it from a stored prototype
    /// if the module does not have it (yet, or any more).
    pub fn get_function(&self, name: &str) -> Option<FunctionValue<'ctx>> {
        if let Some(function) = self.module.get_function(name) {
            return Some(function);
        }

        self.function_protos
            .get(name)
            .map(|prototype| self.gen_prototype(prototype))
    }

    /// The function the builder is currently inserting into.
    pub fn current_function(&self) -> Result<FunctionValue<'ctx>, Error> {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
            .ok_or_else(|| codegen_error("no insertion point"))
    }

    /// The current insertion block, if it does not end in a terminator yet.
    pub fn open_block(&self) -> Option<BasicBlock<'ctx>> {
        self.builder
            .get_insert_block()
            .filter(|block| block.get_terminator().is_none())
    }

    /// Makes sure instructions can be appended. Code following a `return`
    /// goes into a fresh block that nothing branches to.
    pub fn ensure_open_block(&self) -> Result<(), Error> {
        if self.open_block().is_none() {
            let function = self.current_function()?;
            let block = self.context.append_basic_block(function, "unreachable");
            self.builder.position_at_end(block);
        }
        Ok(())
    }

    /// Creates an alloca in the entry block of `function`, ahead of any
    /// other instruction there.
    pub fn create_entry_block_alloca(
        &self,
        function: FunctionValue<'ctx>,
        name: &str,
        value_type: BasicTypeEnum<'ctx>,
    ) -> Result<Variable<'ctx>, Error> {
        let entry = function
            .get_first_basic_block()
            .ok_or_else(|| codegen_error(format!("{} has no entry block", name)))?;

        let builder = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(instruction) => builder.position_before(&instruction),
            None => builder.position_at_end(entry),
        }

        let pointer = builder.build_alloca(value_type, name)?;
        Ok(Variable {
            pointer,
            value_type,
        })
    }

    fn gen_function(&mut self, function_def: &FunctionDef) -> Result<FunctionValue<'ctx>, Error> {
        let prototype = &function_def.prototype;

        if let Some(existing) = self.module.get_function(&prototype.name) {
            if existing.count_basic_blocks() > 0 {
                return Err(lowering_error(ErrorImpl::FunctionRedefinition {
                    name: prototype.name.clone(),
                }));
            }
        }

        self.function_protos
            .insert(prototype.name.clone(), prototype.clone());
        let function = self
            .get_function(&prototype.name)
            .ok_or_else(|| codegen_error(format!("could not declare {}", prototype.name)))?;

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        if let Err(error) = self.gen_function_body(function, function_def) {
            unsafe { function.delete() };
            return Err(error);
        }

        if !function.verify(false) {
            unsafe { function.delete() };
            return Err(lowering_error(ErrorImpl::InvalidFunction {
                name: prototype.name.clone(),
            }));
        }

        Ok(function)
    }

    fn gen_function_body(
        &mut self,
        function: FunctionValue<'ctx>,
        function_def: &FunctionDef,
    ) -> Result<(), Error> {
        self.named_values.clear();
        self.arrays.clear();

        for (param, arg) in function.get_param_iter().zip(function_def.prototype.args.iter()) {
            let variable = self.create_entry_block_alloca(function, &arg.name, param.get_type())?;
            self.builder.build_store(variable.pointer, param)?;
            self.named_values.insert(arg.name.clone(), variable);
        }

        gen_block(self, &function_def.body)?;

        if self.open_block().is_some() {
            match function_def.prototype.return_type {
                ReturnType::Void => {
                    self.builder.build_return(None)?;
                }
                ReturnType::Double => {
                    self.builder.build_unreachable()?;
                }
            }
        }

        Ok(())
    }

    /// Renders the module as textual LLVM IR.
    pub fn print_to_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Runs the module level passes. Currently only the verifier.
    pub fn run_passes(&self) {
        let pass_manager = PassManager::create(());
        pass_manager.add_verifier_pass();
        pass_manager.run_on(&self.module);
    }

    /// Points the module at the host target and returns a machine for it.
    pub fn configure_target(&self) -> anyhow::Result<TargetMachine> {
        Target::initialize_all(&InitializationConfig::default());

        let triple = TargetMachine::get_default_triple();
        let triple_name = triple.as_str().to_string_lossy().into_owned();
        let target = Target::from_triple(&triple)
            .map_err(|error| anyhow!("unsupported target {}: {}", triple_name, error))?;
        let machine = target
            .create_target_machine(
                &triple,
                "generic",
                "",
                OptimizationLevel::Default,
                RelocMode::PIC,
                CodeModel::Default,
            )
            .ok_or_else(|| anyhow!("could not create a target machine for {}", triple_name))?;

        debug!("targeting {}", triple_name);

        self.module.set_triple(&triple);
        self.module
            .set_data_layout(&machine.get_target_data().get_data_layout());

        Ok(machine)
    }

    pub fn write_ir(&self, path: &Path) -> anyhow::Result<()> {
        self.module
            .print_to_file(path)
            .map_err(|error| anyhow!("{}", error))
            .with_context(|| format!("failed to write IR to {}", path.display()))?;

        info!("wrote {}", path.display());
        Ok(())
    }

    pub fn emit_object(&self, machine: &TargetMachine, path: &Path) -> anyhow::Result<()> {
        machine
            .write_to_file(&self.module, FileType::Object, path)
            .map_err(|error| anyhow!("{}", error))
            .with_context(|| format!("failed to emit object file {}", path.display()))?;

        info!("wrote {}", path.display());
        Ok(())
    }
}

impl<'ctx> Lowering for Compiler<'ctx> {
    fn lower_extern(
        &mut self,
        prototype: &Prototype,
        _handler: &mut ErrorHandler,
    ) -> Result<(), Error> {
        self.function_protos
            .insert(prototype.name.clone(), prototype.clone());

        if self.module.get_function(&prototype.name).is_none() {
            self.gen_prototype(prototype);
        }

        debug!("declared {}", prototype);
        Ok(())
    }

    fn lower_definition(
        &mut self,
        function: &FunctionDef,
        _handler: &mut ErrorHandler,
    ) -> Result<(), Error> {
        self.gen_function(function)?;

        debug!("generated {}", function.prototype);
        Ok(())
    }
}
