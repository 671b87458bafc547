//! Functions every program can call without declaring them.

use inkwell::{module::Linkage, values::FunctionValue, AddressSpace};
use tracing::debug;

use crate::{
    ast::prototype::{ArgType, Prototype, PrototypeArgument, ReturnType},
    errors::errors::{Error, ErrorImpl},
};

use super::compiler::{codegen_error, lowering_error, Compiler};

impl<'ctx> Compiler<'ctx> {
    /// Declares `printf` and defines `print(s: string) void` and
    /// `newLine() void` on top of it.
    pub fn install_builtins(&mut self) -> Result<(), Error> {
        let printf = self.declare_printf();

        let print = Prototype::new(
            "print",
            vec![PrototypeArgument {
                name: String::from("s"),
                arg_type: ArgType::String,
            }],
            ReturnType::Void,
        );
        let function = self.begin_builtin(&print)?;
        let format = self.builder.build_global_string_ptr("%s", "fmt")?;
        let argument = function
            .get_first_param()
            .ok_or_else(|| codegen_error("print has no parameter"))?;
        self.builder.build_call(
            printf,
            &[format.as_pointer_value().into(), argument.into()],
            "",
        )?;
        self.finish_builtin(function, &print)?;

        let new_line = Prototype::new("newLine", Vec::new(), ReturnType::Void);
        let function = self.begin_builtin(&new_line)?;
        let line_feed = self.builder.build_global_string_ptr("\n", "nl")?;
        self.builder
            .build_call(printf, &[line_feed.as_pointer_value().into()], "")?;
        self.finish_builtin(function, &new_line)?;

        debug!("installed built-in functions");
        Ok(())
    }

    fn declare_printf(&self) -> FunctionValue<'ctx> {
        if let Some(printf) = self.module.get_function("printf") {
            return printf;
        }

        let i8_ptr_type = self.context.i8_type().ptr_type(AddressSpace::default());
        let printf_type = self
            .context
            .i32_type()
            .fn_type(&[i8_ptr_type.into()], true);

        self.module
            .add_function("printf", printf_type, Some(Linkage::External))
    }

    fn begin_builtin(&mut self, prototype: &Prototype) -> Result<FunctionValue<'ctx>, Error> {
        self.function_protos
            .insert(prototype.name.clone(), prototype.clone());

        let function = self.gen_prototype(prototype);
        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        Ok(function)
    }

    fn finish_builtin(
        &self,
        function: FunctionValue<'ctx>,
        prototype: &Prototype,
    ) -> Result<(), Error> {
        self.builder.build_return(None)?;

        if !function.verify(false) {
            return Err(lowering_error(ErrorImpl::InvalidFunction {
                name: prototype.name.clone(),
            }));
        }

        Ok(())
    }
}
