//! The seam between the AST builder and code generation.

use crate::{
    ast::prototype::{FunctionDef, Prototype},
    errors::{errors::Error, handler::ErrorHandler},
};

/// Receives every declaration the AST builder parses successfully, in
/// source order.
///
/// An `Err` returned here is reported by the caller at the declaration's
/// position; implementations should not report it themselves. The handler is
/// passed for warnings that do not stop lowering.
pub trait Lowering {
    fn lower_extern(
        &mut self,
        prototype: &Prototype,
        handler: &mut ErrorHandler,
    ) -> Result<(), Error>;

    fn lower_definition(
        &mut self,
        function: &FunctionDef,
        handler: &mut ErrorHandler,
    ) -> Result<(), Error>;
}
