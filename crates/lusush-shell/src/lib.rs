//! The ambient-stack crate: owns the explicit shell-context record spec.md
//! §9 asks for in place of process-wide globals, plus the glue that turns
//! accepted lines into ASTs or diagnostics. Nothing here executes a
//! command — that collaborator is explicitly out of scope (spec.md §1).

mod context;
mod logging;
mod render;

pub use context::ShellContext;
pub use logging::init_logging;
pub use render::format_tree;

use lusush_ast::Node;
use lusush_error::{Diagnostic, ParseError};

/// Feed one accepted line through the scan/parse pipeline against
/// `context`'s symbol table, alias map, and diagnostic sink. Returns the
/// resulting `List` node; diagnostics are already in `context.diagnostics`
/// by the time this returns, whether or not the parse ultimately errored.
pub fn parse_line(context: &mut ShellContext, line: &str) -> Result<Node, ParseError> {
    lusush_parser::parse_program(
        line,
        &context.aliases,
        &mut context.symtab,
        &mut context.diagnostics,
    )
}

/// Diagnostics collected by the most recent [`parse_line`] call still held
/// in `context`, drained for display.
pub fn drain_diagnostics(context: &mut ShellContext) -> Vec<Diagnostic> {
    std::mem::take(&mut context.diagnostics.diagnostics)
}
