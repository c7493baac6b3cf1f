use lusush_alias::AliasMap;
use lusush_error::{DiagnosticLog, ParseBudget};
use lusush_linebuffer::LineEditor;
use lusush_symtab::SymbolTable;

/// The explicit per-session record spec.md §9 asks for in place of the
/// process-wide globals a C shell would reach for: the symbol table, the
/// alias map, the line-edit buffer backing the current input line, the
/// diagnostic sink parsing reports into, and the resource budget bounding
/// that parse. One `ShellContext` per interactive session (or per test
/// case); nothing here is `static`.
pub struct ShellContext {
    pub symtab: SymbolTable,
    pub aliases: AliasMap,
    pub editor: LineEditor,
    pub diagnostics: DiagnosticLog,
    pub budget: ParseBudget,
}

impl ShellContext {
    /// A fresh context with an empty symbol table, no aliases defined, and
    /// a minimally-sized line buffer.
    pub fn new() -> Result<Self, lusush_linebuffer::BufferError> {
        Ok(ShellContext {
            symtab: SymbolTable::new(),
            aliases: AliasMap::new(),
            editor: LineEditor::new(lusush_linebuffer::MIN_CAPACITY)?,
            diagnostics: DiagnosticLog::default(),
            budget: ParseBudget::default(),
        })
    }

    /// Swap in a tighter resource budget, e.g. for parsing input from an
    /// untrusted source rather than an interactive terminal.
    pub fn with_strict_budget(mut self) -> Self {
        self.budget = ParseBudget::strict();
        self
    }
}

impl Default for ShellContext {
    fn default() -> Self {
        // MIN_CAPACITY is a small constant; construction cannot fail for it.
        Self::new().unwrap_or_else(|_| panic!("default line buffer capacity must be allocatable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_has_empty_state() {
        let context = ShellContext::new().unwrap();
        assert!(!context.aliases.is_defined("ls"));
        assert!(!context.symtab.exists("x"));
        assert!(context.editor.buffer().is_empty());
        assert!(context.diagnostics.diagnostics.is_empty());
    }
}
