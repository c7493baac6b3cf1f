use lusush_ast::Node;

/// A readable, indented dump of a parsed tree, for a CLI that has no
/// execution engine to hand the AST to. Not `unparse` (which reconstructs
/// shell source) and not `{:#?}` (too verbose for a human skimming parser
/// output) — one line per node, child depth shown by indentation.
pub fn format_tree(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, 0, &mut out);
    out
}

fn write_node(node: &Node, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("{:?}", node.kind));
    if let Some(value) = &node.value {
        out.push_str(&format!(" {value:?}"));
    }
    out.push('\n');
    for child in &node.children {
        write_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lusush_alias::AliasMap;
    use lusush_error::DiagnosticLog;
    use lusush_symtab::SymbolTable;

    #[test]
    fn renders_one_line_per_node_with_indentation() {
        let aliases = AliasMap::new();
        let mut symtab = SymbolTable::new();
        let mut diagnostics = DiagnosticLog::default();
        let tree =
            lusush_parser::parse_program("echo hello", &aliases, &mut symtab, &mut diagnostics)
                .unwrap();
        let rendered = format_tree(&tree);
        assert!(rendered.contains("List\n"));
        assert!(rendered.contains("  Command\n"));
        assert!(
            rendered.contains("    StringLiteral") || rendered.contains("    StringExpandable")
        );
    }
}
