use crate::{Node, NodeKind};

/// Render an AST back to canonical shell source text, for the
/// `parse(unparse(A)) ≡ A` round-trip property in spec.md §8.5. The output
/// is canonical, not source-preserving: whitespace and quoting style are
/// normalized, but every node the parser can produce re-parses to a
/// structurally equal tree.
pub fn unparse(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node.kind {
        NodeKind::Command => write_command(node, out),
        NodeKind::Pipeline => {
            for (i, child) in node.children.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_node(child, out);
            }
        }
        NodeKind::List => {
            for (i, child) in node.children.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                write_node(child, out);
            }
        }
        NodeKind::LogicalAnd => write_binary(node, "&&", out),
        NodeKind::LogicalOr => write_binary(node, "||", out),
        NodeKind::If => write_if(node, out),
        NodeKind::While => write_loop(node, "while", out),
        NodeKind::Until => write_loop(node, "until", out),
        NodeKind::For => write_for(node, out),
        NodeKind::ForArith => {
            out.push_str("for ((");
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push_str(")); do ");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
            out.push_str("; done");
        }
        NodeKind::Case => write_case(node, out),
        NodeKind::CaseItem => write_case_item(node, out),
        NodeKind::Subshell => {
            out.push('(');
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
            out.push(')');
        }
        NodeKind::BraceGroup => {
            out.push_str("{ ");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
            out.push_str("; }");
        }
        NodeKind::Function => {
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push_str("() ");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
        }
        NodeKind::Redirect => write_redirect(node, out),
        NodeKind::Assignment => {
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push('=');
            if let Some(rhs) = node.children.first() {
                write_node(rhs, out);
            }
        }
        NodeKind::ArithExp => {
            out.push_str("$((");
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push_str("))");
        }
        NodeKind::ArithCmd => {
            out.push_str("((");
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push_str("))");
        }
        NodeKind::CommandSub => {
            out.push_str("$(");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
            out.push(')');
        }
        NodeKind::ProcSubIn => {
            out.push_str("<(");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
            out.push(')');
        }
        NodeKind::ProcSubOut => {
            out.push_str(">(");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
            out.push(')');
        }
        NodeKind::StringLiteral => {
            out.push('\'');
            out.push_str(
                &node
                    .value
                    .as_deref()
                    .unwrap_or_default()
                    .replace('\'', "'\\''"),
            );
            out.push('\'');
        }
        NodeKind::StringExpandable => {
            out.push_str(node.value.as_deref().unwrap_or_default());
        }
        NodeKind::ArrayLiteral => {
            out.push('(');
            write_joined(&node.children, " ", out);
            out.push(')');
        }
        NodeKind::ArrayAssign => {
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push_str("=(");
            write_joined(&node.children, " ", out);
            out.push(')');
        }
        NodeKind::ArrayAppend => {
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push_str("+=(");
            write_joined(&node.children, " ", out);
            out.push(')');
        }
        NodeKind::ArrayAccess => {
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push('[');
            if let Some(index) = node.children.first() {
                write_node(index, out);
            }
            out.push(']');
        }
        NodeKind::ExtendedTest => {
            out.push_str("[[ ");
            out.push_str(node.value.as_deref().unwrap_or_default());
            out.push_str(" ]]");
        }
        NodeKind::Select => write_for(node, out),
        NodeKind::Time => {
            out.push_str("time ");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
        }
        NodeKind::Coproc => {
            out.push_str("coproc ");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
        }
        NodeKind::Negate => {
            out.push_str("! ");
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
        }
        NodeKind::Background => {
            if let Some(body) = node.children.first() {
                write_node(body, out);
            }
            out.push_str(" &");
        }
    }
}

fn write_command(node: &Node, out: &mut String) {
    for (i, child) in node.children.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_node(child, out);
    }
}

fn write_binary(node: &Node, op: &str, out: &mut String) {
    if let Some(left) = node.children.first() {
        write_node(left, out);
    }
    out.push(' ');
    out.push_str(op);
    out.push(' ');
    if let Some(right) = node.children.get(1) {
        write_node(right, out);
    }
}

fn write_if(node: &Node, out: &mut String) {
    let has_else = node.children.len() % 2 == 1;
    let clause_count = if has_else {
        (node.children.len() - 1) / 2
    } else {
        node.children.len() / 2
    };
    for i in 0..clause_count {
        out.push_str(if i == 0 { "if " } else { "elif " });
        write_node(&node.children[i * 2], out);
        out.push_str("; then ");
        write_node(&node.children[i * 2 + 1], out);
        out.push(' ');
    }
    if has_else {
        out.push_str("else ");
        write_node(
            node.children
                .last()
                .expect("has_else implies at least one child"),
            out,
        );
        out.push(' ');
    }
    out.push_str("fi");
}

fn write_loop(node: &Node, keyword: &str, out: &mut String) {
    out.push_str(keyword);
    out.push(' ');
    if let Some(cond) = node.children.first() {
        write_node(cond, out);
    }
    out.push_str("; do ");
    if let Some(body) = node.children.get(1) {
        write_node(body, out);
    }
    out.push_str("; done");
}

fn write_for(node: &Node, out: &mut String) {
    let keyword = if node.kind == NodeKind::Select {
        "select"
    } else {
        "for"
    };
    out.push_str(keyword);
    out.push(' ');
    out.push_str(node.value.as_deref().unwrap_or_default());
    out.push_str(" in ");
    if let Some(words) = node.children.first() {
        write_joined(&words.children, " ", out);
    }
    out.push_str("; do ");
    if let Some(body) = node.children.get(1) {
        write_node(body, out);
    }
    out.push_str("; done");
}

fn write_case(node: &Node, out: &mut String) {
    out.push_str("case ");
    out.push_str(node.value.as_deref().unwrap_or_default());
    out.push_str(" in ");
    for item in &node.children {
        write_node(item, out);
        out.push(' ');
    }
    out.push_str("esac");
}

fn write_case_item(node: &Node, out: &mut String) {
    let (terminator, pattern) = node
        .value
        .as_deref()
        .and_then(|v| v.split_once('|'))
        .unwrap_or((";;", ""));
    out.push_str(pattern);
    out.push_str(") ");
    if let Some(body) = node.children.first() {
        write_node(body, out);
    }
    out.push(' ');
    out.push_str(terminator);
}

fn write_redirect(node: &Node, out: &mut String) {
    let (fd, operator) = node
        .value
        .as_deref()
        .and_then(|v| v.split_once(':'))
        .unwrap_or(("", ">"));
    out.push_str(fd);
    out.push_str(operator);
    if let Some(target) = node.children.first() {
        write_node(target, out);
    }
}

fn write_joined(nodes: &[Node], sep: &str, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        write_node(node, out);
    }
}
