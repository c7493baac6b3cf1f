//! End-to-end scenarios exercising the whole scan/parse pipeline through
//! [`ShellContext`], one per representative shape the grammar supports.

use lusush_ast::NodeKind;
use lusush_shell::{parse_line, ShellContext};

fn word(tree: &lusush_ast::Node, path: &[usize]) -> String {
    let mut node = tree;
    for &index in path {
        node = &node.children[index];
    }
    node.value.clone().unwrap_or_default()
}

#[test]
fn simple_command_with_one_argument() {
    let mut context = ShellContext::new().unwrap();
    let tree = parse_line(&mut context, "echo hello").unwrap();
    assert_eq!(tree.kind, NodeKind::List);
    let command = &tree.children[0];
    assert_eq!(command.kind, NodeKind::Command);
    assert_eq!(word(command, &[0]), "echo");
    assert_eq!(word(command, &[1]), "hello");
}

#[test]
fn pipeline_binds_tighter_than_logical_operators() {
    let mut context = ShellContext::new().unwrap();
    let tree = parse_line(&mut context, "a && b | c || d").unwrap();
    let root = &tree.children[0];
    assert_eq!(root.kind, NodeKind::LogicalOr);
    let left = &root.children[0];
    assert_eq!(left.kind, NodeKind::LogicalAnd);
    assert_eq!(left.children[0].kind, NodeKind::Command);
    let pipeline = &left.children[1];
    assert_eq!(pipeline.kind, NodeKind::Pipeline);
    assert_eq!(pipeline.children.len(), 2);
    assert_eq!(root.children[1].kind, NodeKind::Command);
}

#[test]
fn if_then_else_fi() {
    let mut context = ShellContext::new().unwrap();
    let tree = parse_line(&mut context, "if [ -f x ]; then echo y; else echo z; fi").unwrap();
    let if_node = &tree.children[0];
    assert_eq!(if_node.kind, NodeKind::If);
    assert_eq!(if_node.children.len(), 3);
    assert_eq!(if_node.children[0].kind, NodeKind::List);
    assert_eq!(if_node.children[1].kind, NodeKind::List);
    assert_eq!(if_node.children[2].kind, NodeKind::List);
}

#[test]
fn for_loop_over_word_list() {
    let mut context = ShellContext::new().unwrap();
    let tree = parse_line(&mut context, "for i in 1 2 3; do echo $i; done").unwrap();
    let for_node = &tree.children[0];
    assert_eq!(for_node.kind, NodeKind::For);
    assert_eq!(for_node.value.as_deref(), Some("i"));
    let words = &for_node.children[0];
    assert_eq!(words.kind, NodeKind::ArrayLiteral);
    assert_eq!(words.children.len(), 3);
    assert_eq!(words.children[0].value.as_deref(), Some("1"));
}

#[test]
fn arithmetic_assignment_rhs_decomposes_into_arith_exp() {
    let mut context = ShellContext::new().unwrap();
    let tree = parse_line(&mut context, "x=$((2+3*4))").unwrap();
    let command = &tree.children[0];
    assert_eq!(command.kind, NodeKind::Command);
    let assignment = &command.children[0];
    assert_eq!(assignment.kind, NodeKind::Assignment);
    assert_eq!(assignment.value.as_deref(), Some("x"));
    let rhs = &assignment.children[0];
    assert_eq!(rhs.kind, NodeKind::ArithExp);
    assert_eq!(rhs.value.as_deref(), Some("2+3*4"));

    let value = lusush_arith::eval("2+3*4", &mut context.symtab).unwrap();
    assert_eq!(value, 14);
}

#[test]
fn plain_assignment_rhs_stays_a_string_leaf() {
    let mut context = ShellContext::new().unwrap();
    let tree = parse_line(&mut context, "x=hello").unwrap();
    let assignment = &tree.children[0].children[0];
    assert_eq!(assignment.kind, NodeKind::Assignment);
    assert_eq!(assignment.value.as_deref(), Some("x"));
    assert_eq!(assignment.children[0].kind, NodeKind::StringExpandable);
    assert_eq!(assignment.children[0].value.as_deref(), Some("hello"));
}

#[test]
fn alias_installed_on_one_line_expands_on_the_next() {
    let mut context = ShellContext::new().unwrap();
    context.aliases.define("ll", "ls -l");
    let tree = parse_line(&mut context, "ll /tmp").unwrap();
    let command = &tree.children[0];
    assert_eq!(command.kind, NodeKind::Command);
    assert_eq!(word(command, &[0]), "ls");
    assert_eq!(word(command, &[1]), "-l");
    assert_eq!(word(command, &[2]), "/tmp");
}
