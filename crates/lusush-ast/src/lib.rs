//! The shell abstract syntax tree, per spec.md §3.
//!
//! Unlike a per-construct enum of structs, the AST here is deliberately a
//! single tagged [`Node`]: a [`NodeKind`], an optional string `value`, an
//! ordered `children: Vec<Node>`, and a [`SourceLocation`]. spec.md's own
//! data model calls for exactly this shape — each `NodeKind` documents its
//! child layout rather than encoding it in the type system — so a
//! generic-but-disciplined tree is the faithful rendering, not an
//! idiomatic-Rust "improvement" away from it. Destruction is automatic:
//! `children: Vec<Node>` means every node is owned by exactly one parent and
//! `Drop` releases the whole tree post-order with no hand-rolled
//! deallocation to get wrong (spec.md §9's note on `cmdfree`).

mod unparse;

pub use unparse::unparse;

use lusush_position::SourceLocation;

/// Node classification, matching the table in spec.md §3 verbatim. Each
/// variant's doc comment records its child layout and what `value` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// name + argument/redirection nodes. `children[0]` is the command
    /// name (a `StringLiteral`/`StringExpandable`); the rest are arguments
    /// and redirections in source order.
    Command,
    /// Two or more `Command`/compound-command children, left to right.
    Pipeline,
    /// Sequenced statements. The `;`/newline separator between children
    /// carries no semantic weight; an async (`&`) separator is represented
    /// by wrapping the left child in `Background` instead of a value here.
    List,
    /// Exactly two children: left, right.
    LogicalAnd,
    /// Exactly two children: left, right.
    LogicalOr,
    /// `[cond, then, cond, then, ..., else?]` — an even child count has no
    /// trailing else; an odd count's last child is the else-body.
    If,
    /// `[condition, body]`.
    While,
    /// `[condition, body]`.
    Until,
    /// `[word_list, body]`; loop variable name in `value`.
    For,
    /// `[body]`; `(init;test;update)` text in `value`.
    ForArith,
    /// Scrutinee expression text in `value`; `CaseItem` children.
    Case,
    /// `[body]`; `value` is `"<terminator>|<pattern>"`, terminator one of
    /// `;;`, `;&`, `;;&`.
    CaseItem,
    /// `[body]`.
    Subshell,
    /// `[body]`.
    BraceGroup,
    /// `[body]`; function name in `value`.
    Function,
    /// `[target]`; `value` is `"<fd?>:<operator>"`, e.g. `"2:>>"` or `":<"`.
    Redirect,
    /// `[rhs]`; variable name in `value`. `rhs` is an `ArithExp` leaf when
    /// the assignment's right-hand side is `$((...))` (pre-evaluated the
    /// same way a bare-word `$((...))` is), otherwise a
    /// `StringLiteral`/`StringExpandable` leaf.
    Assignment,
    /// Leaf; `$((...))` expression text in `value`.
    ArithExp,
    /// Leaf; `((...))` expression text in `value`.
    ArithCmd,
    /// `[body]`; `$(...)` command substitution.
    CommandSub,
    /// `[body]`; `<(...)` process substitution feeding a reader.
    ProcSubIn,
    /// `[body]`; `>(...)` process substitution feeding a writer.
    ProcSubOut,
    /// Leaf; literal text (single-quoted or otherwise non-expanding) in
    /// `value`.
    StringLiteral,
    /// Leaf; text containing `$`/backtick/`\` expansions, still in `value`
    /// as written (expansion is an execution-time concern, out of scope).
    StringExpandable,
    /// Element children.
    ArrayLiteral,
    /// Element children; array name in `value`.
    ArrayAssign,
    /// Element children (`+=`); array name in `value`.
    ArrayAppend,
    /// `[index_expr]`; array name in `value`.
    ArrayAccess,
    /// Leaf; `[[...]]` expression text in `value`.
    ExtendedTest,
    /// `[word_list, body]`; loop variable name in `value`.
    Select,
    /// `[body]`; wraps the timed pipeline/command.
    Time,
    /// `[body]`; wraps the coprocess command.
    Coproc,
    /// `[body]`; wraps a `!`-negated pipeline.
    Negate,
    /// `[body]`; wraps a `&`-backgrounded list element.
    Background,
}

/// One node of the AST: its kind, an optional associated string, its
/// children in construction order, and the source span it came from.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub value: Option<String>,
    pub children: Vec<Node>,
    pub location: SourceLocation,
}

impl Node {
    pub fn new(kind: NodeKind, location: SourceLocation) -> Self {
        Node {
            kind,
            value: None,
            children: Vec::new(),
            location,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Structural equality as defined by spec.md §8's property 5: compares
    /// `kind`, `value`, and `children` in order. Source location is
    /// deliberately excluded — re-parsing an `unparse`d tree reproduces the
    /// same shape at different byte offsets.
    pub fn structural_eq(&self, other: &Node) -> bool {
        self.kind == other.kind
            && self.value == other.value
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.structural_eq(b))
    }
}
