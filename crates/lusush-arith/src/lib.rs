//! Evaluator for POSIX `$((...))`/`((...))` arithmetic expressions, per
//! spec.md §4.5.
//!
//! Implemented as an explicit two-stack shunting-yard reduction (operator
//! stack + output stack) rather than a recursive-descent precedence climb,
//! because spec.md names the algorithm explicitly. The evaluator is a pure
//! function of its input text and the symbol table, except that it may
//! auto-vivify a referenced name as `"0"` in the current scope.

mod lexer;
mod shunting_yard;

use lusush_error::ParseError;
use lusush_symtab::SymbolTable;

pub use lexer::ArithToken;

/// Evaluate an arithmetic expression to a signed 64-bit integer.
///
/// Division/modulo by zero and negative exponents are reported as
/// `ParseError::Arith`; all other overflow wraps (two's-complement signed
/// 64-bit), matching spec.md §4.5.
pub fn eval(expr: &str, symtab: &mut SymbolTable) -> Result<i64, ParseError> {
    let tokens = lexer::tokenize(expr)?;
    let rpn = shunting_yard::to_rpn(tokens)?;
    shunting_yard::eval_rpn(&rpn, symtab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lusush_symtab::VarFlags;
    use proptest::prelude::*;

    fn fresh() -> SymbolTable {
        SymbolTable::new()
    }

    #[test]
    fn precedence_and_parens() {
        let mut s = fresh();
        assert_eq!(eval("2+3*4", &mut s).unwrap(), 14);
        assert_eq!(eval("(2+3)*4", &mut s).unwrap(), 20);
    }

    #[test]
    fn right_associative_power() {
        let mut s = fresh();
        assert_eq!(eval("2**3**2", &mut s).unwrap(), 512);
    }

    #[test]
    fn unary_and_bitwise() {
        let mut s = fresh();
        assert_eq!(eval("-3 + 5", &mut s).unwrap(), 2);
        assert_eq!(eval("~0", &mut s).unwrap(), -1);
        assert_eq!(eval("!0", &mut s).unwrap(), 1);
        assert_eq!(eval("5 & 3", &mut s).unwrap(), 1);
        assert_eq!(eval("5 | 2", &mut s).unwrap(), 7);
        assert_eq!(eval("5 ^ 1", &mut s).unwrap(), 4);
    }

    #[test]
    fn comparisons_and_logical() {
        let mut s = fresh();
        assert_eq!(eval("1 < 2 && 2 < 3", &mut s).unwrap(), 1);
        assert_eq!(eval("1 > 2 || 3 == 3", &mut s).unwrap(), 1);
        assert_eq!(eval("4 != 4", &mut s).unwrap(), 0);
    }

    #[test]
    fn hex_and_octal_literals() {
        let mut s = fresh();
        assert_eq!(eval("0x10", &mut s).unwrap(), 16);
        assert_eq!(eval("010", &mut s).unwrap(), 8);
    }

    #[test]
    fn division_by_zero_errors() {
        let mut s = fresh();
        assert!(matches!(eval("1/0", &mut s), Err(ParseError::Arith { .. })));
        assert!(matches!(eval("1%0", &mut s), Err(ParseError::Arith { .. })));
    }

    #[test]
    fn negative_exponent_errors() {
        let mut s = fresh();
        assert!(matches!(
            eval("2**-1", &mut s),
            Err(ParseError::Arith { .. })
        ));
    }

    #[test]
    fn undefined_variable_autovivifies_as_zero() {
        let mut s = fresh();
        assert_eq!(eval("x", &mut s).unwrap(), 0);
        assert!(s.exists("x"));
        assert_eq!(s.get("x").unwrap().value, "0");
    }

    #[test]
    fn readonly_variable_still_readable() {
        let mut s = fresh();
        s.set("x", "41", VarFlags::default()).unwrap();
        assert_eq!(eval("x + 1", &mut s).unwrap(), 42);
    }

    proptest! {
        #[test]
        fn identity_addition(n in -1_000_000i64..1_000_000) {
            let mut s = fresh();
            s.set("x", n.to_string(), VarFlags::default()).unwrap();
            prop_assert_eq!(eval("x + 0", &mut s).unwrap(), eval("x", &mut s).unwrap());
        }

        #[test]
        fn distributivity_over_addition(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
            let mut s = fresh();
            s.set("a", a.to_string(), VarFlags::default()).unwrap();
            s.set("b", b.to_string(), VarFlags::default()).unwrap();
            s.set("c", c.to_string(), VarFlags::default()).unwrap();
            let lhs = eval("a * b + c", &mut s).unwrap();
            let rhs = eval("a * b", &mut s).unwrap().wrapping_add(eval("c", &mut s).unwrap());
            prop_assert_eq!(lhs, rhs);
        }
    }
}
