//! Property-based tests for the lexer and the type matching rules.
//!
//! Case counts are kept small so the suite stays fast.

use lilc::parser::lexer::{Lexer, TokenKind};
use lilc::parser::types::{builtin_types, Type};
use proptest::prelude::*;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Render `value` in `base` with the matching prefix, digits grouped by `_`
fn render_literal(value: i64, base: u32, group: usize, upper: bool) -> String {
    let (prefix, digits) = match base {
        2 => ("0b", format!("{value:b}")),
        8 => ("0o", format!("{value:o}")),
        16 if upper => ("0x", format!("{value:X}")),
        16 => ("0x", format!("{value:x}")),
        _ if upper => ("0d", value.to_string()),
        _ => ("", value.to_string()),
    };

    let chars: Vec<char> = digits.chars().collect();
    let grouped: Vec<String> = chars
        .chunks(group)
        .map(|chunk| chunk.iter().collect())
        .collect();
    format!("{prefix}{}", grouped.join("_"))
}

/// Strategy for valid integer literals together with their value
fn arb_literal() -> impl Strategy<Value = (String, i64)> {
    (
        0i64..=i64::MAX,
        prop_oneof![Just(2u32), Just(8u32), Just(10u32), Just(16u32)],
        1usize..6,
        any::<bool>(),
    )
        .prop_map(|(value, base, group, upper)| {
            (render_literal(value, base, group, upper), value)
        })
}

/// Strategy for valid identifiers
fn arb_ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}"
}

/// Strategy for characters no token starts with
fn arb_unknown_char() -> impl Strategy<Value = char> {
    prop::sample::select(vec![
        '$', '@', '#', '!', '%', '^', '~', '`', '?', ':', '.', '\\', '|', '"', '\'', 'é', 'λ',
    ])
}

/// Shapes of pointer and array types over a shared pool of scalar types
#[derive(Debug, Clone)]
enum Shape {
    Scalar(usize),
    Pointer(Box<Shape>),
    Array(Box<Shape>, u64),
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = (0usize..6).prop_map(Shape::Scalar);
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|shape| Shape::Pointer(Box::new(shape))),
            (inner, 0u64..8).prop_map(|(shape, count)| Shape::Array(Box::new(shape), count)),
        ]
    })
}

/// Build a fresh type for `shape`; only the scalars are shared
fn build(shape: &Shape, pool: &[Type]) -> Type {
    match shape {
        Shape::Scalar(index) => pool[*index].clone(),
        Shape::Pointer(inner) => Type::pointer(build(inner, pool)),
        Shape::Array(inner, count) => Type::array(build(inner, pool), *count),
    }
}

/// Structural equality with scalars compared by pool slot, array counts ignored
fn expected_match(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Scalar(a), Shape::Scalar(b)) => a == b,
        (Shape::Pointer(a), Shape::Pointer(b)) => expected_match(a, b),
        (Shape::Array(a, _), Shape::Array(b, _)) => expected_match(a, b),
        _ => false,
    }
}

fn pool() -> Vec<Type> {
    builtin_types().into_iter().map(|(_, ty)| ty).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Lexer should never panic on any input
    #[test]
    fn lexer_no_panic(input in ".{0,100}") {
        let _ = Lexer::new("prop.lc", input.as_str()).tokenize();
    }

    /// Parser should never panic on any input (even invalid)
    #[test]
    fn parser_no_panic(input in "[a-z0-9_ (){}\\[\\];,=<>+*/&-]{0,80}") {
        let _ = lilc::parse_source("prop.lc", &input);
    }

    /// Literals lex to their value in every base, separators included
    #[test]
    fn literal_value_in_any_base((literal, value) in arb_literal()) {
        let tokens = Lexer::new("prop.lc", literal.as_str()).tokenize().unwrap();

        prop_assert_eq!(tokens.len(), 2, "literal {}", literal);
        prop_assert_eq!(&tokens[0].kind, &TokenKind::Integer(value));
        prop_assert_eq!(tokens[0].length, literal.len());
    }

    /// Unknown characters fail at exactly their own position
    #[test]
    fn unknown_character_position(
        name in arb_ident(),
        spaces in 1usize..4,
        ch in arb_unknown_char(),
    ) {
        let source = format!("{name}{}{ch} rest", " ".repeat(spaces));
        let err = Lexer::new("prop.lc", source.as_str()).tokenize().unwrap_err();

        prop_assert_eq!(err.message, format!("Unknown character '{ch}'"));
        prop_assert_eq!(err.position.line, 1);
        prop_assert_eq!(err.position.column, name.len() + spaces + 1);
        prop_assert_eq!(err.position.offset, name.len() + spaces);
    }

    /// Pointer(A) matches Pointer(B) exactly when A matches B
    #[test]
    fn pointer_matches_iff_pointee_matches(a in arb_shape(), b in arb_shape()) {
        let pool = pool();
        let (ta, tb) = (build(&a, &pool), build(&b, &pool));

        prop_assert_eq!(
            Type::pointer(ta.clone()).matches(&Type::pointer(tb.clone())),
            ta.matches(&tb)
        );
    }

    /// Composite types match structurally, whatever instance they live in
    #[test]
    fn structural_match_ignores_identity(a in arb_shape(), b in arb_shape()) {
        let pool = pool();

        prop_assert!(build(&a, &pool).matches(&build(&a, &pool)));
        prop_assert_eq!(build(&a, &pool).matches(&build(&b, &pool)), expected_match(&a, &b));
    }

    /// A duplicate never matches the type it was made from
    #[test]
    fn duplicate_is_nominal(index in 0usize..6) {
        let pool = pool();
        let base = &pool[index];
        let copy = base.duplicate();

        prop_assert!(!copy.matches(base));
        prop_assert!(copy.matches(&copy));
        prop_assert_eq!(copy.size(), base.size());
        prop_assert_eq!(copy.to_string(), base.to_string());

        let named = base.distinct("Named");
        prop_assert!(!named.matches(base));
        prop_assert_eq!(named.to_string(), "Named");
    }
}
