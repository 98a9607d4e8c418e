// Integration tests for the front end

use lilc::parser::ast::{Expression, Statement};
use lilc::parser::types::TypeKind;
use lilc::{parse_file, parse_source, CompileError, File};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> File {
    match parse_source("test.lc", source) {
        Ok(file) => file,
        Err(err) => panic!("Parsing failed: {err}"),
    }
}

fn parse_err(source: &str) -> CompileError {
    match parse_source("test.lc", source) {
        Ok(file) => panic!("Expected an error, parsed {:?}", file.statements),
        Err(err) => err,
    }
}

fn function<'a>(file: &'a File, name: &str) -> &'a Statement {
    file.statements
        .iter()
        .find(|statement| {
            matches!(statement, Statement::Function { declaration, .. } if declaration.name == name)
        })
        .unwrap_or_else(|| panic!("No function named {name}"))
}

#[test]
fn test_complete_program() {
    let source = r#"
        // Running sum over a range
        typedef int64 Total;

        Total sum(int32 from, int32 to) {
            Total total = 0;
            int32 i = from;
            while (i <= to) {
                total += (Total) i;
                i = i + 1;
            }
            return total;
        }

        int32 abs(int32 x) {
            if (x < 0) {
                return -x;
            } else {
                return x;
            }
        }

        void swap(int32 *a, int32 *b) {
            var t = *a;
            *a = *b;
            *b = t;
        }

        int32 main() {
            int32 x = 0x10;
            int32 y = -0b11;
            swap(&x, &y);
            if (sum(1, 10) == 55) {
                return abs(y);
            }
            return 0;
        }
    "#;

    let file = parse(source);
    assert_eq!(file.filepath, "test.lc");
    assert_eq!(file.statements.len(), 5);

    let names: Vec<&str> = file
        .statements
        .iter()
        .filter_map(|statement| match statement {
            Statement::Function { declaration, .. } => Some(declaration.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["sum", "abs", "swap", "main"]);

    // swap falls off the end and gets an implicit return
    let Statement::Function { body, .. } = function(&file, "swap") else {
        unreachable!();
    };
    assert_eq!(body.statements.len(), 4);
    assert!(matches!(
        body.statements.last(),
        Some(Statement::Return { value: None, .. })
    ));
}

#[test]
fn test_error_display_format() {
    let err = parse_err("int32 x;\nint32 y = x +\n  $;");

    assert_eq!(err.to_string(), "test.lc:3:3: Unknown character '$'");
}

#[test]
fn test_ambiguous_literal_at_top_level() {
    let err = parse_err("1 + 1;");
    assert_eq!(err.to_string(), "test.lc:1:1: Ambiguous type for integer literal");

    let file = parse("int32 x = 1 + 1;");
    match &file.statements[0] {
        Statement::Declaration(declaration) => {
            assert_eq!(declaration.name, "x");
            assert_eq!(declaration.ty.to_string(), "int32");
        }
        other => panic!("Expected declaration, got {other:?}"),
    }
}

#[test]
fn test_return_path_coverage() {
    let err = parse_err("int32 f(int32 x) { if (x > 0) { return x; } }");
    assert_eq!(err.message, "Function does not return in all code paths");

    parse("int32 f(int32 x) { if (x > 0) { return x; } else { return 0; } }");

    let file = parse("void g() { }");
    let Statement::Function { body, .. } = &file.statements[0] else {
        panic!("Expected function definition");
    };
    assert!(matches!(
        body.statements.as_slice(),
        [Statement::Return { value: None, .. }]
    ));
}

#[test]
fn test_make_adder_declarator() {
    let file = parse("int32 (*make_adder(int32 base))(int32);");

    let Statement::Declaration(declaration) = &file.statements[0] else {
        panic!("Expected declaration");
    };
    assert_eq!(declaration.name, "make_adder");
    assert_eq!(
        declaration.ty.to_string(),
        "function (int32) returning pointer to function (int32) returning int32"
    );

    let TypeKind::Function(outer) = declaration.ty.kind() else {
        panic!("Expected function type");
    };
    let TypeKind::Pointer(pointee) = outer.return_type.kind() else {
        panic!("Expected pointer return type");
    };
    assert!(matches!(pointee.kind(), TypeKind::Function(inner) if inner.parameters.len() == 1));
}

#[test]
fn test_function_pointer_call() {
    let source = r#"
        int32 twice(int32 x) { return x * 2; }
        int32 apply(int32 (*f)(int32), int32 value) {
            return (*f)(value);
        }
        int32 main() {
            return apply(&twice, 21);
        }
    "#;

    parse(source);
}

#[test]
fn test_distinct_types_are_nominal() {
    let source = r#"
        distinct int32 Meters;
        distinct int32 Feet;
        Meters add(Meters a, Meters b) { return a + b; }
    "#;
    parse(source);

    let err = parse_err(&format!("{source}\nFeet f = 3;\nMeters m = add(f, f);"));
    assert_eq!(err.message, "Argument 1 has type Feet, expected Meters");

    let err = parse_err("distinct int32 Meters; int32 x; Meters m = x;");
    assert!(err.message.contains("does not match declared type"));

    // An explicit cast converts between the two
    parse("distinct int32 Meters; int32 x; Meters m = (Meters) x;");
}

#[test]
fn test_shadowing_and_redeclaration() {
    let err = parse_err("void f() { int32 x; int32 x; }");
    assert!(err.message.contains("already declared"));

    let file = parse("void f() { int32 x; { bool x; x = x == x; } x = 1; }");
    let Statement::Function { body, .. } = &file.statements[0] else {
        panic!("Expected function definition");
    };
    let Statement::Scope(inner) = &body.statements[1] else {
        panic!("Expected nested scope");
    };
    let Statement::Assignment { target, .. } = &inner.statements[1] else {
        panic!("Expected assignment");
    };
    assert!(target.ty().is_bool());
}

#[test]
fn test_name_expression_keeps_declaration() {
    let file = parse("int16 limit; int16 f() { return limit; }");

    let Statement::Function { body, .. } = &file.statements[1] else {
        panic!("Expected function definition");
    };
    let Statement::Return {
        value: Some(Expression::Name { declaration, .. }),
        ..
    } = &body.statements[0]
    else {
        panic!("Expected return of a name");
    };
    let Statement::Declaration(limit) = &file.statements[0] else {
        panic!("Expected declaration");
    };
    assert!(std::rc::Rc::ptr_eq(declaration, limit));
}

#[test]
fn test_typed_arrays_and_pointers() {
    let source = r#"
        int8 table[4][2];
        int8 (*row)[2];
        int8 *cells[3];
        void f() {
            int8 *p = *cells;
        }
    "#;
    let err = parse_err(source);
    // cells is an array, not a pointer
    assert!(err.message.starts_with("No unary operator '*'"));

    let file = parse("int8 table[4][2]; int8 (*row)[2];");
    let types: Vec<String> = file
        .statements
        .iter()
        .map(|statement| match statement {
            Statement::Declaration(declaration) => declaration.ty.to_string(),
            other => panic!("Expected declaration, got {other:?}"),
        })
        .collect();
    assert_eq!(
        types,
        vec!["array 4 of array 2 of int8", "pointer to array 2 of int8"]
    );
}

#[test]
fn test_lexical_errors_come_first() {
    let err = parse_err("int32 x = y;\nint32 z = $;");

    assert_eq!(err.message, "Unknown character '$'");
    assert_eq!(err.position.line, 2);
}

#[test]
fn test_parse_file_reports_missing_file() {
    let err = parse_file("does/not/exist.lc").unwrap_err();

    assert!(err.message.starts_with("Unable to read file"));
    assert_eq!(err.to_string().split(':').next(), Some("does/not/exist.lc"));
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 1);
}

#[test]
fn test_parse_file_reads_source() {
    let path = std::env::temp_dir().join(format!("lilc-test-{}.lc", std::process::id()));
    std::fs::write(&path, "int32 main() { return 0; }\n").unwrap();

    let result = parse_file(&path);
    std::fs::remove_file(&path).unwrap();

    let file = result.unwrap();
    assert_eq!(file.statements.len(), 1);
    assert_eq!(file.filepath, path.display().to_string());
}

#[test]
fn test_deeply_nested_input() {
    let depth = 10_000;

    let source = format!("int32 x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    let file = parse(&source);
    let Statement::Declaration(declaration) = &file.statements[0] else {
        panic!("Expected declaration");
    };
    assert!(matches!(
        declaration.value,
        Some(Expression::Integer { value: 1, .. })
    ));

    let source = format!("int32 x; int32 y = {}x;", "-".repeat(depth));
    let file = parse(&source);
    assert_eq!(file.statements.len(), 2);

    let blocks = 2_000;
    let source = format!(
        "int32 f() {{ {}return 0;{} }}",
        "{ ".repeat(blocks),
        " }".repeat(blocks)
    );
    parse(&source);

    let source = format!("int32 {}value{};", "(".repeat(1_000), ")".repeat(1_000));
    let file = parse(&source);
    let Statement::Declaration(declaration) = &file.statements[0] else {
        panic!("Expected declaration");
    };
    assert_eq!(declaration.name, "value");

    // Still a normal error, reported at the unclosed position
    let source = format!("int32 x = {}1;", "(".repeat(depth));
    let err = parse_err(&source);
    assert!(err.message.starts_with("Expected ')' after expression"));
    assert_eq!(err.position.column, 12 + depth);
}
