// Integration tests for PL/I to Python translation

use plipy::{translate, Credentials, TranslateError, Translator, TranslatorConfig};

fn procedure(body: &str) -> String {
    format!("p: proc options(main);\n{}\nend p;\n", body)
}

fn code(body: &str) -> String {
    translate(&procedure(body))
        .unwrap_or_else(|e| panic!("translation failed: {}", e))
        .code
}

#[test]
fn test_precedence_is_preserved() {
    let code = code("dcl x fixed bin(15); x = 5 + 3 * 2; put skip list(x);");
    assert!(code.contains("    x = 5 + 3 * 2\n"));
    assert!(code.contains("    print(x)\n"));
}

#[test]
fn test_substr_and_index() {
    let code = code(
        "dcl s char(10) varying; dcl i fixed bin(15);
         s = 'abcdef';
         put skip list(substr(s, 2, 3));
         put skip list(substr(s, 4));
         i = index(s, 'b');",
    );
    assert!(code.contains("print(_pli_str(s)[1:4])"), "{}", code);
    assert!(code.contains("print(_pli_str(s)[3:])"), "{}", code);
    assert!(code.contains("i = _pli_str(s).find('b') + 1"), "{}", code);
    assert!(code.contains("def _pli_str(value):"), "{}", code);
}

#[test]
fn test_substr_with_huge_length_translates() {
    let code = code("dcl s char(10) varying; s = substr(s, 2, 9223372036854775807);");
    assert!(
        code.contains("s = _pli_str(s)[1:1 + 9223372036854775807]"),
        "{}",
        code
    );
}

#[test]
fn test_arrays_are_padded_and_directly_indexed() {
    let code = code(
        "dcl a(5) fixed bin(31); dcl m(2, 3) char(4);
         a(5) = 1; m(2, 3) = 'x';",
    );
    assert!(code.contains("a = [0] * 7"));
    assert!(code.contains("m = [[''] * 5 for _ in range(4)]"));
    assert!(code.contains("a[5] = 1"));
    assert!(code.contains("m[2][3] = 'x'"));
}

#[test]
fn test_select_renders_as_chain() {
    let code = code(
        "dcl c fixed bin(15);
         select (c);
           when (1) put skip list('one');
           when (2, 3) do; put skip list('two'); put skip list('three'); end;
           other put skip list('many');
         end;",
    );
    assert!(code.contains("    if c == 1:\n        print('one')\n"));
    assert!(code.contains("    elif c in (2, 3):\n        print('two')\n        print('three')\n"));
    assert!(code.contains("    else:\n        print('many')\n"));
}

#[test]
fn test_keywords_are_case_insensitive() {
    let code = translate("P: PROCEDURE OPTIONS(MAIN); DECLARE X FIXED BINARY(15); X = 1; END P;")
        .unwrap()
        .code;
    assert!(code.contains("def p():\n    x = 0\n    x = 1\n"));
}

#[test]
fn test_comments_are_dropped() {
    let code = code("/* header */ dcl x fixed bin; /* set it */ x = 2;");
    assert!(!code.contains("header"));
    assert!(code.contains("x = 2"));
}

#[test]
fn test_reserved_names_are_renamed() {
    let code = code("dcl print fixed bin(15); dcl len char(5); print = 1; len = 'a';");
    assert!(code.contains("print_ = 1"));
    assert!(code.contains("len_ = 'a'"));
}

#[test]
fn test_helpers_only_when_used() {
    let plain = code("put skip list('hi');");
    assert!(!plain.contains("_pli_get"));
    assert!(!plain.contains("_pli_open"));
    assert!(!plain.contains("_pli_sql"));
    assert!(!plain.contains("import"));
    assert!(!plain.contains("_pli_str"));

    let input = code("dcl n fixed bin(15); get list(n);");
    assert!(input.contains("import re\n"));
    assert!(input.contains("def _pli_get(name):"));
    assert!(!input.contains("_pli_open"));

    let files = code("open file('log') output; close file('log');");
    assert!(files.contains("import sys"));
    assert!(files.contains("def _pli_open(name, mode):"));
    assert!(!files.contains("def _pli_sql"));
}

#[test]
fn test_query_without_credentials_reads_environment() {
    let code = code("dcl n fixed bin(31); exec sql \"SELECT COUNT(*) FROM t\" into :n;");
    assert!(code.contains("n = _pli_sql('SELECT COUNT(*) FROM t')"));
    assert!(code.contains("os.environ.get('PLIPY_DB_PASSWORD', '')"));
}

#[test]
fn test_query_with_credentials_embeds_them() {
    let config = TranslatorConfig::new().with_credentials(Credentials {
        host: "db".to_string(),
        user: "app".to_string(),
        password: "secret".to_string(),
        database: "shop".to_string(),
    });
    let code = Translator::new(config)
        .translate(&procedure("dcl n fixed bin(31); exec sql \"SELECT 1\" into n;"))
        .unwrap()
        .code;
    assert!(code.contains("'password': 'secret',"));
    assert!(!code.contains("os.environ"));
}

#[test]
fn test_syntax_error_names_token_and_location() {
    let err = translate("p: proc options(main);\n  x = 1\n  y = 2;\nend p;").unwrap_err();
    assert!(matches!(err, TranslateError::Syntax { .. }));
    assert_eq!(err.location().line, 3);
    let message = err.to_string();
    assert!(message.contains("line 3"), "{}", message);
    assert!(message.contains("'y'"), "{}", message);
}

#[test]
fn test_unexpected_end_of_input() {
    let err = translate("p: proc options(main); x = 1;").unwrap_err();
    assert!(err.to_string().contains("end of input"), "{}", err);
}

#[test]
fn test_mismatched_end_label() {
    let err = translate("p: proc options(main); end q;").unwrap_err();
    assert!(matches!(err, TranslateError::Syntax { .. }));
}

#[test]
fn test_declaration_errors() {
    for body in [
        "dcl x char(5) fixed;",
        "dcl x bin(15);",
        "dcl x fixed bin varying;",
        "dcl a(0) fixed bin;",
        "dcl a(2, 2, 2) fixed bin;",
        "dcl x fixed bin; dcl x char(3);",
    ] {
        let err = translate(&procedure(body)).unwrap_err();
        assert!(
            matches!(err, TranslateError::Declaration { .. }),
            "{}: {}",
            body,
            err
        );
    }
}

#[test]
fn test_subscript_errors() {
    for body in [
        "dcl x fixed bin; x(1) = 1;",
        "dcl m(2, 2) fixed bin; m(1) = 1;",
        "dcl a(3) fixed bin; a(1, 1) = 1;",
    ] {
        let err = translate(&procedure(body)).unwrap_err();
        assert!(
            matches!(err, TranslateError::Subscript { .. }),
            "{}: {}",
            body,
            err
        );
    }
}

#[test]
fn test_lexical_problems_do_not_abort() {
    let program = translate(&procedure("dcl x fixed bin; x = 1 @ ;")).unwrap();
    assert_eq!(program.diagnostics.len(), 1);
    assert!(program.code.contains("x = 1\n"));
}

#[test]
fn test_translation_is_deterministic() {
    let source = procedure("dcl i fixed bin; do i = 1 to n by k; put skip list(i); end;");
    assert_eq!(translate(&source).unwrap(), translate(&source).unwrap());
}
