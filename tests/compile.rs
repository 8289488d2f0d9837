// Integration tests for the MicroJava front end

use mjc::parser::lexer::TokenKind;
use mjc::parser::parse::Parser;

#[test]
fn test_well_formed_program_compiles_cleanly() {
    let source = r"
        program Demo
          final int limit = 100;
          int total;
        {
          void main()
            int i;
          {
            i = 0;
            total = 0;
            while (i < limit) {
              total = total + i;
              i = i + 1;
            }
            print(total);
          }
        }
    ";

    let mut parser = Parser::new(source);
    let errors = parser.parse();

    assert_eq!(errors, 0);
    assert!(parser.diagnostics().is_empty());
    // Loads and arithmetic were emitted along the way.
    assert!(parser.code().pc() > 0);
}

#[test]
fn test_classes_arrays_and_methods() {
    let source = r"
        program Shapes
          class Point { int x; int y; }
          Point origin;
          int coords[];
        {
          int sum(int a, int b) { return a + b; }

          void main() {
            origin = new Point;
            origin.x = 1;
            origin.y = 2;
            coords = new int[2];
            coords[0] = origin.x;
            coords[1] = origin.y;
            print(sum(coords[0], coords[1]));
          }
        }
    ";

    let mut parser = Parser::new(source);
    assert_eq!(parser.parse(), 0);
}

#[test]
fn test_character_handling() {
    let source = r"
        program Chars
          final char newline = '\n';
          char c;
          char line[];
        {
          void main() {
            line = new char[80];
            read(c);
            line[0] = c;
            if (c != newline) print(c);
          }
        }
    ";

    let mut parser = Parser::new(source);
    assert_eq!(parser.parse(), 0);
}

#[test]
fn test_type_errors_are_all_reported() {
    let source = r"
        program Bad
          int x;
          char c;
          int a[];
        {
          void main() {
            x = c;
            a = x;
            c = a[x] ;
          }
        }
    ";

    let mut parser = Parser::new(source);
    // Three independent type mismatches, each far enough from the previous
    // one to clear the report debounce.
    assert_eq!(parser.parse(), 3);
}

#[test]
fn test_malformed_program_recovers_to_end_of_input() {
    // A missing semicolon and a malformed token must not wedge the parser.
    let source = r#"program P int x; { void main() { x = "bad" } }"#;

    let mut parser = Parser::new(source);
    let errors = parser.parse();

    assert!(errors >= 1);
    // The parser consumed everything and settled on end of file.
    assert_eq!(parser.diagnostics().count(), errors);
}

#[test]
fn test_lexical_errors_become_diagnostics() {
    let source = "program P int x; { void main() { x = 2147483648 # ; } }";

    let mut parser = Parser::new(source);
    let errors = parser.parse();

    // The oversized literal is reported by the scanner, the stray '#'
    // surfaces through the parser's recovery.
    assert!(errors >= 2);
    assert!(parser
        .diagnostics()
        .iter()
        .any(|d| d.message == "integer constant too large"));
}

#[test]
fn test_diagnostic_format() {
    let mut parser = Parser::new("program P { void main() { y = 1; } }");
    parser.parse();

    let rendered: Vec<String> = parser.diagnostics().iter().map(|d| d.to_string()).collect();
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].starts_with("-- line 1 col "));
    assert!(rendered[0].ends_with("'y' is undeclared"));
}

#[test]
fn test_scopes_end_with_their_method() {
    let source = r"
        program Scopes
        {
          void first()
            int local;
          { local = 1; }

          void second() { local = 2; }
        }
    ";

    let mut parser = Parser::new(source);
    // `local` died with `first`; the reference inside `second` is undeclared.
    assert_eq!(parser.parse(), 1);
}

#[test]
fn test_shadowing_picks_the_inner_name() {
    let source = r"
        program Shadow
          char x;
        {
          void main()
            int x;
          {
            x = 3;
          }
        }
    ";

    let mut parser = Parser::new(source);
    // The local int x shadows the global char x, so the assignment checks.
    assert_eq!(parser.parse(), 0);
}

#[test]
fn test_two_compilations_are_independent() {
    let mut bad = Parser::new("program P { void main() { y = 1; } }");
    assert_eq!(bad.parse(), 1);

    // A fresh session starts with clean scopes, counters, and code.
    let mut good = Parser::new("program P int y; { void main() { y = 1; } }");
    assert_eq!(good.parse(), 0);
}

#[test]
fn test_token_stream_drives_the_parser_to_eof() {
    use mjc::diagnostics::Diagnostics;
    use mjc::parser::lexer::Scanner;

    let mut scanner = Scanner::new("program P { }");
    let mut diags = Diagnostics::new();
    let mut kinds = Vec::new();
    loop {
        let token = scanner.next(&mut diags);
        kinds.push(token.kind);
        if token.kind == TokenKind::Eof {
            break;
        }
    }

    assert_eq!(
        kinds,
        vec![
            TokenKind::Program,
            TokenKind::Ident,
            TokenKind::Lbrace,
            TokenKind::Rbrace,
            TokenKind::Eof,
        ]
    );
    assert_eq!(diags.count(), 0);
}
