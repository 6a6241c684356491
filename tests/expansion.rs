use std::io::Write;

use pretty_assertions::assert_eq;
use pyone::{expand, ExpandError, ExpansionEngine};

fn expanded(fragment: &str) -> String {
    expand(fragment).unwrap().to_string()
}

#[test]
fn statements_and_blocks() {
    assert_eq!(expanded("A; B; C"), "A\nB\nC");
    assert_eq!(expanded("A { B; C }"), "A:\n    B\n    C");
}

#[test]
fn quoted_delimiters_stay_on_one_line() {
    let expansion = expand(r#"print("a;b{c}d")"#).unwrap();
    assert_eq!(expansion.to_string(), r#"print("a;b{c}d")"#);
    assert_eq!(expansion.lines()[0].depth, 0);
    assert_eq!(expansion.depth(), 0);
}

#[test]
fn query_with_semicolon_in_literal() {
    assert_eq!(
        expanded(r#"db=connect("foo.db"); for row in db.execute("SELECT * FROM FOO;"){print(row)}"#),
        r#"
db=connect("foo.db")
for row in db.execute("SELECT * FROM FOO;"):
    print(row)
"#
        .trim()
    );
}

#[test]
fn html_table_scraper() {
    let fragment = concat!(
        r#"class P(HTMLParser){ "#,
        r#"z=0; def handle_starttag(self,t,_){ if(t=="tr"){self.r=[]} "#,
        r#"elif(t=="td"){self.z=1}} def handle_endtag(self,t){ "#,
        r#"if(t=="tr"){print(",".join(self.r))}elif(t=="td"){self.z=0}} "#,
        r#"def handle_data(self,s){if(self.z){self.r.append(s)}}} "#,
        r#"P().feed(urlopen(argv[1]).read().decode("utf-8"))"#,
    );

    let expected = r#"
class P(HTMLParser):
    z=0
    def handle_starttag(self,t,_):
        if(t=="tr"):
            self.r=[]
        elif(t=="td"):
            self.z=1
    def handle_endtag(self,t):
        if(t=="tr"):
            print(",".join(self.r))
        elif(t=="td"):
            self.z=0
    def handle_data(self,s):
        if(self.z):
            self.r.append(s)
P().feed(urlopen(argv[1]).read().decode("utf-8"))
"#
    .trim();

    let expansion = expand(fragment).unwrap();
    assert_eq!(expansion.to_string(), expected);
    assert_eq!(expansion.depth(), 0);
}

#[test]
fn record_loop_nested_in_block() {
    let expansion = expand("P{EL{Q}}").unwrap();
    let lines: Vec<_> = expansion
        .lines()
        .iter()
        .map(|line| (line.depth, line.text.as_str()))
        .collect();
    assert_eq!(
        lines,
        [
            (0, "P:"),
            (1, "for (L,S) in enumerate(fileinput.input()):"),
            (2, "s = S.strip()"),
            (2, "F = s.split(DELIM)"),
            (2, "I = [ toint(v) for v in F ]"),
            (2, "Q"),
        ]
    );
    assert_eq!(expansion.depth(), 0);
}

#[test]
fn record_loop_with_nested_blocks() {
    assert_eq!(
        expanded("EL{ if I[0] > 10 { print(L, s) } }"),
        r#"
for (L,S) in enumerate(fileinput.input()):
    s = S.strip()
    F = s.split(DELIM)
    I = [ toint(v) for v in F ]
    if I[0] > 10:
        print(L, s)
"#
        .trim()
    );
}

#[test]
fn empty_statements_are_dropped() {
    let expansion = expand("A;;B").unwrap();
    assert_eq!(expansion.to_lines(), ["A", "B"]);
}

#[test]
fn nested_blocks() {
    let expansion = expand("A{B{C}D}").unwrap();
    assert_eq!(expansion.to_string(), "A:\n    B:\n        C\n    D");
    assert_eq!(expansion.depth(), 0);
}

#[test]
fn unbalanced_close_is_reported() {
    let err = expand("x = 1; print(x) }; y").unwrap_err();
    match &err {
        ExpandError::UnbalancedClose { trailing } => assert_eq!(trailing, " print(x) }; y"),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.to_string(), "invalid syntax:  print(x) }; y");
}

#[test]
fn balanced_close_succeeds() {
    let expansion = expand("A{B}").unwrap();
    assert_eq!(expansion.to_lines(), ["A:", "    B"]);
    assert_eq!(expansion.depth(), 0);
}

#[test]
fn expands_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"for i in range(2) {\n  print(i)\n}\n").unwrap();
    let expansion = ExpansionEngine::new().expand_file(file.path()).unwrap();
    assert_eq!(
        expansion.to_string(),
        "for i in range(2):\n    print(i)"
    );
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = std::sync::Arc::new(ExpansionEngine::new());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let fragment = format!("{}x{}", "a{".repeat(n), "}".repeat(n));
                engine.expand(&fragment).map(|expansion| expansion.depth())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 0);
    }
}
