use pyone::{
    runtime::{Preamble, Program},
    ExpansionEngine,
};

fn main() {
    // Create a new `ExpansionEngine` indenting with two spaces
    let engine = ExpansionEngine::new().with_indent("  ");

    // Sum the second column of every input line that has one
    let script = r#"total = 0
        EL{ if len(I) > 1 { total += I[1] } else { print("skipping line", L) } };
        print("total:", total)"#;

    let expected = r#"
total = 0
for (L,S) in enumerate(fileinput.input()):
  s = S.strip()
  F = s.split(DELIM)
  I = [ toint(v) for v in F ]
  if len(I) > 1:
    total += I[1]
  else:
    print("skipping line", L)
print("total:", total)
    "#
    .trim();

    let expansion = engine.expand(script).unwrap();
    assert_eq!(expansion.to_string(), expected);

    // Import everything from `math` and split fields on commas instead of spaces
    let mut preamble = Preamble::new();
    preamble.import_all_from("math");

    let program = Program::new(preamble, expansion).with_delimiter(",");
    assert!(program.bootstrap().contains("DELIM = \",\""));
    println!("{}", program.listing());
}
