use anyhow::Result;
use trellis_eval::{Context, EvalError, EvalErrorKind, Executor, parse};
use trellis_syntax::{
    Grammar, MatchMode, ReferenceRule, Rule, Snapshot, TextSource, compile_grammar,
};

fn grammar(lines: &[&str]) -> Grammar {
    let document = format!("```trellis\n{}\n```\n", lines.join("\n"));
    compile_grammar(&document).unwrap()
}

#[test]
fn test_or_accepts_each_alternative() -> Result<()> {
    let grammar = grammar(&["X = 'and' | 'or'"]);

    for input in ["and", "or"] {
        let tree = parse(&grammar, &Snapshot::new(input))?;
        assert_eq!(tree.root().label(), "ROOT");
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().text(), input);
    }
    Ok(())
}

#[test]
fn test_or_rejects_other_input() -> Result<()> {
    let grammar = grammar(&["X = 'and' | 'or'"]);
    let snapshot = Snapshot::new("xor");

    assert!(Executor::new(&grammar, &snapshot).execute_production("X", 0)?.is_none());

    let tree = parse(&grammar, &snapshot)?;
    assert_eq!(tree.root().label(), "ROOT");
    assert!(tree.root().children().is_empty());
    assert_eq!(tree.root().text(), "xor");
    Ok(())
}

#[test]
fn test_ordered_choice_takes_first_success() -> Result<()> {
    let grammar = grammar(&["ROOT = SHORT | LONG", "SHORT = 'a'", "LONG = 'a' 'b'"]);
    let tree = parse(&grammar, &Snapshot::new("ab"))?;

    assert_eq!(tree.root().label(), "SHORT");
    assert_eq!(tree.root().span().len(), 1);
    Ok(())
}

#[test]
fn test_failed_alternative_leaves_no_trace() -> Result<()> {
    // The first alternative consumes "a" before failing on "c".
    let grammar = grammar(&["ROOT = AB | AC", "AB = 'a' 'b'", "AC = 'a' 'c'"]);
    let tree = parse(&grammar, &Snapshot::new("ac"))?;

    let root = tree.root();
    assert_eq!(root.label(), "AC");
    assert_eq!(root.span().start(), 0);
    assert_eq!(root.text(), "ac");
    assert_eq!(root.children().len(), 2);
    Ok(())
}

#[test]
fn test_top_level_and_failure_yields_root_tree() -> Result<()> {
    // The And matches 'a' and then fails; nothing reverts the cursor inside
    // the And, and parse() discards it anyway.
    let grammar = grammar(&["ROOT = 'a' 'b'"]);
    let snapshot = Snapshot::new("ac");
    let tree = parse(&grammar, &snapshot)?;

    let root = tree.root();
    assert_eq!(root.label(), "ROOT");
    assert!(root.children().is_empty());
    assert_eq!(root.span().start(), 0);
    assert_eq!(root.span().len(), snapshot.len());
    Ok(())
}

#[test]
fn test_reference_labels_with_reference_name() -> Result<()> {
    let grammar = grammar(&[
        "ASSIGN = TARGET '=' VALUE",
        "TARGET = NAME",
        "VALUE = NAME",
        "NAME = '^[a-z]+'",
    ]);
    let tree = parse(&grammar, &Snapshot::new("x = y"))?;

    let root = tree.root();
    assert_eq!(root.label(), "ROOT");
    let labels: Vec<_> = root.children().iter().map(|c| c.label()).collect();
    assert_eq!(labels, vec!["TARGET", "ROOT", "VALUE"]);
    assert_eq!(root.children()[0].children()[0].label(), "NAME");
    assert_eq!(root.children()[2].text(), "y");
    Ok(())
}

#[test]
fn test_self_recursion() -> Result<()> {
    let grammar = grammar(&["LIST = ITEM LIST | ITEM", "ITEM = 'x'"]);
    let tree = parse(&grammar, &Snapshot::new("x x x"))?;

    let items = tree.root().find_all("ITEM").filter(|n| n.is_leaf()).count();
    assert_eq!(items, 3);
    assert_eq!(tree.root().text(), "x x x");
    Ok(())
}

#[test]
fn test_mutual_recursion() -> Result<()> {
    let grammar = grammar(&["A = 'a' B | 'a'", "B = 'b' A | 'b'"]);
    let tree = parse(&grammar, &Snapshot::new("abab"))?;

    assert_eq!(tree.root().span().len(), 4);
    let labels: Vec<_> = tree.root().leaves().map(|n| n.label()).collect();
    assert_eq!(labels, vec!["ROOT", "B", "A", "B"]);
    Ok(())
}

#[test]
fn test_dangling_reference_unreached_is_fine() -> Result<()> {
    let grammar = grammar(&["ROOT = 'a' | MISSING"]);
    let tree = parse(&grammar, &Snapshot::new("a"))?;

    assert_eq!(tree.root().text(), "a");
    Ok(())
}

#[test]
fn test_dangling_reference_reached_is_error() {
    let grammar = grammar(&["ROOT = 'a' | MISSING"]);
    let err = parse(&grammar, &Snapshot::new("b")).unwrap_err();

    let eval_err = err.downcast_ref::<EvalError>().unwrap();
    assert_eq!(eval_err.missing_production(), Some("MISSING"));
    assert_eq!(eval_err.offset, Some(0));
}

#[test]
fn test_resolution_error_is_not_swallowed_by_or() {
    // The failing alternative is followed by one that would match.
    let grammar = grammar(&["ROOT = BROKEN | 'b'", "BROKEN = 'x' | GONE"]);
    let err = parse(&grammar, &Snapshot::new("b")).unwrap_err();

    assert_eq!(
        err.downcast_ref::<EvalError>().unwrap().missing_production(),
        Some("GONE")
    );
}

#[test]
fn test_invalid_pattern_reported_lazily() -> Result<()> {
    let grammar = grammar(&["ROOT = 'a' | BAD", "BAD = '^[oops'"]);

    parse(&grammar, &Snapshot::new("a"))?;

    let err = parse(&grammar, &Snapshot::new("z")).unwrap_err();
    let eval_err = err.downcast_ref::<EvalError>().unwrap();
    assert!(matches!(eval_err.kind, EvalErrorKind::InvalidPattern { .. }));
    Ok(())
}

#[test]
fn test_lexical_production_keeps_whitespace() -> Result<()> {
    let grammar = grammar(&["WORD = _PAIR", "_PAIR = 'a' 'b'"]);

    let tree = parse(&grammar, &Snapshot::new("ab"))?;
    assert_eq!(tree.root().children()[0].label(), "_PAIR");

    let tree = parse(&grammar, &Snapshot::new("a b"))?;
    assert!(tree.root().children().is_empty());

    let tree = parse(&grammar, &Snapshot::new(" ab"))?;
    assert!(tree.root().children().is_empty());
    Ok(())
}

#[test]
fn test_regex_terminal_skips_whitespace_outside_lexical_mode() -> Result<()> {
    let grammar = grammar(&["PAIR = ID ID", "ID = '^[a-z_][a-z0-9_]*'"]);
    let tree = parse(&grammar, &Snapshot::new("foo   bar_2"))?;

    let ids: Vec<_> = tree.root().find_all("ID").filter(|n| n.is_leaf()).map(|n| n.text()).collect();
    assert_eq!(ids, vec!["foo", "bar_2"]);
    Ok(())
}

#[test]
fn test_trailing_input_is_not_required() -> Result<()> {
    let grammar = grammar(&["ROOT = 'a'"]);
    let tree = parse(&grammar, &Snapshot::new("a trailing"))?;

    assert_eq!(tree.root().text(), "a");
    Ok(())
}

#[test]
fn test_spans_count_characters() -> Result<()> {
    let grammar = grammar(&["ROOT = 'é' 'x'"]);
    let tree = parse(&grammar, &Snapshot::new(" é x"))?;

    let children = tree.root().children();
    assert_eq!(children[0].span().start(), 1);
    assert_eq!(children[1].span().start(), 3);
    assert_eq!(tree.root().span().len(), 3);
    Ok(())
}

#[test]
fn test_regex_word_boundary_inside_word_fails() -> Result<()> {
    let grammar = grammar(&["ROOT = A B", "A = 'a'", r"B = '^\bx'"]);

    let tree = parse(&grammar, &Snapshot::new("ax"))?;
    assert!(tree.root().children().is_empty());

    let tree = parse(&grammar, &Snapshot::new("a x"))?;
    assert_eq!(tree.root().children().len(), 2);
    assert_eq!(tree.root().children()[1].text(), "x");
    Ok(())
}

#[test]
fn test_explicit_lexical_reference_without_underscore() -> Result<()> {
    let grammar = grammar(&["LINE = WORD", "WORD = 'a' 'b'"]);
    let snapshot = Snapshot::new("a b");
    let executor = Executor::new(&grammar, &snapshot);

    let lexical = Rule::Reference(ReferenceRule::with_mode("WORD", MatchMode::Lexical));
    assert!(executor.execute_rule(&lexical, Context::root(), 0)?.is_none());

    let skipping = Rule::Reference(ReferenceRule::new("WORD"));
    let matched = executor.execute_rule(&skipping, Context::root(), 0)?.unwrap();
    assert_eq!(matched.node.label(), "WORD");
    assert_eq!(matched.end, 3);
    Ok(())
}

struct StaticChars(&'static [char]);

impl TextSource for StaticChars {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn char_at(&self, offset: usize) -> char {
        self.0[offset]
    }
}

#[test]
fn test_host_text_source() -> Result<()> {
    const CHARS: &[char] = &['i', 'd', ' ', 'é', '4', '2'];
    let snapshot = Snapshot::from_source(StaticChars(CHARS), 7);

    assert_eq!(snapshot.version(), 7);
    assert_eq!(snapshot.len(), 6);
    assert_eq!(snapshot.whole_text(), "id é42");
    assert_eq!(snapshot.byte_offset(4), 5);

    let grammar = grammar(&[
        "ENTRY = NAME ACCENT NUMBER",
        "NAME = '^[a-z]+'",
        "ACCENT = 'é'",
        r"NUMBER = '^\B[0-9]+'",
    ]);
    let tree = parse(&grammar, &snapshot)?;

    let leaves: Vec<_> = tree.root().leaves().map(|n| n.text()).collect();
    assert_eq!(leaves, vec!["id", "é", "42"]);
    assert_eq!(tree.root().children()[2].span().start(), 4);
    Ok(())
}
