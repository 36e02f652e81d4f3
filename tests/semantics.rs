//! Namespace rules: duplicate keys, redefinition, immutability, nesting.

use tomlet::{parse, Value};

fn err(doc: &str) -> String {
    parse(doc).unwrap_err().to_string()
}

#[test]
fn scalars_strings_and_empty_arrays() {
    let doc = parse("one=1 \n two='two' \n arr=[]").unwrap();
    assert_eq!(doc.get("one").unwrap(), &Value::Integer(1));
    assert_eq!(doc.get("two").unwrap().as_str().unwrap(), "two");
    assert!(doc.get("arr").unwrap().as_array().unwrap().is_empty());
    assert_eq!(doc.len(), 3);
}

#[test]
fn sub_table_first_then_parent() {
    let doc = parse("[a.b]\n c = 1\n[a]\n d = 2").unwrap();
    let a = doc.get("a").unwrap().as_table().unwrap();
    assert_eq!(
        a.get("b").unwrap().as_table().unwrap().get("c").unwrap(),
        &Value::Integer(1)
    );
    assert_eq!(a.get("d").unwrap(), &Value::Integer(2));

    assert!(err("[a.b]\n c = 1\n[a]\n d = 2\n[a.b]")
        .starts_with("Can not declare \"a.b\" twice"));
}

#[test]
fn headers_cannot_reopen_namespaces() {
    assert!(err("[a]\n[a]").starts_with("Can not declare \"a\" twice"));
    assert!(err("a = 1\n[a]").starts_with("Can not overwrite a value"));
    assert!(err("a.b = 1\n[a]").starts_with("Can not declare \"a\" twice"));
    assert!(err("a.b = 1\n[a.b]").starts_with("Can not overwrite a value"));
    assert!(err("[[a]]\n[a]").starts_with("Can not declare \"a\" twice"));
    assert!(err("[a]\n[[a]]").starts_with("Can not overwrite a value"));
}

#[test]
fn values_cannot_be_overwritten() {
    assert!(err("a = 1\na = 2").starts_with("Can not define \"a\" twice"));
    assert!(err("\"a\" = 1\na = 2").starts_with("Can not define \"a\" twice"));
    assert!(err("a = 1\na.b = 2").starts_with("Can not overwrite a value"));
    assert!(err("[t]\nx = 1\nx = 2").starts_with("Can not define \"t.x\" twice"));
}

#[test]
fn array_of_tables_appends() {
    let doc = parse("[[arr]]\n a = 1\n[[arr]]\n b = 2").unwrap();
    let arr = doc.get("arr").unwrap().as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(
        arr.get(0).unwrap().as_table().unwrap().get("a").unwrap(),
        &Value::Integer(1)
    );
    assert_eq!(
        arr.get(1).unwrap().as_table().unwrap().get("b").unwrap(),
        &Value::Integer(2)
    );
}

#[test]
fn each_array_element_is_a_fresh_namespace() {
    // The same sub-table may be opened again for every element.
    let doc = parse("[[arr]]\n[arr.sub]\nx = 1\n[[arr]]\n[arr.sub]\nx = 2").unwrap();
    let arr = doc.get("arr").unwrap().as_array().unwrap();
    assert_eq!(arr.len(), 2);
    for (i, expected) in [1_i64, 2].into_iter().enumerate() {
        let sub = arr.get(i).unwrap().as_table().unwrap().get("sub").unwrap();
        assert_eq!(
            sub.as_table().unwrap().get("x").unwrap(),
            &Value::Integer(expected)
        );
    }

    // But not twice for the same element.
    assert!(err("[[arr]]\n[arr.sub]\n[arr.sub]").starts_with("Can not declare \"arr.sub\" twice"));
}

#[test]
fn inline_values_are_immutable() {
    assert!(err("x = {y = 1}\n[x.z]\n w = 2")
        .starts_with("Can not mutate immutable namespace \"x\""));
    assert!(err("x = {y = 1}\nx.z = 2").starts_with("Can not mutate immutable namespace \"x\""));
    assert!(err("x = [1]\n[[x]]").starts_with("Can not mutate immutable namespace \"x\""));
    assert!(err("x = []\n[x.y]").starts_with("Can not mutate immutable namespace \"x\""));
    assert!(err("x = {}\n[x]").starts_with("Can not mutate immutable namespace \"x\""));
}

#[test]
fn inline_tables_nest_dotted_keys_locally() {
    let doc = parse("t = {a.b = 1, a.c = 2}").unwrap();
    let a = doc
        .get("t")
        .unwrap()
        .as_table()
        .unwrap()
        .get("a")
        .unwrap()
        .as_table()
        .unwrap();
    assert_eq!(a.get("b").unwrap(), &Value::Integer(1));
    assert_eq!(a.get("c").unwrap(), &Value::Integer(2));

    assert!(err("t = {a = 1, a = 2}").starts_with("Duplicate inline table key \"a\""));
    assert!(err("t = {a = 1, a.b = 2}").starts_with("Can not overwrite a value"));
    assert!(
        err("t = {a = {}, a.b = 2}").starts_with("Can not mutate immutable namespace \"a\"")
    );
}

#[test]
fn inline_tables_stay_on_one_line() {
    assert!(parse("t = {a = 1,\nb = 2}").is_err());
    // ...except where a value legally spans lines.
    let doc = parse("t = {s = \"\"\"a\nb\"\"\", arr = [1,\n2]}").unwrap();
    let t = doc.get("t").unwrap().as_table().unwrap();
    assert_eq!(t.get("s").unwrap().as_str().unwrap(), "a\nb");
    assert_eq!(t.get("arr").unwrap().as_array().unwrap().len(), 2);
}

#[test]
fn trailing_commas() {
    let doc = parse("a = [1, 2,]\nb = [\n  3,\n  # comment\n]").unwrap();
    assert_eq!(doc.get("a").unwrap().as_array().unwrap().len(), 2);
    assert_eq!(doc.get("b").unwrap().as_array().unwrap().len(), 1);

    // Inline tables permit none.
    assert!(parse("t = {a = 1,}").is_err());
}

#[test]
fn dotted_keys_cannot_reenter_defined_namespaces() {
    assert!(err("[[a.b]]\n[a]\nb.y = 2").starts_with("Can not redefine namespace \"a.b\""));
    assert!(err("[fruit]\napple.color = \"red\"\n[fruit.apple]")
        .starts_with("Can not declare \"fruit.apple\" twice"));

    // Sibling dotted keys under the same header stay legal.
    let doc = parse("[t]\na.b = 1\na.c = 2").unwrap();
    let a = doc
        .get("t")
        .unwrap()
        .as_table()
        .unwrap()
        .get("a")
        .unwrap()
        .as_table()
        .unwrap();
    assert_eq!(a.len(), 2);
}

#[test]
fn nesting_depth_is_bounded() {
    let ok = format!("a = {}{}", "[".repeat(100), "]".repeat(100));
    assert!(parse(&ok).is_ok());

    let too_deep = format!("a = {}{}", "[".repeat(200), "]".repeat(200));
    assert!(err(&too_deep).starts_with("Maximum nesting depth exceeded"));

    let inline = format!("a = {}{}", "{b = ".repeat(200), "}".repeat(200));
    assert!(err(&inline).starts_with("Maximum nesting depth exceeded"));
}

#[test]
fn keys_may_be_numeric_or_empty() {
    let doc = parse("3.14159 = \"pi\"\n\"\" = \"blank\"").unwrap();
    let three = doc.get("3").unwrap().as_table().unwrap();
    assert_eq!(three.get("14159").unwrap().as_str().unwrap(), "pi");
    assert_eq!(doc.get("").unwrap().as_str().unwrap(), "blank");
}

#[test]
fn blank_documents() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("  \n\t\n").unwrap().is_empty());
    assert!(parse("# only a comment").unwrap().is_empty());
    assert!(parse("# comment\n# another\n").unwrap().is_empty());
}
