use std::fs;

use corvid::{interpreter::value::core::Value, run_source};
use walkdir::WalkDir;

fn assert_success(src: &str) {
    if let Err(e) = run_source(src, "") {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    if run_source(src, "").is_ok() {
        panic!("Script succeeded but was expected to fail")
    }
}

fn eval(src: &str) -> Value {
    match run_source(src, "") {
        Ok(value) => value,
        Err(e) => panic!("Script failed: {e}"),
    }
}

#[test]
fn scripts_work() {
    let mut count = 0;

    for entry in WalkDir::new("tests/scripts").into_iter()
                                              .filter_map(Result::ok)
                                              .filter(|e| {
                                                  e.path()
                                                   .extension()
                                                   .is_some_and(|ext| ext == "crl")
                                              })
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        if let Err(e) = run_source(&content, &path.display().to_string()) {
            panic!("Script {path:?} failed:\n{e}");
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}

#[test]
fn arithmetic_and_function_calls() {
    assert_eq!(eval("spell add(a, b): return a + b\nadd(2, 3)"), Value::Integer(5));
    assert_success("x = 1 + 2\ncheck x == 3");
    assert_success("x = 7 * 9\ncheck x == 63");
    assert_success("x = 8 - 5\ncheck x == 3");
    assert_success("check 2 ** 10 == 1024");
    assert_success("check 7 % 3 == 1");
}

#[test]
fn integer_division_truncates_and_floats_promote() {
    assert_success("check 7 / 2 == 3");
    assert_success("check 7.0 / 2 == 3.5");
    assert_success("check 1 == 1.0");
    assert_success("check 2 != 1.5");
    assert_success("check 3.14 > 3");
}

#[test]
fn division_by_zero_is_error() {
    assert_failure("x = 1 / 0");
    assert_failure("x = 1.0 / 0.0");
    assert_failure("x = 1 % 0");
    assert_failure("x = 4\nx /= 0");
}

#[test]
fn bitwise_operators() {
    assert_success("check (1 << 4) == 16");
    assert_success("check (256 >> 4) == 16");
    assert_success("check (6 & 3) == 2");
    assert_success("check (6 | 3) == 7");
    assert_success("check (6 ^ 3) == 5");
    assert_success("check ~0 == -1");
}

#[test]
fn compound_assignments() {
    assert_success("x = 2\nx += 3\ncheck x == 5");
    assert_success("x = 7\nx -= 2\ncheck x == 5");
    assert_success("x = 4\nx *= 2\ncheck x == 8");
    assert_success("x = 9\nx /= 3\ncheck x == 3");
    assert_failure("x = 9\nx += \"one\"");
}

#[test]
fn increment_and_decrement() {
    assert_success("x = 5\n++x\n--x\ncheck x == 5");
    assert_success("x = 5\ncheck ++x == 6\ncheck x == 6");
    assert_success("x = 5\ny = x++\ncheck y == 5\ncheck x == 6");
    assert_success("x = 5\ny = x--\ncheck y == 5\ncheck x == 4");
    assert_failure("s = \"a\"\n++s");
    assert_failure("++missing");
}

#[test]
fn truthiness() {
    assert_success("check 0");
    assert_success("check not \"\"");
    assert_success("check not []");
    assert_success("check not ()");
    assert_success("check not {}");
    assert_success("check not None");
    assert_success("check [0]");
}

#[test]
fn short_circuit_logicals() {
    // The right side must not be evaluated at all.
    assert_success("x = False and missing\ncheck x == False");
    assert_success("x = True or missing\ncheck x == True");
    assert_success("check (\"\" and 5) == \"\"");
    assert_success("check (None or 5) == 5");
}

#[test]
fn strings_and_fstrings() {
    assert_success("check \"foo\" + \"bar\" == \"foobar\"");
    assert_success("check \"a\" != \"b\"");
    assert_success("check len(\"corvid\") == 6");
    assert_success("x = 5\ncheck f\"val {x + 1}\" == \"val 6\"");
    assert_success("check f\"{{literal}}\" == \"{literal}\"");
    assert_success("name = \"crow\"\ncheck f\"a {name} cries\" == \"a crow cries\"");
}

#[test]
fn docstrings_span_lines() {
    assert_success("x = \"\"\"first\nsecond\"\"\"\ncheck len(x) == 12");
}

#[test]
fn comments_are_skipped() {
    assert_success("// leading comment\nx = 1 /* inline */ + 2\n/* spans\nlines */\ncheck x == 3");
}

#[test]
fn arrays_and_indexing() {
    assert_success("a = [1, 2, 3]\ncheck a[0] == 1\ncheck a[2] == 3");
    assert_success("a = [1, 2, 3]\ncheck a[-1] == 3\ncheck a[-3] == 1");
    assert_success("a = [1, 2]\ncheck a[5] == None\ncheck a[-3] == None");
    assert_success("a = [1, 2, 3]\na[1] = 20\ncheck a[1] == 20");
    assert_success("a = [1, 2, 3]\na[-1] = 30\ncheck a[2] == 30");
    assert_failure("a = [1]\na[5] = 2");
}

#[test]
fn array_concatenation_does_not_alias() {
    assert_success("a = [1, 2]\nb = [3]\nc = a + b\ncheck len(c) == 3\nc[0] = 99\ncheck a[0] == 1");
}

#[test]
fn array_aliasing_is_observable() {
    assert_success("a = [1, 2]\nb = a\nb[0] = 99\ncheck a[0] == 99");
}

#[test]
fn array_slicing() {
    assert_success("a = [10, 20, 30, 40, 50]\nb = a[1:4]\ncheck len(b) == 3\ncheck b[0] == 20\ncheck b[2] == 40");
    assert_success("a = [1, 2, 3]\nb = a[-1:]\ncheck len(b) == 1\ncheck b[0] == 3");
    assert_success("a = [1, 2, 3, 4]\nb = a[-2:]\ncheck len(b) == 2\ncheck b[0] == 3");
    assert_success("a = [1, 2, 3, 4]\ncheck len(a[10:]) == 0");
    assert_success("a = [1, 2, 3, 4]\ncheck len(a[:-10]) == 0");
    assert_success("a = [1, 2, 3, 4]\ncheck len(a[:2]) == 2");
    assert_success("a = [1, 2, 3]\nb = a[:]\nb[0] = 9\ncheck a[0] == 1");
}

#[test]
fn hashes() {
    assert_success("h = {\"a\": 1, 2: \"two\", True: 3}\ncheck h[\"a\"] == 1\ncheck h[2] == \"two\"\ncheck h[True] == 3");
    assert_success("h = {\"a\": 1}\ncheck h[\"missing\"] == None");
    assert_success("h = {}\ncheck len(h) == 0");
    assert_failure("h = {[1]: 2}");
    assert_failure("h = {\"a\": 1}\nh[[1]]");
}

#[test]
fn tuples() {
    assert_success("t = (1, 2, 3)\ncheck t[0] == 1\ncheck t[-1] == 3\ncheck t[9] == None");
    assert_success("t = (1, 2)\ncheck len(t) == 2");
}

#[test]
fn tuple_swap() {
    assert_success("a = 1\nb = 2\n(a, b) = (b, a)\ncheck a == 2\ncheck b == 1");
}

#[test]
fn tuple_unpacking() {
    assert_success("(a, b, c) = [10, 20, 30]\ncheck a == 10\ncheck c == 30");
    assert_success("(a, (b, c)) = (1, (2, 3))\ncheck a == 1\ncheck b == 2\ncheck c == 3");
    assert_failure("(a, b) = (1, 2, 3)");
    assert_failure("(a, b) = 7");
}

#[test]
fn single_tuple_argument_unpacks() {
    assert_success("spell add(a, b): return a + b\nt = (1, 2)\ncheck add(t) == 3");
}

#[test]
fn if_otherwise_else() {
    assert_success("x = 5\nif x > 3:\n    y = \"big\"\notherwise x > 1:\n    y = \"mid\"\nelse:\n    y = \"small\"\ncheck y == \"big\"");
    assert_success("x = 2\nif x > 3:\n    y = \"big\"\notherwise x > 1:\n    y = \"mid\"\nelse:\n    y = \"small\"\ncheck y == \"mid\"");
    assert_success("x = 0\nif x > 3:\n    y = \"big\"\notherwise x > 1:\n    y = \"mid\"\nelse:\n    y = \"small\"\ncheck y == \"small\"");
}

#[test]
fn while_loops() {
    assert_success("i = 0\nwhile i < 5:\n    i = i + 1\ncheck i == 5");
    assert_success("i = 0\nwhile True:\n    i = i + 1\n    if i == 3:\n        stop\ncheck i == 3");
    assert_success("i = 0\ntotal = 0\nwhile i < 5:\n    i = i + 1\n    if i == 2:\n        skip\n    total = total + i\ncheck total == 13");
}

#[test]
fn for_loops() {
    assert_success("total = 0\nfor x in [1, 2, 3]:\n    total = total + x\ncheck total == 6");
    assert_success("total = 0\nfor x in [1, 2, 3, 4]:\n    if x == 2:\n        skip\n    total = total + x\ncheck total == 8");
    assert_success("pairs = [(1, 2), (3, 4)]\ntotal = 0\nfor (a, b) in pairs:\n    total = total + a * b\ncheck total == 14");
    assert_failure("for x in 42:\n    y = x");
}

#[test]
fn for_else() {
    assert_success("found = False\nfor x in [1, 2]:\n    y = x\nelse:\n    found = True\ncheck found");
    assert_success("hit = False\nfor x in [1, 2]:\n    stop\nelse:\n    hit = True\ncheck hit == False");
}

#[test]
fn match_statements() {
    assert_success("x = 2\nmatch x:\n    case 1:\n        y = \"one\"\n    case 2:\n        y = \"two\"\n    case _:\n        y = \"other\"\ncheck y == \"two\"");
    assert_success("x = \"b\"\nmatch x:\n    case \"a\":\n        y = 1\n    case \"b\":\n        y = 2\ncheck y == 2");
    assert_success("x = 99\nmatch x:\n    case 1:\n        y = \"one\"\n    case _:\n        y = \"other\"\ncheck y == \"other\"");
    // Only integers and strings ever match; other types fall through.
    assert_success("x = True\nmatch x:\n    case 1:\n        y = \"int\"\n    case _:\n        y = \"fell through\"\ncheck y == \"fell through\"");
}

#[test]
fn check_statement() {
    assert_success("check True");
    assert_failure("check False");
    assert_failure("check 1 == 2, \"numbers differ\"");
}

#[test]
fn return_at_top_level() {
    assert_eq!(eval("return 42\nmissing_is_never_reached"), Value::Integer(42));
}

#[test]
fn grimoire_with_inheritance_and_super() {
    assert_eq!(eval("grim Animal:\n    spell speak():\n        return \"?\"\ngrim Dog(Animal):\n    spell speak():\n        return super.speak() + \"!\"\nDog().speak()"),
               Value::Str("?!".to_string()));
}

#[test]
fn grimoire_fields_and_methods() {
    assert_success("grim Point:\n    init(self, x, y):\n        self.x = x\n        self.y = y\n    spell total(self):\n        return self.x + self.y\np = Point(3, 4)\ncheck p.x == 3\ncheck p.total() == 7");
}

#[test]
fn instance_fields_alias() {
    assert_success("grim Box:\n    init(self, v):\n        self.v = v\na = Box(1)\nb = a\nb.v = 99\ncheck a.v == 99");
}

#[test]
fn method_defaults_apply() {
    assert_success("spell greet(name = \"world\"):\n    return \"hi \" + name\ncheck greet() == \"hi world\"\ncheck greet(\"crow\") == \"hi crow\"");
    assert_success("spell pad(x, n = None):\n    if n == None:\n        return x\n    return x + n\ncheck pad(1) == 1\ncheck pad(1, 2) == 3");
}

#[test]
fn visibility_modifiers() {
    let secret = "grim Secret:\n    spell __hidden(self):\n        return 1\n    spell reveal(self):\n        return self.__hidden()\n";
    assert_success(&format!("{secret}s = Secret()\ncheck s.reveal() == 1"));
    assert_failure(&format!("{secret}s = Secret()\ns.__hidden()"));

    let guarded = "grim Base:\n    spell _guarded(self):\n        return 2\ngrim Child(Base):\n    spell use_guarded(self):\n        return self._guarded()\n";
    assert_success(&format!("{guarded}c = Child()\ncheck c.use_guarded() == 2"));
    assert_failure(&format!("{guarded}c = Child()\nc._guarded()"));
}

#[test]
fn arcane_grimoires() {
    let shape = "arcane grim Shape:\n    arcanespell area(self):\n        ignore\n";
    assert_failure(&format!("{shape}s = Shape()"));
    assert_success(&format!("{shape}grim Square(Shape):\n    init(self, side):\n        self.side = side\n    spell area(self):\n        return self.side * self.side\ncheck Square(3).area() == 9"));
    assert_failure(&format!("{shape}grim Blob(Shape):\n    spell noop(self):\n        return None"));
}

#[test]
fn attempt_ensnare_resolve() {
    assert_success("grim ValueError:\n    init(self, msg):\n        self.message = msg\nx = \"start\"\ny = \"start\"\nattempt:\n    raise ValueError(\"bad\")\nensnare ValueError:\n    x = \"caught\"\nresolve:\n    y = \"done\"\ncheck x == \"caught\"\ncheck y == \"done\"");
}

#[test]
fn ensnare_matches_by_name() {
    assert_success("x = 0\nattempt:\n    raise \"boom\"\nensnare \"Error\":\n    x = 1\ncheck x == 1");
    assert_success("x = 0\nattempt:\n    y = 1 / 0\nensnare \"DivisionByZeroError\":\n    x = 2\ncheck x == 2");
}

#[test]
fn unmatched_errors_propagate() {
    assert_failure("grim A:\n    init(self, msg):\n        self.message = msg\ngrim B:\n    init(self, msg):\n        self.message = msg\nattempt:\n    raise A(\"oops\")\nensnare B:\n    x = 1");
}

#[test]
fn resolve_always_runs() {
    assert_success("y = 0\nattempt:\n    raise \"boom\"\nensnare \"Error\":\n    x = 1\nresolve:\n    y = 1\ncheck y == 1");
    // An uncaught error still runs resolve before propagating.
    assert_failure("attempt:\n    raise \"boom\"\nresolve:\n    y = 1");
}

#[test]
fn resolve_errors_supersede() {
    assert_failure("attempt:\n    x = 1\nresolve:\n    raise \"boom\"");
}

#[test]
fn raising_non_errors_fails() {
    assert_failure("raise 42");
}

#[test]
fn builtins() {
    assert_success("check len([1, 2, 3]) == 3");
    assert_success("check type(1) == \"INTEGER\"\ncheck type(1.5) == \"FLOAT\"\ncheck type(\"s\") == \"STRING\"");
    assert_success("check str(42) == \"42\"");
    assert_success("check int(\"42\") == 42\ncheck int(3.9) == 3\ncheck int(True) == 1");
    assert_success("check float(2) == 2.0");
    assert_success("r = range(5)\ncheck len(r) == 5\ncheck r[0] == 0\ncheck r[4] == 4");
    assert_success("r = range(2, 10, 3)\ncheck len(r) == 3\ncheck r[2] == 8");
    assert_success("check abs(-4) == 4\ncheck abs(2.5) == 2.5");
    assert_success("check max(1, 7, 3) == 7\ncheck min(4, 2.5, 9) == 2.5");
    assert_failure("int(\"not a number\")");
    assert_failure("range(1, 10, 0)");
    assert_failure("len(42)");
}

#[test]
fn builtins_resolve_before_environment() {
    // The registry is consulted first, so builtin names cannot be
    // shadowed.
    assert_success("len = 5\ncheck len([1, 2]) == 2");
}

#[test]
fn unknown_identifier_is_error() {
    assert_failure("check missing == 1");
}

#[test]
fn imports_bind_grimoires() {
    assert_success("import \"tests/modules/shapes\"\nc = Circle(2)\ncheck c.area() == 12");
    // Non-grimoire module bindings stay module-local.
    assert_failure("import \"tests/modules/shapes\"\ncheck PI == 3");
}

#[test]
fn imports_with_alias_bind_a_namespace() {
    assert_success("import \"tests/modules/shapes\" as shapes\ncheck shapes.PI == 3\ncheck shapes.double(4) == 8\nc = shapes.Circle(1)\ncheck c.area() == 3");
}

#[test]
fn imports_are_idempotent() {
    assert_success("import \"tests/modules/shapes\"\nimport \"tests/modules/shapes\"\nc = Circle(1)\ncheck c.area() == 3");
}

#[test]
fn missing_import_is_error() {
    assert_failure("import \"tests/modules/no_such_module\"");
}
