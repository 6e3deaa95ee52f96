use forthc::lang::code::Cell;
use forthc::runtime::built_ins::register_primitives;
use forthc::runtime::compiler::Compiler;
use forthc::runtime::data_structures::dictionary::Dictionary;
use forthc::runtime::data_structures::string_pool::StringPool;
use forthc::runtime::error::{ErrorKind, Result};
use forthc::runtime::image::CompiledImage;
use forthc::runtime::interpreter::Machine;
use test_case::test_case;

fn compile(source: &str) -> Result<CompiledImage> {
    Compiler::new().compile_source("<test>", source)
}

fn run(source: &str) -> Result<(String, i64)> {
    let image = compile(source)?;
    let mut output = Vec::new();
    let status = Machine::new(&image).run(&mut output)?;

    Ok((String::from_utf8(output).unwrap(), status))
}

// Some primitives consume a bare string reference, which no source construct leaves on the
// stack.  These are exercised through hand assembled images instead.
fn hand_image(texts: &[&str], build: impl Fn(&Dictionary, &[usize]) -> Vec<Cell>) -> CompiledImage {
    let mut dictionary = Dictionary::new();
    let mut strings = StringPool::new();

    register_primitives(&mut dictionary);

    let ids: Vec<usize> = texts
        .iter()
        .map(|text| strings.intern(text.to_string()))
        .collect();

    let entry = build(&dictionary, &ids);

    CompiledImage {
        dictionary,
        strings,
        entry,
    }
}

fn run_image(image: &CompiledImage) -> (String, i64) {
    let mut output = Vec::new();
    let status = Machine::new(image).run(&mut output).unwrap();

    (String::from_utf8(output).unwrap(), status)
}

fn xt(dictionary: &Dictionary, name: &str) -> Cell {
    Cell::ExecToken(dictionary.lookup(name).unwrap())
}

#[test]
fn greet_prints_exactly_hi() {
    let (output, status) = run(": greet .\" hi\" ; greet").unwrap();

    assert_eq!(output, "hi");
    assert_eq!(status, 0);
}

#[test]
fn top_level_quoted_text_prints() {
    let (output, _) = run(".\" one\" .\" two\"").unwrap();

    assert_eq!(output, "onetwo");
}

#[test]
fn print_int_keeps_the_leading_space() {
    let (output, _) = run("3 4 + print-int").unwrap();

    assert_eq!(output, " 7");
}

#[test_case("1 2 + print-int", " 3" ; "add")]
#[test_case("5 2 - print-int", " 3" ; "sub")]
#[test_case("6 7 * print-int", " 42" ; "mul")]
#[test_case("9 2 / print-int", " 4" ; "div")]
#[test_case("9 2 mod print-int", " 1" ; "rem")]
#[test_case("3 3 = print-int", " -1" ; "equal true")]
#[test_case("3 4 = print-int", " 0" ; "equal false")]
#[test_case("2 3 < print-int", " -1" ; "less true")]
#[test_case("3 2 > print-int", " -1" ; "greater true")]
#[test_case("0 0= print-int", " -1" ; "zero equals true")]
#[test_case("5 0= print-int", " 0" ; "zero equals false")]
#[test_case("1 2 swap print-int print-int", " 1 2" ; "swap")]
#[test_case("1 2 over print-int print-int print-int", " 1 2 1" ; "over")]
#[test_case("7 dup + print-int", " 14" ; "dup")]
#[test_case("1 2 drop print-int", " 1" ; "drop")]
fn stack_and_arithmetic_words(source: &str, expected: &str) {
    let (output, _) = run(source).unwrap();

    assert_eq!(output, expected);
}

#[test]
fn colon_words_nest_through_the_return_stack() {
    let (output, _) = run(": sq dup * ; : quad sq sq ; 2 quad print-int").unwrap();

    assert_eq!(output, " 16");
}

#[test]
fn zero_branch_takes_the_branch_on_zero() {
    let source = ": check 0branch .no .\" yes\" branch .done .no: .\" no\" .done: ; \
                  0 check 1 check";
    let (output, _) = run(source).unwrap();

    assert_eq!(output, "noyes");
}

#[test]
fn backward_branches_loop() {
    // Count down from 3, printing each value until the counter hits zero.
    let source = ": count .loop: dup 0branch .done dup print-int 1 - branch .loop .done: drop ; \
                  3 count";
    let (output, _) = run(source).unwrap();

    assert_eq!(output, " 3 2 1");
}

#[test]
fn the_entry_sequence_supports_its_own_labels() {
    let (output, _) = run("branch .skip .\" dropped\" .skip: .\" kept\"").unwrap();

    assert_eq!(output, "kept");
}

#[test]
fn foo_pushes_eight_then_seven() {
    let (output, _) = run("foo print-int print-int").unwrap();

    assert_eq!(output, " 7 8");
}

#[test]
fn bar_halts_with_the_second_value_as_the_status() {
    let (output, status) = run("foo bar .\" never\"").unwrap();

    assert_eq!(output, "");
    assert_eq!(status, 8);
}

#[test]
fn bye_halts_immediately() {
    let (output, status) = run(".\" before\" bye .\" after\"").unwrap();

    assert_eq!(output, "before");
    assert_eq!(status, 0);
}

#[test]
fn redefinition_binds_old_callers_to_the_old_body() {
    let source = ": f 1 ; : g f print-int ; : f 2 ; : h f print-int ; g h";
    let (output, _) = run(source).unwrap();

    assert_eq!(output, " 1 2");
}

#[test]
fn number_parses_an_interned_string() {
    let image = hand_image(&["42"], |dictionary, ids| {
        vec![
            Cell::StringRef(ids[0]),
            xt(dictionary, "number"),
            xt(dictionary, "print-int"),
            xt(dictionary, "exit"),
        ]
    });

    assert_eq!(run_image(&image), (" 42".to_string(), 0));
}

#[test]
fn string_equals_compares_texts_not_identities() {
    // Two distinct pool entries holding the same text still compare equal.
    let image = hand_image(&["x", "x", "y"], |dictionary, ids| {
        vec![
            Cell::StringRef(ids[0]),
            Cell::StringRef(ids[1]),
            xt(dictionary, "string="),
            xt(dictionary, "print-int"),
            Cell::StringRef(ids[0]),
            Cell::StringRef(ids[2]),
            xt(dictionary, "string="),
            xt(dictionary, "print-int"),
            xt(dictionary, "exit"),
        ]
    });

    assert_eq!(run_image(&image).0, " -1 0");
}

#[test]
fn find_word_pushes_the_token_or_minus_one() {
    let image = hand_image(&["dup", "missing"], |dictionary, ids| {
        vec![
            Cell::StringRef(ids[0]),
            xt(dictionary, "find-word"),
            xt(dictionary, "print-int"),
            Cell::StringRef(ids[1]),
            xt(dictionary, "find-word"),
            xt(dictionary, "print-int"),
            xt(dictionary, "exit"),
        ]
    });

    let (output, _) = run_image(&image);
    let dup_id = image.dictionary.lookup("dup").unwrap();

    assert_eq!(output, format!(" {} -1", dup_id));
}

#[test]
fn find_word_sees_the_newest_of_a_shadowed_name() {
    let image = compile(": f 1 ; : f 2 ;").unwrap();
    let newest = image.dictionary.lookup("f").unwrap();

    assert_eq!(newest, image.dictionary.len() - 1);
}

#[test]
fn tick_pushes_a_numeric_execution_token() {
    let image = compile(": w 1 ; ' w print-int").unwrap();
    let id = image.dictionary.lookup("w").unwrap();

    let mut output = Vec::new();
    let _ = Machine::new(&image).run(&mut output).unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), format!(" {}", id));
}

#[test]
fn division_by_zero_is_an_execution_fault() {
    let error = run("1 0 /").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Execution);
}

#[test]
fn stack_underflow_is_an_execution_fault() {
    let error = run("drop").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Execution);
}

#[test]
fn the_machine_leaves_untouched_values_on_the_stack() {
    let image = compile("1 2 3 drop").unwrap();
    let mut machine = Machine::new(&image);
    let mut output = Vec::new();

    let _ = machine.run(&mut output).unwrap();

    assert_eq!(machine.stack().len(), 2);
}
