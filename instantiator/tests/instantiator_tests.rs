/* End-to-end instantiation tests over hand-described Rust types */

use instantiator::{
    Arguments, ClassConstructor, Describe, InstantiateError, Instance, Instantiator, Parameter,
    Parameters, PrimitiveKind, Scalar, Target, TypeDesc,
};
use std::convert::Infallible;
use std::error::Error;

#[derive(Debug, Clone, PartialEq)]
struct OneString {
    some_string: String,
}

impl Describe for OneString {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "OneString",
            vec![ClassConstructor::new(|mut args: Arguments| {
                Ok(OneString {
                    some_string: args.take(0)?,
                })
            })
            .formal("some_string", String::describe())],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct OneInteger {
    an_integer: i32,
}

impl Describe for OneInteger {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "OneInteger",
            vec![ClassConstructor::new(|mut args: Arguments| {
                Ok(OneInteger {
                    an_integer: args.take(0)?,
                })
            })
            .formal("an_integer", i32::describe())],
        )
    }
}

#[derive(Debug)]
struct OneDouble {
    a_double: f64,
}

impl Describe for OneDouble {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "OneDouble",
            vec![ClassConstructor::new(|mut args: Arguments| {
                Ok(OneDouble {
                    a_double: args.take(0)?,
                })
            })
            .formal("a_double", f64::describe())],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TwoArguments {
    one: i32,
    two: i32,
}

impl Describe for TwoArguments {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "TwoArguments",
            vec![ClassConstructor::new(|mut args: Arguments| {
                Ok(TwoArguments {
                    one: args.take(0)?,
                    two: args.take(1)?,
                })
            })
            .formal("one", i32::describe())
            .formal("two", i32::describe())],
        )
    }
}

#[derive(Debug, PartialEq)]
enum TwoConstructors {
    Numbers(i32, i32),
    Strings(String, String),
}

impl Describe for TwoConstructors {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "TwoConstructors",
            vec![
                ClassConstructor::new(|mut args: Arguments| {
                    Ok(TwoConstructors::Numbers(args.take(0)?, args.take(1)?))
                })
                .formal("one", i32::describe())
                .formal("two", i32::describe()),
                ClassConstructor::new(|mut args: Arguments| {
                    Ok(TwoConstructors::Strings(args.take(0)?, args.take(1)?))
                })
                .formal("a", String::describe())
                .formal("b", String::describe()),
            ],
        )
    }
}

#[derive(Debug, PartialEq)]
struct OneConstructible {
    arg: OneInteger,
}

impl Describe for OneConstructible {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "OneConstructible",
            vec![ClassConstructor::new(|mut args: Arguments| {
                Ok(OneConstructible { arg: args.take(0)? })
            })
            .formal("arg", OneInteger::describe())],
        )
    }
}

#[derive(Debug, PartialEq)]
struct TwoConstructible {
    one: OneString,
    two: OneInteger,
}

impl Describe for TwoConstructible {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "TwoConstructible",
            vec![ClassConstructor::new(|mut args: Arguments| {
                Ok(TwoConstructible {
                    one: args.take(0)?,
                    two: args.take(1)?,
                })
            })
            .formal("one", OneString::describe())
            .formal("two", OneInteger::describe())],
        )
    }
}

#[derive(Debug, PartialEq)]
struct TwoLevels {
    level2: OneConstructible,
}

impl Describe for TwoLevels {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "TwoLevels",
            vec![ClassConstructor::new(|mut args: Arguments| {
                Ok(TwoLevels {
                    level2: args.take(0)?,
                })
            })
            .formal("level2", OneConstructible::describe())],
        )
    }
}

#[derive(Debug, PartialEq)]
struct Mixed {
    one: i32,
    two: OneInteger,
}

impl Describe for Mixed {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "Mixed",
            vec![ClassConstructor::new(|mut args: Arguments| {
                Ok(Mixed {
                    one: args.take(0)?,
                    two: args.take(1)?,
                })
            })
            .formal("one", i32::describe())
            .formal("two", OneInteger::describe())],
        )
    }
}

/* Rejects negative values from inside its constructor */
#[derive(Debug)]
struct Positive(u32);

impl Describe for Positive {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "Positive",
            vec![ClassConstructor::new(|mut args: Arguments| {
                let value: i64 = args.take(0)?;
                if value < 0 {
                    return Err(format!("{value} is negative").into());
                }
                Ok(Positive(value as u32))
            })
            .formal("value", i64::describe())],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Low,
    High,
}

impl Describe for Level {
    fn describe() -> TypeDesc {
        TypeDesc::enumeration("Level", [("Low", Level::Low), ("High", Level::High)])
    }
}

#[derive(Debug, PartialEq)]
struct Empty;

#[derive(Debug, PartialEq)]
struct Holder {
    e: Empty,
}

impl Describe for Empty {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate("Empty", vec![ClassConstructor::new(|_: Arguments| Ok(Empty))])
    }
}

impl Describe for Holder {
    fn describe() -> TypeDesc {
        TypeDesc::aggregate(
            "Holder",
            vec![ClassConstructor::new(|mut args: Arguments| Ok(Holder { e: args.take(0)? }))
                .formal("e", Empty::describe())],
        )
    }
}

fn instantiator() -> Instantiator {
    Instantiator::new()
}

#[test]
fn instantiates_primitives() {
    let target: Target<i32> = Target::create("any");
    let value = instantiator()
        .instantiate(&target, Parameter::new("any", "25"))
        .expect("instantiate");
    assert_eq!(value, 25);
}

#[test]
fn instantiates_primitives_through_wrapper_target() {
    let target: Target<Box<i32>> = Target::create("any");
    let value = instantiator()
        .instantiate(&target, Parameter::new("any", "25"))
        .expect("instantiate");
    assert_eq!(*value, 25);
}

#[test]
fn instantiates_with_one_integer_argument() {
    let target: Target<OneInteger> = Target::create("one_arg");
    let object = instantiator()
        .instantiate(&target, Parameter::new("one_arg.an_integer", "42"))
        .expect("instantiate");
    assert_eq!(object.an_integer, 42);
}

#[test]
fn instantiates_with_one_double_argument() {
    let target: Target<OneDouble> = Target::create("one_arg");
    let object = instantiator()
        .instantiate(&target, Parameter::new("one_arg.a_double", "42.0"))
        .expect("instantiate");
    assert!((object.a_double - 42.0).abs() < 0.001);
}

#[test]
fn instantiates_with_two_primitive_arguments() {
    let target: Target<TwoArguments> = Target::create("two_arguments");
    let object = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("two_arguments.one", "1"),
                Parameter::new("two_arguments.two", "2"),
            ],
        )
        .expect("instantiate");
    assert_eq!(object, TwoArguments { one: 1, two: 2 });
}

#[test]
fn picks_the_constructor_the_parameters_witness() {
    let target: Target<TwoConstructors> = Target::create("two_constructors");
    let numbers = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("two_constructors.one", "1"),
                Parameter::new("two_constructors.two", "2"),
            ],
        )
        .expect("instantiate");
    assert_eq!(numbers, TwoConstructors::Numbers(1, 2));

    let strings = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("two_constructors.a", "x"),
                Parameter::new("two_constructors.b", "y"),
            ],
        )
        .expect("instantiate");
    assert_eq!(strings, TwoConstructors::Strings("x".into(), "y".into()));
}

#[test]
fn instantiates_recursively() {
    let target: Target<OneConstructible> = Target::create("root");
    let object = instantiator()
        .instantiate(&target, Parameter::new("root.arg.an_integer", "8"))
        .expect("instantiate");
    assert_eq!(object.arg.an_integer, 8);
}

#[test]
fn ignores_parameters_unrelated_to_the_target_in_any_order() {
    let target: Target<OneString> = Target::create("relevant");
    let relevant = Parameter::new("relevant.some_string", "ok");
    let irrelevant = Parameter::new("irrelevant.some_string", "not ok");

    let forward = instantiator()
        .instantiate(&target, [relevant.clone(), irrelevant.clone()])
        .expect("instantiate");
    let backward = instantiator()
        .instantiate(&target, [irrelevant, relevant])
        .expect("instantiate");
    assert_eq!(forward.some_string, "ok");
    assert_eq!(forward, backward);
}

#[test]
fn instantiates_multiple_nested_arguments() {
    let target: Target<TwoConstructible> = Target::create("root");
    let object = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("root.one.some_string", "a"),
                Parameter::new("root.two.an_integer", "2"),
            ],
        )
        .expect("instantiate");
    assert_eq!(object.one.some_string, "a");
    assert_eq!(object.two.an_integer, 2);
}

#[test]
fn instantiates_two_levels_deep() {
    let target: Target<TwoLevels> = Target::create("root");
    let object = instantiator()
        .instantiate(&target, Parameter::new("root.level2.arg.an_integer", "42"))
        .expect("instantiate");
    assert_eq!(object.level2.arg.an_integer, 42);
}

#[test]
fn mixes_constructible_and_primitive_arguments() {
    let target: Target<Mixed> = Target::create("root");
    let object = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("root.one", "555"),
                Parameter::new("root.two.an_integer", "666"),
            ],
        )
        .expect("instantiate");
    assert_eq!(
        object,
        Mixed {
            one: 555,
            two: OneInteger { an_integer: 666 }
        }
    );
}

#[test]
fn missing_witness_is_no_constructor_found() {
    let target: Target<OneInteger> = Target::create("root");
    match instantiator().instantiate(&target, Parameter::new("root.a", "")) {
        Err(InstantiateError::NoConstructorFound {
            type_name,
            available,
            candidates,
        }) => {
            assert_eq!(type_name, "OneInteger");
            assert_eq!(available, vec!["a"]);
            assert_eq!(candidates, vec!["(an_integer: i32)"]);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn interfaces_are_invalid_types() {
    let target: Target = Target::with_type(TypeDesc::interface("CharSequence"), "root");
    let result = instantiator().instantiate_erased(&target, &Parameter::new("root.a", "").into());
    assert!(matches!(result, Err(InstantiateError::InvalidType { .. })));
}

#[test]
fn abstract_aggregates_are_invalid_types() {
    let target: Target = Target::with_type(TypeDesc::abstract_aggregate("Shape"), "root");
    let result = instantiator().instantiate_erased(&target, &Parameter::new("root.a", "").into());
    assert!(matches!(result, Err(InstantiateError::InvalidType { .. })));
}

#[test]
fn uninhabited_types_are_invalid() {
    let target: Target<Infallible> = Target::create("root");
    match instantiator().instantiate(&target, Parameter::new("root.a", "")) {
        Err(InstantiateError::InvalidType {
            type_name, target, ..
        }) => {
            assert_eq!(type_name, "Infallible");
            assert_eq!(target, "root");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn instantiates_a_list_of_single_argument_elements() {
    let target: Target<Vec<OneString>> = Target::create("root");
    let objects = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("root.some_string", "bla"),
                Parameter::new("root.some_string", "ble"),
            ],
        )
        .expect("instantiate");
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].some_string, "bla");
    assert_eq!(objects[1].some_string, "ble");
}

#[test]
fn raw_lists_are_invalid_types() {
    let target: Target = Target::with_type(TypeDesc::RawList, "foo");
    let result =
        instantiator().instantiate_erased(&target, &Parameter::new("foo.bar", "baz").into());
    assert!(matches!(result, Err(InstantiateError::InvalidType { .. })));
}

#[test]
fn instantiates_a_list_of_multi_argument_elements() {
    let target: Target<Vec<TwoArguments>> = Target::create("root");
    let objects = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("root.one", "1"),
                Parameter::new("root.two", "2"),
                Parameter::new("root.one", "11"),
                Parameter::new("root.two", "22"),
            ],
        )
        .expect("instantiate");
    assert_eq!(
        objects,
        vec![
            TwoArguments { one: 1, two: 2 },
            TwoArguments { one: 11, two: 22 },
        ]
    );
}

#[test]
fn instantiates_lists_of_scalars_and_empty_lists() {
    let target: Target<Vec<u16>> = Target::create("ports");
    let ports = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("ports", "80"),
                Parameter::new("ports", "443"),
                Parameter::new("ports", "80"),
            ],
        )
        .expect("instantiate");
    assert_eq!(ports, vec![80, 443, 80]);

    let empty = instantiator()
        .instantiate(&target, Parameter::new("other", "1"))
        .expect("instantiate");
    assert!(empty.is_empty());
}

#[test]
fn lists_nested_inside_aggregates() {
    #[derive(Debug)]
    struct Team {
        members: Vec<OneString>,
    }

    let desc = TypeDesc::aggregate(
        "Team",
        vec![ClassConstructor::new(|mut args: Arguments| {
            Ok(Team {
                members: args.take(0)?,
            })
        })
        .formal("members", <Vec<OneString>>::describe())],
    );
    let target: Target<Team> = Target::with_type(desc, "team");
    let team = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("team.members.some_string", "ada"),
                Parameter::new("team.members.some_string", "grace"),
            ],
        )
        .expect("instantiate");
    let names: Vec<&str> = team.members.iter().map(|m| m.some_string.as_str()).collect();
    assert_eq!(names, vec!["ada", "grace"]);
}

#[test]
fn enumerations_decode_from_names_and_ordinals() {
    let target: Target<Level> = Target::create("level");
    assert_eq!(
        instantiator()
            .instantiate(&target, Parameter::new("level", "High"))
            .expect("by name"),
        Level::High
    );
    assert_eq!(
        instantiator()
            .instantiate(&target, Parameter::new("level", "0"))
            .expect("by ordinal"),
        Level::Low
    );
    match instantiator().instantiate(&target, Parameter::new("level", "Medium")) {
        Err(InstantiateError::ConversionFailed {
            type_name, value, ..
        }) => {
            assert_eq!(type_name, "Level");
            assert_eq!(value, "Medium");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn conversion_failures_name_the_target() {
    let target: Target<OneInteger> = Target::create("root");
    match instantiator().instantiate(&target, Parameter::new("root.an_integer", "forty")) {
        Err(InstantiateError::ConversionFailed {
            type_name,
            target,
            value,
            ..
        }) => {
            assert_eq!(type_name, "i32");
            assert_eq!(target, "an_integer");
            assert_eq!(value, "forty");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn constructor_errors_keep_their_cause() {
    let target: Target<Positive> = Target::create("p");
    assert_eq!(
        instantiator()
            .instantiate(&target, Parameter::new("p.value", "7"))
            .expect("instantiate")
            .0,
        7
    );

    let err = instantiator()
        .instantiate(&target, Parameter::new("p.value", "-3"))
        .unwrap_err();
    match &err {
        InstantiateError::ConstructorThrew {
            type_name,
            signature,
            ..
        } => {
            assert_eq!(type_name, "Positive");
            assert_eq!(signature, "(value: i64)");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let cause = err.source().expect("cause");
    assert_eq!(cause.to_string(), "-3 is negative");
}

#[test]
fn repeated_bare_names_with_distinct_values_are_ambiguous() {
    let parameters = Parameters::from([
        Parameter::new("name", "one"),
        Parameter::new("name", "two"),
    ]);

    let target: Target = Target::with_type(TypeDesc::interface("Object"), "name");
    match parameters.named_after(&target) {
        Err(InstantiateError::AmbiguousParameter { name, candidates }) => {
            assert_eq!(name, "name");
            assert_eq!(candidates, vec!["name=one", "name=two"]);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let string_target: Target<String> = Target::create("name");
    assert!(matches!(
        instantiator().instantiate(&string_target, &parameters),
        Err(InstantiateError::AmbiguousParameter { .. })
    ));
}

#[test]
fn unrelated_parameters_never_change_the_result() {
    let target: Target<TwoConstructible> = Target::create("root");
    let base = [
        Parameter::new("root.one.some_string", "a"),
        Parameter::new("root.two.an_integer", "2"),
    ];
    let expected = instantiator()
        .instantiate(&target, base.clone())
        .expect("instantiate");

    let mut noisy: Vec<Parameter> = base.to_vec();
    noisy.insert(0, Parameter::new("rooted.one.some_string", "b"));
    noisy.push(Parameter::new("other", "x"));
    let with_noise = instantiator()
        .instantiate(&target, noisy)
        .expect("instantiate");
    assert_eq!(expected, with_noise);
}

#[test]
fn aggregate_results_do_not_depend_on_parameter_order() {
    let target: Target<TwoLevels> = Target::create("root");
    let parameters = vec![
        Parameter::new("root.level2.arg.an_integer", "42"),
        Parameter::new("root.level2.arg.unused", "x"),
        Parameter::new("root.extra", "y"),
    ];
    let expected = instantiator()
        .instantiate(&target, parameters.clone())
        .expect("instantiate");

    let mut reversed = parameters;
    reversed.reverse();
    assert_eq!(
        instantiator()
            .instantiate(&target, reversed)
            .expect("instantiate"),
        expected
    );
}

#[test]
fn erased_targets_hand_back_instances() {
    let target: Target<TwoArguments> = Target::create("t");
    let erased = target.erase();
    let instance: Instance = instantiator()
        .instantiate_erased(
            &erased,
            &Parameters::from([Parameter::new("t.one", "1"), Parameter::new("t.two", "2")]),
        )
        .expect("instantiate");
    assert!(instance.is::<TwoArguments>());
    assert_eq!(
        instance.downcast::<TwoArguments>().expect("downcast"),
        TwoArguments { one: 1, two: 2 }
    );
}

#[test]
fn one_instantiator_serves_many_threads() {
    let instantiator = instantiator();
    let target: Target<TwoArguments> = Target::create("t");
    std::thread::scope(|scope| {
        for i in 0..4 {
            let instantiator = &instantiator;
            let target = &target;
            scope.spawn(move || {
                let object = instantiator
                    .instantiate(
                        target,
                        [
                            Parameter::new("t.one", i.to_string()),
                            Parameter::new("t.two", (i * 10).to_string()),
                        ],
                    )
                    .expect("instantiate");
                assert_eq!(object, TwoArguments { one: i, two: i * 10 });
            });
        }
    });
}

#[test]
fn every_primitive_kind_round_trips_its_extremes() {
    let mut covered = Vec::new();

    macro_rules! round_trip {
        ($ty:ty: $($value:expr),+) => {{
            let target: Target<$ty> = Target::create("x");
            for value in [$($value),+] {
                let parsed = instantiator()
                    .instantiate(&target, Parameter::new("x", value.to_string()))
                    .expect("instantiate");
                assert_eq!(parsed, value, "{} did not round trip", stringify!($ty));
            }
            covered.push(<$ty as Scalar>::KIND);
        }};
    }

    round_trip!(i8: i8::MIN, i8::MAX);
    round_trip!(i16: i16::MIN, i16::MAX);
    round_trip!(i32: i32::MIN, i32::MAX);
    round_trip!(i64: i64::MIN, i64::MAX);
    round_trip!(i128: i128::MIN, i128::MAX);
    round_trip!(isize: isize::MIN, isize::MAX);
    round_trip!(u8: u8::MIN, u8::MAX);
    round_trip!(u16: u16::MIN, u16::MAX);
    round_trip!(u32: u32::MIN, u32::MAX);
    round_trip!(u64: u64::MIN, u64::MAX);
    round_trip!(u128: u128::MIN, u128::MAX);
    round_trip!(usize: usize::MIN, usize::MAX);
    round_trip!(f32: f32::MIN, f32::MAX, f32::MIN_POSITIVE, -0.5f32);
    round_trip!(f64: f64::MIN, f64::MAX, f64::MIN_POSITIVE, 1e-300f64);
    round_trip!(bool: true, false);
    round_trip!(char: 'a', char::MAX, '=');
    round_trip!(String: String::new(), "a=b".to_string(), "dotted.value".to_string());

    for kind in PrimitiveKind::ALL {
        assert!(covered.contains(&kind), "{kind} is not covered");
    }
}

#[test]
fn single_field_list_elements_repeat_equal_values() {
    let target: Target<Vec<OneString>> = Target::create("root");
    let objects = instantiator()
        .instantiate(
            &target,
            [
                Parameter::new("root.some_string", "bla"),
                Parameter::new("root.some_string", "bla"),
            ],
        )
        .expect("instantiate");
    assert_eq!(
        objects,
        vec![
            OneString {
                some_string: "bla".into()
            },
            OneString {
                some_string: "bla".into()
            },
        ]
    );

    let strings: Target<Vec<String>> = Target::create("root");
    let values = instantiator()
        .instantiate(
            &strings,
            [Parameter::new("root", "bla"), Parameter::new("root", "bla")],
        )
        .expect("instantiate");
    assert_eq!(values.len(), objects.len());
}

#[test]
fn zero_argument_aggregates_build_from_a_whole_name_value() {
    let target: Target<Holder> = Target::create("h");
    let holder = instantiator()
        .instantiate(&target, Parameter::new("h.e", ""))
        .expect("instantiate");
    assert_eq!(holder, Holder { e: Empty });

    match instantiator().instantiate(&target, Parameter::new("h.e.stray", "x")) {
        Err(InstantiateError::NoConstructorFound {
            type_name,
            available,
            ..
        }) => {
            assert_eq!(type_name, "Empty");
            assert_eq!(available, vec!["stray"]);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
