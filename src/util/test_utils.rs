use crate::{desugar, diagnostic::Diagnostic, parser, util::tree};

/// Each variant contains the input.
pub enum Test {
    Parser(&'static str),
    Desugar(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    ExpectedErrors(&'static [&'static str]),
    ExpectedWarnings(&'static [&'static str]),
}

pub struct Outcome {
    pub tree: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[track_caller]
pub fn run_pipeline(test: Test) -> Outcome {
    let (input, lower) = match test {
        Test::Parser(input) => (input, false),
        Test::Desugar(input) => (input, true),
    };
    let document = match parser::parse_document(input) {
        Ok(document) => document,
        Err(error) => {
            return Outcome {
                tree: String::new(),
                errors: vec![error.to_string()],
                warnings: vec![],
            };
        }
    };
    if !lower {
        return Outcome {
            tree: tree::print_document_string(&document),
            errors: vec![],
            warnings: vec![],
        };
    }
    let mut diagnostics = Vec::new();
    let lowered = desugar::lower(document, &mut diagnostics);
    Outcome {
        tree: tree::print_document_string(&lowered),
        errors: vec![],
        warnings: diagnostics.iter().map(Diagnostic::to_string).collect(),
    }
}

#[track_caller]
pub fn run_assertion(assertion: Assertion, outcome: &Outcome) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(outcome.errors, expected_errors);
            ::pretty_assertions::assert_eq!(outcome.tree.trim(), expected_tree.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(outcome.errors, expected_errors);
        }
        Assertion::ExpectedWarnings(expected_warnings) => {
            ::pretty_assertions::assert_eq!(outcome.warnings, expected_warnings);
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let doc = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind), $source);
                let outcome = crate::util::test_utils::run_pipeline(test);
                tree_tests!(@@expand_assertions, &outcome, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $outcome:expr, []) => {};
    (@@expand_assertions, $outcome:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $outcome,
        );
        tree_tests!(@@expand_assertions, $outcome, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };
    (@@assertion, expected_warnings, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedWarnings($expected)
    };

    (@@get_test(parser), $source:expr) => {
        crate::util::test_utils::Test::Parser($source)
    };
    (@@get_test(desugar), $source:expr) => {
        crate::util::test_utils::Test::Desugar($source)
    };
}
pub(crate) use tree_tests;
