// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splitting fully qualified test names.
//!
//! Hosts don't always report the type and method a test belongs to, but the fully qualified
//! name usually has the form `Namespace.Type.Method(arguments)`. This shape is produced by
//! the test adapter and nothing guarantees it actually starts with the type name, so the
//! split is a best-effort heuristic.

use crate::errors::{QualifiedNameParseError, QualifiedNameParseErrorKind};

/// A fully qualified test name split into its parts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct QualifiedName<'a> {
    /// Everything before the last `.` of the path.
    pub type_name: &'a str,

    /// Everything after the last `.` of the path.
    pub method_name: &'a str,

    /// The argument list including its parentheses, or empty if there is none.
    pub arguments: &'a str,
}

/// Splits a fully qualified test name into type name, method name and argument list.
pub fn parse_qualified_name(name: &str) -> Result<QualifiedName<'_>, QualifiedNameParseError> {
    let (path, arguments) = match name.find('(') {
        Some(start) => {
            let arguments = name[start..].trim();
            if !arguments.ends_with(')') {
                return Err(QualifiedNameParseError::new(
                    name,
                    QualifiedNameParseErrorKind::UnterminatedArguments,
                ));
            }
            (name[..start].trim(), arguments)
        }
        None => (name.trim(), ""),
    };

    // A dot at the very start leaves no type name either.
    let dot = match path.rfind('.') {
        Some(dot) if dot > 0 => dot,
        _ => {
            return Err(QualifiedNameParseError::new(
                name,
                QualifiedNameParseErrorKind::MissingTypeName,
            ));
        }
    };
    if dot + 1 == path.len() {
        return Err(QualifiedNameParseError::new(
            name,
            QualifiedNameParseErrorKind::EmptyMethodName,
        ));
    }

    Ok(QualifiedName {
        type_name: path[..dot].trim(),
        method_name: path[dot + 1..].trim(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("A.B.C.MethodName(arg: 1)", "A.B.C", "MethodName", "(arg: 1)" ; "with arguments")]
    #[test_case("A.B.C.MethodName", "A.B.C", "MethodName", "" ; "without arguments")]
    #[test_case("  Ns.Type.Method  ", "Ns.Type", "Method", "" ; "surrounding whitespace")]
    #[test_case("Ns.Type.Method (x: \"a.b\") ", "Ns.Type", "Method", "(x: \"a.b\")" ; "dots in arguments")]
    #[test_case("Ns.Type.Method(x: (1, 2))", "Ns.Type", "Method", "(x: (1, 2))" ; "nested parentheses")]
    #[test_case("Type.Method()", "Type", "Method", "()" ; "empty arguments")]
    fn parse_valid(input: &str, type_name: &str, method_name: &str, arguments: &str) {
        assert_eq!(
            parse_qualified_name(input),
            Ok(QualifiedName {
                type_name,
                method_name,
                arguments,
            })
        );
    }

    #[test_case("MethodName(a.b: 1)", QualifiedNameParseErrorKind::MissingTypeName ; "no dot before arguments")]
    #[test_case("MethodName", QualifiedNameParseErrorKind::MissingTypeName ; "no dot")]
    #[test_case(".Method", QualifiedNameParseErrorKind::MissingTypeName ; "leading dot")]
    #[test_case("", QualifiedNameParseErrorKind::MissingTypeName ; "empty")]
    #[test_case("Ns.Type.", QualifiedNameParseErrorKind::EmptyMethodName ; "trailing dot")]
    #[test_case("Ns.Type.Method(x: 1", QualifiedNameParseErrorKind::UnterminatedArguments ; "unterminated")]
    #[test_case("Ns.Type.Method(x) extra", QualifiedNameParseErrorKind::UnterminatedArguments ; "trailing text")]
    fn parse_invalid(input: &str, kind: QualifiedNameParseErrorKind) {
        let error = parse_qualified_name(input).expect_err("name is invalid");
        assert_eq!(error.kind(), kind);
        assert_eq!(error.name(), input);
    }
}
