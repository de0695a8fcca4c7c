// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize an `Assemblies` document.

use crate::{Assemblies, Assembly, Collection, ErrorEntry, Failure, Test, Trait, XmlText};
use chrono::{DateTime, FixedOffset};
use quick_xml::{
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::{io, time::Duration};

static ASSEMBLIES_TAG: &str = "assemblies";
static ASSEMBLY_TAG: &str = "assembly";
static ERRORS_TAG: &str = "errors";
static ERROR_TAG: &str = "error";
static COLLECTION_TAG: &str = "collection";
static TEST_TAG: &str = "test";
static OUTPUT_TAG: &str = "output";
static REASON_TAG: &str = "reason";
static SOURCE_FILE_TAG: &str = "source-file";
static SOURCE_LINE_TAG: &str = "source-line";
static FAILURE_TAG: &str = "failure";
static MESSAGE_TAG: &str = "message";
static STACK_TRACE_TAG: &str = "stack-trace";
static TRAITS_TAG: &str = "traits";
static TRAIT_TAG: &str = "trait";

pub(crate) fn serialize_assemblies(
    assemblies: &Assemblies,
    writer: impl io::Write,
) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_assemblies_impl(assemblies, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()
}

pub(crate) fn serialize_assemblies_impl(
    assemblies: &Assemblies,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let Assemblies {
        timestamp,
        assemblies,
    } = assemblies;

    let mut assemblies_tag = BytesStart::new(ASSEMBLIES_TAG);
    assemblies_tag.push_attribute(("timestamp", serialize_timestamp(timestamp).as_str()));

    if assemblies.is_empty() {
        writer.write_event(Event::Empty(assemblies_tag))?;
    } else {
        writer.write_event(Event::Start(assemblies_tag))?;
        for assembly in assemblies {
            serialize_assembly(assembly, writer)?;
        }
        serialize_end_tag(ASSEMBLIES_TAG, writer)?;
    }
    writer.write_event(Event::Eof)?;

    Ok(())
}

fn serialize_assembly(
    assembly: &Assembly,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let Assembly {
        name,
        environment,
        test_framework,
        run_timestamp,
        config_file,
        total,
        passed,
        failed,
        skipped,
        time,
        errors,
        collections,
    } = assembly;

    let mut assembly_tag = BytesStart::new(ASSEMBLY_TAG);
    assembly_tag.push_attribute(("name", name.as_str()));
    if let Some(environment) = environment {
        assembly_tag.push_attribute(("environment", environment.as_str()));
    }
    if let Some(test_framework) = test_framework {
        assembly_tag.push_attribute(("test-framework", test_framework.as_str()));
    }
    assembly_tag.extend_attributes([
        (
            "run-date",
            run_timestamp.format("%Y-%m-%d").to_string().as_str(),
        ),
        (
            "run-time",
            run_timestamp.format("%H:%M:%S").to_string().as_str(),
        ),
    ]);
    if let Some(config_file) = config_file {
        assembly_tag.push_attribute(("config-file", config_file.as_str()));
    }
    assembly_tag.extend_attributes([
        ("total", total.to_string().as_str()),
        ("passed", passed.to_string().as_str()),
        ("failed", failed.to_string().as_str()),
        ("skipped", skipped.to_string().as_str()),
        ("errors", errors.len().to_string().as_str()),
        ("time", serialize_time(time).as_str()),
    ]);
    writer.write_event(Event::Start(assembly_tag))?;

    if errors.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(ERRORS_TAG)))?;
    } else {
        serialize_empty_start_tag(ERRORS_TAG, writer)?;
        for error in errors {
            serialize_error(error, writer)?;
        }
        serialize_end_tag(ERRORS_TAG, writer)?;
    }

    for collection in collections {
        serialize_collection(collection, writer)?;
    }

    serialize_end_tag(ASSEMBLY_TAG, writer)
}

fn serialize_error(
    error: &ErrorEntry,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let ErrorEntry { ty, name, failure } = error;

    let mut error_tag = BytesStart::new(ERROR_TAG);
    error_tag.extend_attributes([("type", ty.as_str()), ("name", name.as_str())]);
    writer.write_event(Event::Start(error_tag))?;

    serialize_failure(failure, writer)?;

    serialize_end_tag(ERROR_TAG, writer)
}

fn serialize_collection(
    collection: &Collection,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let Collection {
        name,
        total,
        passed,
        failed,
        skipped,
        time,
        tests,
    } = collection;

    let mut collection_tag = BytesStart::new(COLLECTION_TAG);
    collection_tag.extend_attributes([
        ("name", name.as_str()),
        ("total", total.to_string().as_str()),
        ("passed", passed.to_string().as_str()),
        ("failed", failed.to_string().as_str()),
        ("skipped", skipped.to_string().as_str()),
        ("time", serialize_time(time).as_str()),
    ]);
    writer.write_event(Event::Start(collection_tag))?;

    for test in tests {
        serialize_test(test, writer)?;
    }

    serialize_end_tag(COLLECTION_TAG, writer)
}

fn serialize_test(test: &Test, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    let Test {
        name,
        ty,
        method,
        time,
        result,
        output,
        reason,
        source,
        failure,
        traits,
    } = test;

    let mut test_tag = BytesStart::new(TEST_TAG);
    test_tag.extend_attributes([
        ("name", name.as_str()),
        ("type", ty.as_str()),
        ("method", method.as_str()),
        ("time", serialize_test_time(time).as_str()),
        ("result", result.as_str()),
    ]);

    let has_children = output.is_some()
        || reason.is_some()
        || source.is_some()
        || failure.is_some()
        || traits.is_some();
    if !has_children {
        return writer.write_event(Event::Empty(test_tag));
    }
    writer.write_event(Event::Start(test_tag))?;

    if let Some(output) = output {
        serialize_text(OUTPUT_TAG, output, writer)?;
    }
    if let Some(reason) = reason {
        serialize_empty_start_tag(REASON_TAG, writer)?;
        serialize_cdata(reason, writer)?;
        serialize_end_tag(REASON_TAG, writer)?;
    }
    if let Some(source) = source {
        serialize_plain_text(SOURCE_FILE_TAG, &source.file, writer)?;
        serialize_plain_text(SOURCE_LINE_TAG, &source.line.to_string(), writer)?;
    }
    if let Some(failure) = failure {
        serialize_failure(failure, writer)?;
    }
    if let Some(traits) = traits {
        serialize_traits(traits, writer)?;
    }

    serialize_end_tag(TEST_TAG, writer)
}

/// Writes `text` as one or more CDATA sections.
///
/// A `]]>` in the text would end the section early, so it is split between two adjacent
/// sections: the first ends with `]]` and the next starts with `>`.
fn serialize_cdata(text: &str, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    for section in cdata_sections(text) {
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    Ok(())
}

fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find("]]>") {
        // Cut after the `]]`, leaving the `>` for the next section.
        sections.push(&rest[..idx + 2]);
        rest = &rest[idx + 2..];
    }
    sections.push(rest);
    sections
}

fn serialize_failure(
    failure: &Failure,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let Failure {
        exception_type,
        message,
        stack_trace,
    } = failure;

    let mut failure_tag = BytesStart::new(FAILURE_TAG);
    if let Some(exception_type) = exception_type {
        failure_tag.push_attribute(("exception-type", exception_type.as_str()));
    }
    writer.write_event(Event::Start(failure_tag))?;

    serialize_text(MESSAGE_TAG, message, writer)?;
    serialize_text(STACK_TRACE_TAG, stack_trace, writer)?;

    serialize_end_tag(FAILURE_TAG, writer)
}

fn serialize_traits(
    traits: &[Trait],
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    if traits.is_empty() {
        return writer.write_event(Event::Empty(BytesStart::new(TRAITS_TAG)));
    }

    serialize_empty_start_tag(TRAITS_TAG, writer)?;
    for t in traits {
        let mut trait_tag = BytesStart::new(TRAIT_TAG);
        trait_tag.extend_attributes([("name", t.name.as_str()), ("value", t.value.as_str())]);
        writer.write_event(Event::Empty(trait_tag))?;
    }
    serialize_end_tag(TRAITS_TAG, writer)
}

fn serialize_text(
    tag_name: &'static str,
    text: &XmlText,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    serialize_plain_text(tag_name, text.as_str(), writer)
}

// Callers are responsible for sanitizing free text: anything that reaches this point is
// structurally constrained (paths, numbers) or already an `XmlText`.
fn serialize_plain_text(
    tag_name: &'static str,
    text: &str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    if text.is_empty() {
        return writer.write_event(Event::Empty(BytesStart::new(tag_name)));
    }

    serialize_empty_start_tag(tag_name, writer)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    serialize_end_tag(tag_name, writer)
}

fn serialize_empty_start_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let tag = BytesStart::new(tag_name);
    writer.write_event(Event::Start(tag))
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let end_tag = BytesEnd::new(tag_name);
    writer.write_event(Event::End(end_tag))
}

// Culture-independent general date/time pattern.
fn serialize_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%m/%d/%Y %H:%M:%S").to_string()
}

// Serialize time as seconds with 3 decimal points.
fn serialize_time(time: &Duration) -> String {
    format!("{:.3}", time.as_secs_f64())
}

// Individual tests get 7 decimal points, matching the resolution of .NET's TimeSpan ticks.
fn serialize_test_time(time: &Duration) -> String {
    format!("{:.7}", time.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Duration::ZERO, "0.000", "0.0000000" ; "zero")]
    #[test_case(Duration::from_millis(1500), "1.500", "1.5000000" ; "millis")]
    #[test_case(Duration::from_nanos(421_580), "0.000", "0.0004216" ; "rounds")]
    #[test_case(Duration::from_secs(4321), "4321.000", "4321.0000000" ; "no grouping separators")]
    fn test_serialize_time(time: Duration, expected: &str, expected_test: &str) {
        assert_eq!(serialize_time(&time), expected);
        assert_eq!(serialize_test_time(&time), expected_test);
    }

    #[test_case("", &[""] ; "empty")]
    #[test_case("not <today>", &["not <today>"] ; "no terminator")]
    #[test_case("see x[i]]>0", &["see x[i]]", ">0"] ; "terminator in the middle")]
    #[test_case("]]>]]>", &["]]", ">]]", ">"] ; "repeated terminators")]
    #[test_case("a]]]>b", &["a]]]", ">b"] ; "extra bracket")]
    fn test_cdata_sections(text: &str, expected: &[&str]) {
        assert_eq!(cdata_sections(text), expected);
        assert_eq!(cdata_sections(text).concat(), text);
    }

    #[test]
    fn test_serialize_timestamp() {
        let timestamp = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 1)
            .unwrap();
        assert_eq!(serialize_timestamp(&timestamp), "03/07/2024 09:05:01");
    }
}
