use std::fmt;

use srg_mappings::{Mappings, MappingsError, MutableMappings};
use srg_types::{ClassName, FieldId, MethodId, TypeRef};

use crate::error::{FormatError, Result};
use crate::write_entries;

/// Incremental reader for tagged SRG records.
///
/// Member records are checked against the class records read so far, so a
/// member must come after the class record that renames its owner.
#[derive(Debug, Default)]
pub(crate) struct SrgReader {
    mappings: MutableMappings,
}

impl SrgReader {
    pub(crate) fn process_line(&mut self, line_number: usize, raw: &str) -> Result<()> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let malformed = || FormatError::MalformedLine {
            line_number,
            line: raw.to_string(),
        };
        let mut columns = line.split_whitespace();
        let tag = columns.next().ok_or_else(malformed)?;
        let args: Vec<&str> = columns.collect();

        let entry = match (tag, args.as_slice()) {
            ("CL:", [original, renamed]) => self.put_class(line_number, original, renamed),
            ("FD:", [original, renamed]) => self.put_field(original, renamed),
            ("MD:", [original, original_desc, renamed, renamed_desc]) => {
                self.put_method(original, original_desc, renamed, renamed_desc)
            }
            ("PK:", _) => {
                tracing::trace!(target: "srg.format", line_number, "ignoring package record");
                return Ok(());
            }
            _ => return Err(malformed()),
        };
        entry.map_err(|source| FormatError::InvalidEntry {
            line_number,
            line: raw.to_string(),
            source,
        })
    }

    fn put_class(
        &mut self,
        line_number: usize,
        original: &str,
        renamed: &str,
    ) -> std::result::Result<(), MappingsError> {
        let original = TypeRef::from_internal_name(original)?;
        let renamed = TypeRef::from_internal_name(renamed)?;
        if let (Ok(class), Ok(new_name)) = (original.as_class(), renamed.as_class()) {
            let previous = self.mappings.resolve_class(class);
            if previous != *class && previous != *new_name {
                tracing::warn!(
                    target: "srg.format",
                    line_number,
                    class = %class,
                    previous = %previous,
                    renamed = %new_name,
                    "class record overrides an earlier record"
                );
            }
        }
        self.mappings.put_class_type(&original, &renamed)
    }

    fn put_field(&mut self, original: &str, renamed: &str) -> std::result::Result<(), MappingsError> {
        let original = FieldId::from_internal_name(original)?;
        let renamed = FieldId::from_internal_name(renamed)?;
        self.mappings.put_field(original, &renamed)
    }

    fn put_method(
        &mut self,
        original: &str,
        original_desc: &str,
        renamed: &str,
        renamed_desc: &str,
    ) -> std::result::Result<(), MappingsError> {
        let original = MethodId::from_internal_name(original, original_desc)?;
        let renamed = MethodId::from_internal_name(renamed, renamed_desc)?;
        self.mappings.put_method(original, &renamed)
    }

    pub(crate) fn finish(self) -> MutableMappings {
        self.mappings
    }
}

pub(crate) fn write(mappings: &dyn Mappings, out: &mut dyn fmt::Write) -> fmt::Result {
    write_entries(
        |f| mappings.for_each_class(f),
        |original: &ClassName, renamed: &ClassName| writeln!(out, "CL: {original} {renamed}"),
    )?;
    write_entries(
        |f| mappings.for_each_field(f),
        |original: &FieldId, renamed: &FieldId| writeln!(out, "FD: {original} {renamed}"),
    )?;
    write_entries(
        |f| mappings.for_each_method(f),
        |original: &MethodId, renamed: &MethodId| {
            writeln!(
                out,
                "MD: {} {} {} {}",
                original.internal_name(),
                original.descriptor,
                renamed.internal_name(),
                renamed.descriptor
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use srg_types::Descriptor;

    fn read(lines: &[&str]) -> Result<MutableMappings> {
        let mut reader = SrgReader::default();
        for (index, line) in lines.iter().enumerate() {
            reader.process_line(index + 1, line)?;
        }
        Ok(reader.finish())
    }

    #[test]
    fn reads_all_record_kinds() {
        let mappings = read(&[
            "# obf -> named",
            "",
            "PK: ./ net/minecraft/server",
            "CL: ab Cow",
            "  FD: ab/b Cow/age  ",
            "MD: ab/a (Lab;)V Cow/love (LCow;)V",
        ])
        .unwrap();

        assert_eq!(
            mappings.resolve_class(&ClassName::new("ab")),
            ClassName::new("Cow")
        );
        assert_eq!(
            mappings.resolve_field(&FieldId::new("ab", "b")),
            FieldId::new("Cow", "age")
        );
        assert_eq!(
            mappings.resolve_method(&MethodId::new(
                "ab",
                "a",
                Descriptor::parse("(Lab;)V").unwrap()
            )),
            MethodId::new("Cow", "love", Descriptor::parse("(LCow;)V").unwrap())
        );
    }

    #[test]
    fn rejects_unknown_tags_and_wrong_arity() {
        for (line, bad) in [
            ("XX: a b", "XX: a b"),
            ("CL: a", "CL: a"),
            ("FD: a/b c/d e/f", "FD: a/b c/d e/f"),
            ("MD: a/b ()V c/d", "MD: a/b ()V c/d"),
        ] {
            let err = read(&["CL: x y", line]).unwrap_err();
            match err {
                FormatError::MalformedLine { line_number, line } => {
                    assert_eq!(line_number, 2);
                    assert_eq!(line, bad);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn entry_errors_carry_line_and_cause() {
        let err = read(&["CL: ab Cow", "FD: ab/b ab/age"]).unwrap_err();
        match err {
            FormatError::InvalidEntry {
                line_number,
                line,
                source,
            } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "FD: ab/b ab/age");
                assert!(matches!(source, MappingsError::InconsistentMapping { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = read(&["MD: a/b (Q)V a/c (Q)V"]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidEntry {
                source: MappingsError::Type(_),
                ..
            }
        ));
    }

    #[test]
    fn writes_classes_then_fields_then_methods() {
        let mappings = read(&[
            "MD: ab/a (Lab;)V ab/love (Lab;)V",
            "FD: ab/b ab/age",
            "CL: zz Zed",
        ])
        .unwrap();
        let mut out = String::new();
        write(&mappings, &mut out).unwrap();
        assert_eq!(
            out,
            "CL: zz Zed\nFD: ab/b ab/age\nMD: ab/a (Lab;)V ab/love (Lab;)V\n"
        );
    }
}
