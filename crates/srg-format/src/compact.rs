use std::fmt;

use indexmap::IndexMap;
use srg_mappings::{ImmutableMappings, Mappings, MappingsError};
use srg_types::{ClassName, Descriptor, FieldId, MethodId, TypeRef};

use crate::error::{FormatError, Result};
use crate::write_entries;

/// Two-phase reader for compact SRG.
///
/// Lines carry no tag; the column count decides the record kind. Member
/// records only name the original member, so they are buffered until the
/// whole class table is known and resolved in [`CompactReader::finish`].
#[derive(Debug, Default)]
pub(crate) struct CompactReader {
    classes: IndexMap<ClassName, ClassName>,
    method_names: IndexMap<MethodId, String>,
    field_names: IndexMap<FieldId, String>,
}

impl CompactReader {
    pub(crate) fn process_line(&mut self, line_number: usize, raw: &str) -> Result<()> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let columns: Vec<&str> = line.split_whitespace().collect();
        let entry = match columns.as_slice() {
            [original, renamed] => self.put_class(line_number, original, renamed),
            [owner, name, new_name] => class(owner).map(|owner| {
                self.field_names
                    .insert(FieldId::new(owner, *name), new_name.to_string());
            }),
            [owner, name, desc, new_name] => class(owner).and_then(|owner| {
                let descriptor = Descriptor::parse(desc)?;
                self.method_names.insert(
                    MethodId::new(owner, *name, descriptor),
                    new_name.to_string(),
                );
                Ok(())
            }),
            _ => {
                return Err(FormatError::MalformedLine {
                    line_number,
                    line: raw.to_string(),
                })
            }
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
        let original = class(original)?;
        let renamed = class(renamed)?;
        if let Some(previous) = self.classes.get(&original) {
            if *previous != renamed {
                tracing::warn!(
                    target: "srg.format",
                    line_number,
                    class = %original,
                    previous = %previous,
                    renamed = %renamed,
                    "class record overrides an earlier record"
                );
            }
        }
        self.classes.insert(original, renamed);
        Ok(())
    }

    /// Resolve the buffered members against the complete class table.
    pub(crate) fn finish(self) -> ImmutableMappings {
        tracing::debug!(
            target: "srg.format",
            classes = self.classes.len(),
            methods = self.method_names.len(),
            fields = self.field_names.len(),
            "resolving compact records"
        );
        ImmutableMappings::from_names(self.classes, self.method_names, self.field_names)
    }
}

fn class(name: &str) -> std::result::Result<ClassName, MappingsError> {
    Ok(TypeRef::from_internal_name(name)?.into_class()?)
}

pub(crate) fn write(mappings: &dyn Mappings, out: &mut dyn fmt::Write) -> fmt::Result {
    write_entries(
        |f| mappings.for_each_class(f),
        |original: &ClassName, renamed: &ClassName| writeln!(out, "{original} {renamed}"),
    )?;
    write_entries(
        |f| mappings.for_each_field(f),
        |original: &FieldId, renamed: &FieldId| {
            writeln!(out, "{} {} {}", original.owner, original.name, renamed.name)
        },
    )?;
    write_entries(
        |f| mappings.for_each_method(f),
        |original: &MethodId, renamed: &MethodId| {
            writeln!(
                out,
                "{} {} {} {}",
                original.owner, original.name, original.descriptor, renamed.name
            )
        },
    )
}
