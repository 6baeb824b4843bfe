// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian control-file stanzas.

A *stanza* is an ordered list of `Key: value` lines terminated by a blank
line. Stanzas are the unit of `Packages`, `Sources`, and `Release` files.

See <https://www.debian.org/doc/debian-policy/ch-controlfields.html> for the
canonical description of the format.
*/

use std::io::Write;

/// A single field in a stanza.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StanzaField {
    name: String,
    value: String,
}

impl StanzaField {
    /// The name of this field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw value of this field, including any embedded newlines.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Serialize this field to a writer.
    ///
    /// Single-line values render as `Name: value\n`. Values containing a
    /// newline are rendered as `Name:` followed by the raw value: multiline
    /// values carry their own leading newline, per-line leading space, and
    /// trailing newline.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        if self.value.contains('\n') {
            writer.write_all(self.name.as_bytes())?;
            writer.write_all(b":")?;
            writer.write_all(self.value.as_bytes())
        } else {
            writer.write_all(self.name.as_bytes())?;
            writer.write_all(b": ")?;
            writer.write_all(self.value.as_bytes())?;
            writer.write_all(b"\n")
        }
    }
}

/// An ordered key/value block in Debian control-file format.
///
/// Field names are case insensitive on read and case preserving on set.
/// A stanza holds at most one occurrence of a field; setting an existing
/// field replaces its value in place, preserving field order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stanza {
    fields: Vec<StanzaField>,
}

impl Stanza {
    /// Construct an empty stanza.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the stanza has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields in the stanza.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Set the value of a field.
    ///
    /// If the field already exists (case insensitive compare), its value is
    /// replaced and its position retained. Otherwise the field is appended.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        if let Some(field) = self
            .fields
            .iter_mut()
            .find(|f| f.name.eq_ignore_ascii_case(&name))
        {
            field.value = value;
        } else {
            self.fields.push(StanzaField { name, value });
        }
    }

    /// Obtain the value of the named field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    /// Whether the named field is present.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove the named field, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))?;

        Some(self.fields.remove(index).value)
    }

    /// Iterate over fields in insertion order.
    pub fn iter_fields(&self) -> impl Iterator<Item = &StanzaField> {
        self.fields.iter()
    }

    /// Copy all fields from another stanza into this one.
    ///
    /// Fields already present are overwritten in place.
    pub fn extend_from(&mut self, other: &Stanza) {
        for field in other.iter_fields() {
            self.set(field.name.clone(), field.value.clone());
        }
    }

    /// Serialize the stanza to a writer.
    ///
    /// The terminating blank line is not written; when serializing multiple
    /// stanzas the caller must separate them with a single `\n`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for field in &self.fields {
            field.write(writer)?;
        }

        Ok(())
    }
}

impl std::fmt::Display for Stanza {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf).map_err(|_| std::fmt::Error)?;

        f.write_str(&String::from_utf8_lossy(&buf))
    }
}
