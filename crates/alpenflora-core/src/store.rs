//! JSON persistence for flower records and harvested plates.
//!
//! Records live in plain JSON arrays. Single lookups are appended to an
//! existing array (4-space indentation, preserving whatever else the file
//! already holds); batch runs and harvests rewrite their output file
//! wholesale (2-space indentation). Non-ASCII text is written as-is.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{FlowerRecord, PlateEntry};

/// Load a JSON array, treating a missing file as empty.
///
/// The parent directory is created when the file does not exist yet so a
/// later write succeeds.
pub fn load_json_array(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        return Ok(Vec::new());
    }
    read_json_array(path)
}

/// Read a JSON array that must exist.
pub fn read_json_array(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Err(Error::NotFound {
            entity: "JSON file",
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    parse_json_array(&text, &path.display().to_string())
}

/// Read a JSON array from any reader (e.g. stdin).
pub fn read_json_array_from(mut reader: impl Read, origin: &str) -> Result<Vec<Value>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_json_array(&text, origin)
}

fn parse_json_array(text: &str, origin: &str) -> Result<Vec<Value>> {
    match serde_json::from_str(text)? {
        Value::Array(items) => Ok(items),
        _ => Err(Error::InvalidData(format!(
            "expected a JSON array in '{origin}'"
        ))),
    }
}

/// Append one record to the array stored at `path`.
///
/// Returns the number of entries in the file after the append.
pub fn append_record(path: &Path, record: &FlowerRecord) -> Result<usize> {
    let mut entries = load_json_array(path)?;
    entries.push(serde_json::to_value(record)?);
    write_pretty(path, &entries, b"    ")?;
    Ok(entries.len())
}

/// Replace the file at `path` with the given records.
pub fn write_records(path: &Path, records: &[FlowerRecord]) -> Result<()> {
    write_pretty(path, records, b"  ")
}

/// Replace the file at `path` with the given harvested plates.
pub fn write_plates(path: &Path, plates: &[PlateEntry]) -> Result<()> {
    write_pretty(path, plates, b"  ")
}

/// Latin names to seed a batch run with.
///
/// Keeps object entries with a non-empty `latin_name`, trimmed and
/// deduplicated in first-seen order. A seed without any usable name is
/// rejected.
pub fn seed_names(entries: &[Value], origin: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let names: Vec<String> = entries
        .iter()
        .filter_map(|entry| entry.as_object()?.get("latin_name")?.as_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(String::from)
        .collect();

    if names.is_empty() {
        return Err(Error::InvalidData(format!(
            "no latin_name values found in '{origin}'"
        )));
    }
    Ok(names)
}

/// Harvested plates from a previously written harvest file.
///
/// Entries without a string `title` are skipped; a missing category is
/// read as empty.
pub fn plate_entries(entries: &[Value]) -> Vec<PlateEntry> {
    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let title = obj.get("title")?.as_str()?;
            let latin_name = obj
                .get("latin_name")
                .and_then(Value::as_str)
                .map(String::from);
            let category = obj
                .get("source_category")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Some(PlateEntry::new(title, latin_name, category))
        })
        .collect()
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T, indent: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent));
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    fs::write(path, buf)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}
