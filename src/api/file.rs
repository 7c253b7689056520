//! Purpose: Read and write JSON documents through files and writers.
//! Exports: `parse_file`, `read_file_into`, `write_file`, `write_file_indent`, `write_to`.
//! Role: Thin I/O glue around the json codec; errors carry the file path.
//! Invariants: Written documents end with a single newline.
//! Invariants: An empty file is a decode error, unlike empty in-memory input.
#![allow(clippy::result_large_err)]

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::Value;
use crate::core::error::{Error, ErrorKind};

pub fn parse_file(path: impl AsRef<Path>) -> Result<Value, Error> {
    read_file_into(path)
}

pub fn read_file_into<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, Error> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading json file");
    let file = File::open(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to open json file")
            .with_path(path)
            .with_source(err)
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| Error::decode(err).with_path(path))
}

pub fn write_file<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<(), Error> {
    write_path(path.as_ref(), value, false)
}

pub fn write_file_indent<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
) -> Result<(), Error> {
    write_path(path.as_ref(), value, true)
}

pub fn write_to<T: Serialize + ?Sized>(writer: impl Write, value: &T) -> Result<(), Error> {
    encode_line(writer, value, false)
}

fn write_path<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<(), Error> {
    debug!(path = %path.display(), pretty, "writing json file");
    let file = File::create(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to create json file")
            .with_path(path)
            .with_source(err)
    })?;
    encode_line(BufWriter::new(file), value, pretty).map_err(|err| err.with_path(path))
}

fn encode_line<T: Serialize + ?Sized>(
    mut writer: impl Write,
    value: &T,
    pretty: bool,
) -> Result<(), Error> {
    let encoded = if pretty {
        serde_json::to_writer_pretty(&mut writer, value)
    } else {
        serde_json::to_writer(&mut writer, value)
    };
    encoded.map_err(|err| {
        if err.is_io() {
            Error::new(ErrorKind::Io)
                .with_message("failed to write json")
                .with_source(err)
        } else {
            Error::encode(err)
        }
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write json")
                .with_source(err)
        })
}

#[cfg(test)]
mod tests {
    use super::{parse_file, read_file_into, write_file, write_file_indent, write_to};
    use crate::api::Object;
    use crate::core::error::ErrorKind;
    use std::collections::BTreeMap;

    #[test]
    fn write_then_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doc.json");
        let obj = Object::new().set("b", 2).set("a", [1, 2].to_vec());
        write_file(&path, &obj).expect("write");
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, "{\"a\":[1,2],\"b\":2}\n");
        let value = parse_file(&path).expect("parse");
        assert_eq!(value.object(), obj);
    }

    #[test]
    fn indent_variant_uses_two_spaces() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pretty.json");
        write_file_indent(&path, &Object::new().set("a", 1)).expect("write");
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn read_into_concrete_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("map.json");
        std::fs::write(&path, r#"{"x": 1, "y": 2}"#).expect("seed");
        let map: BTreeMap<String, i32> = read_file_into(&path).expect("map");
        assert_eq!(map.get("y"), Some(&2));
    }

    #[test]
    fn failures_carry_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        let err = parse_file(&missing).expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.path(), Some(missing.as_path()));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").expect("seed");
        let err = parse_file(&broken).expect_err("broken");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.path(), Some(broken.as_path()));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "").expect("seed");
        assert_eq!(parse_file(&empty).expect_err("empty").kind(), ErrorKind::Decode);
    }

    #[test]
    fn write_to_appends_newline() {
        let mut out = Vec::new();
        write_to(&mut out, &[1, 2, 3]).expect("write");
        assert_eq!(out, b"[1,2,3]\n");
    }
}
