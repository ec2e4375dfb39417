//! Constant-pool rewriting for `.class` entries.
//!
//! Every class, descriptor and string literal of a class file lives in a
//! `CONSTANT_Utf8` entry of its constant pool. All other structures refer to
//! the pool by index, so `Utf8` entries can change length without touching
//! the rest of the file.

use crate::error::{Error, Result};
use crate::relocator::Relocator;

const MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

const CONSTANT_UTF8: u8 = 1;
const CONSTANT_INTEGER: u8 = 3;
const CONSTANT_FLOAT: u8 = 4;
const CONSTANT_LONG: u8 = 5;
const CONSTANT_DOUBLE: u8 = 6;
const CONSTANT_CLASS: u8 = 7;
const CONSTANT_STRING: u8 = 8;
const CONSTANT_FIELDREF: u8 = 9;
const CONSTANT_METHODREF: u8 = 10;
const CONSTANT_INTERFACE_METHODREF: u8 = 11;
const CONSTANT_NAME_AND_TYPE: u8 = 12;
const CONSTANT_METHOD_HANDLE: u8 = 15;
const CONSTANT_METHOD_TYPE: u8 = 16;
const CONSTANT_DYNAMIC: u8 = 17;
const CONSTANT_INVOKE_DYNAMIC: u8 = 18;
const CONSTANT_MODULE: u8 = 19;
const CONSTANT_PACKAGE: u8 = 20;

/// Rewrite the constant pool of a class file through `relocators`.
///
/// Returns `None` when no constant changed, so the caller can copy the
/// original bytes.
pub fn relocate_class(
    path: &str,
    bytes: &[u8],
    relocators: &[Box<dyn Relocator>],
) -> Result<Option<Vec<u8>>> {
    if relocators.is_empty() {
        return Ok(None);
    }

    let mut reader = ClassReader::new(path, bytes);
    let header = reader.take(8)?;
    if header[..4] != MAGIC {
        return Err(reader.malformed("missing 0xCAFEBABE magic"));
    }
    let count = reader.u16()?;

    let mut out = Vec::with_capacity(bytes.len() + 64);
    out.extend_from_slice(header);
    out.extend_from_slice(&count.to_be_bytes());

    let slots = u32::from(count);
    let mut changed = false;
    let mut index: u32 = 1;
    while index < slots {
        let tag = reader.u8()?;
        out.push(tag);

        match tag {
            CONSTANT_UTF8 => {
                let len = reader.u16()?;
                let value = reader.take(len as usize)?;
                match relocate_constant(relocators, value) {
                    Some(relocated) => {
                        let len = u16::try_from(relocated.len()).map_err(|_| {
                            reader.malformed(&format!(
                                "relocated constant #{index} exceeds 65535 bytes"
                            ))
                        })?;
                        out.extend_from_slice(&len.to_be_bytes());
                        out.extend_from_slice(&relocated);
                        changed = true;
                    }
                    None => {
                        out.extend_from_slice(&len.to_be_bytes());
                        out.extend_from_slice(value);
                    }
                }
            }
            CONSTANT_INTEGER | CONSTANT_FLOAT => out.extend_from_slice(reader.take(4)?),
            // Eight-byte constants occupy two pool slots.
            CONSTANT_LONG | CONSTANT_DOUBLE => {
                if index + 1 >= slots {
                    return Err(reader.malformed(&format!(
                        "eight-byte constant #{index} overruns a pool of {count} slots"
                    )));
                }
                out.extend_from_slice(reader.take(8)?);
                index += 1;
            }
            CONSTANT_CLASS | CONSTANT_STRING | CONSTANT_METHOD_TYPE | CONSTANT_MODULE
            | CONSTANT_PACKAGE => out.extend_from_slice(reader.take(2)?),
            CONSTANT_FIELDREF
            | CONSTANT_METHODREF
            | CONSTANT_INTERFACE_METHODREF
            | CONSTANT_NAME_AND_TYPE
            | CONSTANT_DYNAMIC
            | CONSTANT_INVOKE_DYNAMIC => out.extend_from_slice(reader.take(4)?),
            CONSTANT_METHOD_HANDLE => out.extend_from_slice(reader.take(3)?),
            other => {
                return Err(reader.malformed(&format!(
                    "unknown constant pool tag {other} at #{index}"
                )));
            }
        }
        index += 1;
    }

    if !changed {
        return Ok(None);
    }

    out.extend_from_slice(reader.rest());
    Ok(Some(out))
}

fn relocate_constant(relocators: &[Box<dyn Relocator>], value: &[u8]) -> Option<Vec<u8>> {
    let mut relocated: Option<Vec<u8>> = None;
    for relocator in relocators {
        let current = relocated.as_deref().unwrap_or(value);
        if let Some(next) = relocator.relocate_class_constant(current) {
            relocated = Some(next);
        }
    }
    relocated
}

struct ClassReader<'a> {
    path:  &'a str,
    bytes: &'a [u8],
    pos:   usize,
}

impl<'a> ClassReader<'a> {
    fn new(path: &'a str, bytes: &'a [u8]) -> Self {
        Self { path, bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| self.malformed("truncated constant pool"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn malformed(&self, reason: &str) -> Error {
        Error::MalformedClassFile {
            path:   self.path.to_string(),
            reason: reason.to_string(),
        }
    }
}
