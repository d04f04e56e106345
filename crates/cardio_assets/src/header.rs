//! # Text Headers
//!
//! Both formats open with newline-terminated `KEY value` lines. Lines are
//! read into a fixed stack buffer; nothing here allocates on success.

use std::io::{BufRead, ErrorKind, Read, Write};

use crate::error::{AssetError, AssetResult};

/// Longest header line accepted, excluding the newline.
pub(crate) const MAX_HEADER_LINE: usize = 64;

/// Reads one header line, without its terminator or surrounding whitespace.
fn read_line<'b, R: BufRead>(
    reader: &mut R,
    buffer: &'b mut [u8; MAX_HEADER_LINE],
) -> AssetResult<&'b str> {
    let mut length = 0;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => return Err(error.into()),
        };
        if available.is_empty() {
            return Err(AssetError::MalformedHeader("unexpected end of header".into()));
        }

        let newline = available.iter().position(|&byte| byte == b'\n');
        let take = newline.unwrap_or(available.len());
        if length + take > MAX_HEADER_LINE {
            return Err(AssetError::MalformedHeader("header line too long".into()));
        }
        buffer[length..length + take].copy_from_slice(&available[..take]);
        length += take;

        match newline {
            Some(_) => {
                reader.consume(take + 1);
                break;
            }
            None => reader.consume(take),
        }
    }

    std::str::from_utf8(&buffer[..length])
        .map(str::trim)
        .map_err(|_| AssetError::MalformedHeader("header line is not ASCII".into()))
}

/// Reads a line that must equal `expected` exactly, e.g. a magic literal.
pub(crate) fn expect_line<R: BufRead>(
    reader: &mut R,
    field: &'static str,
    expected: &'static str,
) -> AssetResult<()> {
    let mut buffer = [0u8; MAX_HEADER_LINE];
    let line = read_line(reader, &mut buffer)?;
    if line == expected {
        Ok(())
    } else {
        Err(AssetError::FieldMismatch {
            field,
            expected,
            found: line.to_owned(),
        })
    }
}

/// Reads a `KEY value` line and returns the value.
fn read_field<'b, R: BufRead>(
    reader: &mut R,
    key: &'static str,
    buffer: &'b mut [u8; MAX_HEADER_LINE],
) -> AssetResult<&'b str> {
    let line = read_line(reader, buffer)?;
    let mut words = line.split_ascii_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(found), Some(value), None) if found == key => Ok(value),
        (Some(found), _, _) if found != key => Err(AssetError::FieldMismatch {
            field: key,
            expected: key,
            found: found.to_owned(),
        }),
        _ => Err(AssetError::MalformedHeader(format!("bad {key} line: {line:?}"))),
    }
}

/// Reads a `KEY value` line whose value must equal `expected`.
pub(crate) fn expect_field<R: BufRead>(
    reader: &mut R,
    key: &'static str,
    expected: &'static str,
) -> AssetResult<()> {
    let mut buffer = [0u8; MAX_HEADER_LINE];
    let value = read_field(reader, key, &mut buffer)?;
    if value == expected {
        Ok(())
    } else {
        Err(AssetError::FieldMismatch {
            field: key,
            expected,
            found: value.to_owned(),
        })
    }
}

/// Reads a `KEY value` line whose value must be a positive decimal integer.
pub(crate) fn read_positive_field<R: BufRead>(reader: &mut R, key: &'static str) -> AssetResult<usize> {
    let mut buffer = [0u8; MAX_HEADER_LINE];
    let value = read_field(reader, key, &mut buffer)?;
    match value.parse::<usize>() {
        Ok(0) => Err(AssetError::MalformedHeader(format!("{key} must be positive"))),
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(AssetError::MalformedHeader(format!("{key} is not a number: {value:?}"))),
    }
}

/// Fills `buffer` completely, reporting how far a short body got.
pub(crate) fn read_body<R: Read>(reader: &mut R, buffer: &mut [u8]) -> AssetResult<()> {
    let expected = buffer.len();
    let mut read = 0;
    while read < expected {
        match reader.read(&mut buffer[read..]) {
            Ok(0) => return Err(AssetError::ShortBody { expected, read }),
            Ok(count) => read += count,
            Err(error) if error.kind() == ErrorKind::Interrupted => {}
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}

/// Writes every part in order and flushes, reporting how far a short write got.
pub(crate) fn write_parts<W: Write>(writer: &mut W, parts: &[&[u8]]) -> AssetResult<()> {
    let expected = parts.iter().map(|part| part.len()).sum();
    let mut written = 0;
    for part in parts {
        let mut rest = *part;
        while !rest.is_empty() {
            match writer.write(rest) {
                Ok(0) => return Err(AssetError::ShortWrite { expected, written }),
                Ok(count) => {
                    written += count;
                    rest = &rest[count..];
                }
                Err(error) if error.kind() == ErrorKind::Interrupted => {}
                Err(error) => return Err(error.into()),
            }
        }
    }
    writer.flush()?;
    Ok(())
}
