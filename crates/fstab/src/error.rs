// Copyright 2021 System76 <info@system76.com>
// SPDX-License-Identifier: LGPL-3.0-only

use std::io;
use std::num::ParseIntError;

#[derive(Debug, Error)]
pub enum FstabError {
    /// The line is blank or a comment, and holds no entry.
    #[error("line does not contain an fstab entry")]
    SkippableLine,
    /// The line does not have exactly six fields, so the table cannot be trusted.
    #[error("expected 6 fields in fstab line, found {found}: {line:?}")]
    MalformedLine { line: String, found: usize },
    #[error("fstab {field} field is not a valid number: {value:?}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("cannot format an incomplete entry")]
    Unformattable,
    #[error("failed to read fstab")]
    Read(#[source] io::Error),
    #[error("failed to write fstab")]
    Write(#[source] io::Error),
}
