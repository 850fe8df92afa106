// Copyright 2021 System76 <info@system76.com>
// SPDX-License-Identifier: LGPL-3.0-only

use crate::device::Device;
use crate::error::FstabError;
use std::fmt;

/// Outcome of parsing a single line of an fstab file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Entry(Entry),
    /// A blank line or a comment.
    Skip,
}

/// A single mount described by one line of an fstab file.
///
/// Every field may be absent, so that an entry can be assembled piece by
/// piece. Only an entry with all six fields present is valid, and only a
/// valid entry can be formatted back into a line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entry {
    /// Block device or other source, such as `UUID=1234` or `tmpfs`.
    pub device: Option<Device>,
    /// Mount point, or `none` for swap.
    pub directory: Option<String>,
    pub filesystem_type: Option<String>,
    /// Comma-separated mount options, kept as written.
    pub options: Option<String>,
    /// Whether `dump` should back up this filesystem.
    pub dump: Option<i64>,
    /// Order in which `fsck` checks this filesystem; `0` disables the check.
    pub fsck_order: Option<i64>,
}

impl Entry {
    pub fn new(
        device: impl Into<Device>,
        directory: impl Into<String>,
        filesystem_type: impl Into<String>,
        options: impl Into<String>,
        dump: i64,
        fsck_order: i64,
    ) -> Self {
        Self {
            device: Some(device.into()),
            directory: Some(directory.into()),
            filesystem_type: Some(filesystem_type.into()),
            options: Some(options.into()),
            dump: Some(dump),
            fsck_order: Some(fsck_order),
        }
    }

    /// Parses one line of an fstab file.
    ///
    /// Blank lines and comments yield [`Line::Skip`]. A line that does not
    /// hold exactly six whitespace-separated fields is malformed.
    pub fn parse_line(line: &str) -> Result<Line, FstabError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Line::Skip);
        }

        let fields = line.split_whitespace().collect::<Vec<_>>();

        let (device, directory, filesystem_type, options, dump, fsck_order) = match fields[..] {
            [device, directory, filesystem_type, options, dump, fsck_order] => {
                (device, directory, filesystem_type, options, dump, fsck_order)
            }
            _ => {
                return Err(FstabError::MalformedLine {
                    line: line.to_owned(),
                    found: fields.len(),
                })
            }
        };

        Ok(Line::Entry(Entry::new(
            Device::parse(device),
            directory,
            filesystem_type,
            options,
            parse_number("dump", dump)?,
            parse_number("fsck order", fsck_order)?,
        )))
    }

    /// Replaces the contents of this entry with those parsed from `line`.
    ///
    /// A blank or comment line clears every field and returns
    /// [`FstabError::SkippableLine`]. On any other error the entry is untouched.
    pub fn read_string(&mut self, line: &str) -> Result<&mut Self, FstabError> {
        match Self::parse_line(line)? {
            Line::Entry(entry) => {
                *self = entry;
                Ok(self)
            }
            Line::Skip => {
                *self = Entry::default();
                Err(FstabError::SkippableLine)
            }
        }
    }

    /// Formats the entry as an fstab line, with fields separated by single spaces.
    pub fn write_string(&self) -> Result<String, FstabError> {
        let (device, directory, filesystem_type, options, dump, fsck_order) =
            ward::ward!(self.fields(), else { return Err(FstabError::Unformattable) });

        Ok(format!(
            "{} {} {} {} {} {}",
            device, directory, filesystem_type, options, dump, fsck_order
        ))
    }

    /// True when all six fields are present.
    pub fn is_valid(&self) -> bool {
        self.fields().is_some()
    }

    pub fn set_device(&mut self, device: impl Into<Device>) {
        self.device = Some(device.into());
    }

    /// Sets the device from its textual form, decomposing any known tag.
    pub fn set_device_str(&mut self, device: &str) {
        self.device = Some(Device::parse(device));
    }

    pub fn device_tag_type(&self) -> Option<&str> {
        self.device.as_ref().and_then(Device::tag_type)
    }

    pub fn device_tag_value(&self) -> Option<&str> {
        self.device.as_ref().and_then(Device::tag_value)
    }

    /// Sets the tag of the device, which is not checked against the known tags.
    ///
    /// When no device is set yet, the device becomes the tag with an empty value.
    pub fn set_device_tag_type(&mut self, tag: impl Into<String>) {
        match self.device.as_mut() {
            Some(device) => device.set_tag_type(tag),
            None => self.device = Some(Device::tagged(tag, String::new())),
        }
    }

    /// Sets the value of the device's tag.
    ///
    /// When no device is set yet, the value becomes the device, decomposed
    /// like any other device text.
    pub fn set_device_tag_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self.device.as_mut() {
            Some(device) => device.set_tag_value(value),
            None => self.device = Some(Device::parse(&value)),
        }
    }

    fn fields(&self) -> Option<(&Device, &str, &str, &str, i64, i64)> {
        Some((
            self.device.as_ref()?,
            self.directory.as_deref()?,
            self.filesystem_type.as_deref()?,
            self.options.as_deref()?,
            self.dump?,
            self.fsck_order?,
        ))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.write_string() {
            Ok(line) => write!(f, "<Entry {}>", line),
            Err(_) => f.write_str("<Entry Invalid>"),
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<i64, FstabError> {
    value.parse::<i64>().map_err(|source| FstabError::InvalidNumber {
        field,
        value: value.to_owned(),
        source,
    })
}
