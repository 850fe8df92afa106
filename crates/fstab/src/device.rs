// Copyright 2021 System76 <info@system76.com>
// SPDX-License-Identifier: LGPL-3.0-only

use std::fmt;
use std::str::FromStr;

/// Tags which may identify a device in the first field of an fstab entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    Label,
    Uuid,
    PartLabel,
    PartUuid,
    Id,
}

impl TagKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TagKind::Label => "LABEL",
            TagKind::Uuid => "UUID",
            TagKind::PartLabel => "PARTLABEL",
            TagKind::PartUuid => "PARTUUID",
            TagKind::Id => "ID",
        }
    }
}

impl FromStr for TagKind {
    type Err = ();

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let kind = match tag {
            "LABEL" => TagKind::Label,
            "UUID" => TagKind::Uuid,
            "PARTLABEL" => TagKind::PartLabel,
            "PARTUUID" => TagKind::PartUuid,
            "ID" => TagKind::Id,
            _ => return Err(()),
        };

        Ok(kind)
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The device specifier of an fstab entry.
///
/// A device is either referenced directly (`/dev/sda1`, `tmpfs`, `none`), or
/// through a tag such as `UUID=1234`. The textual form is always derived from
/// this representation, so the tag and its value can never disagree with it.
/// An untagged device can only be created from text without a known tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub struct Device(Repr);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Repr {
    Path(String),
    Tagged { tag: String, value: String },
}

impl Device {
    /// Decomposes a device specifier as found in an fstab file.
    ///
    /// Only the five known tags are split off. Anything else, including
    /// `FOO=bar`, is kept verbatim as a path.
    pub fn parse(device: &str) -> Self {
        if let Some((tag, value)) = device.split_once('=') {
            if tag.parse::<TagKind>().is_ok() {
                return Device::tagged(tag, value);
            }
        }

        Device(Repr::Path(device.to_owned()))
    }

    /// Composes a tagged device without checking the tag against the known set.
    pub fn tagged(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Device(Repr::Tagged { tag: tag.into(), value: value.into() })
    }

    pub fn tag_type(&self) -> Option<&str> {
        match &self.0 {
            Repr::Tagged { tag, .. } => Some(tag),
            Repr::Path(_) => None,
        }
    }

    pub fn tag_value(&self) -> Option<&str> {
        match &self.0 {
            Repr::Tagged { value, .. } => Some(value),
            Repr::Path(_) => None,
        }
    }

    /// The tag of this device, if it is one of the known kinds.
    pub fn tag_kind(&self) -> Option<TagKind> {
        self.tag_type().and_then(|tag| tag.parse().ok())
    }

    /// Replaces the tag, keeping the value.
    ///
    /// An untagged device becomes the value of the new tag.
    pub fn set_tag_type(&mut self, new_tag: impl Into<String>) {
        let new_tag = new_tag.into();
        match &mut self.0 {
            Repr::Tagged { tag, .. } => *tag = new_tag,
            Repr::Path(path) => {
                let value = std::mem::take(path);
                *self = Device::tagged(new_tag, value);
            }
        }
    }

    /// Replaces the value, keeping the tag.
    ///
    /// An untagged device has no tag to keep, so it is replaced by the new
    /// value, decomposed like any other device text.
    pub fn set_tag_value(&mut self, new_value: impl Into<String>) {
        let new_value = new_value.into();
        match &mut self.0 {
            Repr::Tagged { value, .. } => *value = new_value,
            Repr::Path(_) => *self = Device::parse(&new_value),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Path(path) => f.write_str(path),
            Repr::Tagged { tag, value } => write!(f, "{}={}", tag, value),
        }
    }
}

impl FromStr for Device {
    type Err = std::convert::Infallible;

    fn from_str(device: &str) -> Result<Self, Self::Err> {
        Ok(Device::parse(device))
    }
}

impl From<&str> for Device {
    fn from(device: &str) -> Self {
        Device::parse(device)
    }
}

impl From<String> for Device {
    fn from(device: String) -> Self {
        Device::parse(&device)
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        match device.0 {
            Repr::Path(path) => path,
            Repr::Tagged { tag, value } => format!("{}={}", tag, value),
        }
    }
}
