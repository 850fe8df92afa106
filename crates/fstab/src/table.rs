// Copyright 2021 System76 <info@system76.com>
// SPDX-License-Identifier: LGPL-3.0-only

use crate::entry::{Entry, Line};
use crate::error::FstabError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{Read, Write};

/// Entries of an fstab file, in file order, with lookups by device,
/// directory, and filesystem type.
#[derive(Clone, Debug, Default)]
pub struct Table {
    entries: Vec<Entry>,
    /// A single device may be mounted at several directories.
    by_device: BTreeMap<String, Vec<usize>>,
    /// Only the last entry for a directory takes effect.
    by_directory: BTreeMap<String, usize>,
    by_type: BTreeMap<String, Vec<usize>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the entries of an fstab file, placing them before any entries
    /// already in the table.
    ///
    /// With `only_effective`, an entry is dropped when a later entry mounts
    /// to the same directory, since the later mount replaces it. Entries
    /// already in the table count as later ones.
    ///
    /// A malformed line fails the whole parse, and leaves the table as it was.
    pub fn read_string(&mut self, data: &str, only_effective: bool) -> Result<&mut Self, FstabError> {
        let mut claimed = BTreeSet::new();
        let mut parsed = Vec::new();

        // Walk input lines from last to first: the first time a directory is
        // seen in this walk is its last occurrence in the file.
        for line in data.lines().rev() {
            let entry = match Entry::parse_line(line)? {
                Line::Entry(entry) => entry,
                Line::Skip => {
                    trace!("skipping line without entry: {:?}", line);
                    continue;
                }
            };

            let directory = ward::ward!(entry.directory.clone(), else { continue });

            let superseded = self.by_directory.contains_key(&directory) || claimed.contains(&directory);
            if only_effective && superseded {
                debug!("dropping superseded mount of {}: {}", directory, line.trim());
                continue;
            }

            claimed.insert(directory);
            parsed.push(entry);
        }

        debug!("parsed {} fstab entries", parsed.len());

        parsed.reverse();
        parsed.append(&mut self.entries);
        self.entries = parsed;
        self.reindex();

        Ok(self)
    }

    /// Reads all text from `reader` and parses it as with [`Table::read_string`].
    pub fn read_from<R: Read>(&mut self, mut reader: R, only_effective: bool) -> Result<&mut Self, FstabError> {
        let mut data = String::new();
        reader.read_to_string(&mut data).map_err(FstabError::Read)?;
        self.read_string(&data, only_effective)
    }

    /// Appends an entry after all others, so that it takes effect for its directory.
    pub fn push(&mut self, entry: Entry) -> Result<(), FstabError> {
        if !entry.is_valid() {
            return Err(FstabError::Unformattable);
        }

        self.entries.push(entry);
        self.index(self.entries.len() - 1);
        Ok(())
    }

    /// Formats every entry as a line, joined by newlines.
    pub fn write_string(&self) -> Result<String, FstabError> {
        let lines = self
            .entries
            .iter()
            .map(Entry::write_string)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines.join("\n"))
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), FstabError> {
        let data = self.write_string()?;
        writer.write_all(data.as_bytes()).map_err(FstabError::Write)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries of a device, in file order.
    pub fn entries_by_device<'a>(&'a self, device: &str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.lookup(self.by_device.get(device))
    }

    /// The entry which takes effect for a directory.
    pub fn entry_by_directory(&self, directory: &str) -> Option<&Entry> {
        self.by_directory.get(directory).map(|&index| &self.entries[index])
    }

    /// All entries of a filesystem type, in file order.
    pub fn entries_by_type<'a>(&'a self, filesystem_type: &str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.lookup(self.by_type.get(filesystem_type))
    }

    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.by_device.keys().map(String::as_str)
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.by_directory.keys().map(String::as_str)
    }

    pub fn filesystem_types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }

    fn lookup<'a>(&'a self, indexes: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a Entry> + 'a {
        indexes
            .into_iter()
            .flatten()
            .map(move |&index| &self.entries[index])
    }

    fn reindex(&mut self) {
        self.by_device.clear();
        self.by_directory.clear();
        self.by_type.clear();

        for index in 0..self.entries.len() {
            self.index(index);
        }
    }

    /// Indexes an entry which is later in file order than all indexed entries.
    fn index(&mut self, index: usize) {
        let entry = &self.entries[index];

        if let Some(device) = entry.device.as_ref() {
            self.by_device.entry(device.to_string()).or_default().push(index);
        }

        if let Some(directory) = entry.directory.as_ref() {
            self.by_directory.insert(directory.clone(), index);
        }

        if let Some(filesystem_type) = entry.filesystem_type.as_ref() {
            self.by_type.entry(filesystem_type.clone()).or_default().push(index);
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Fstab [{} entries]", self.entries.len())?;

        if !self.entries.is_empty() {
            f.write_str("\n")?;
            for line in self.entries.iter().filter_map(|entry| entry.write_string().ok()) {
                writeln!(f, "  {}", line)?;
            }
        }

        f.write_str(">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADOWED: &str = "\
UUID=A /mnt ext4 rw 0 1
tmpfs /tmp tmpfs size=64M 0 0
UUID=B /mnt ext4 rw 0 1
";

    fn devices(entries: &[Entry]) -> Vec<String> {
        entries
            .iter()
            .map(|entry| entry.device.as_ref().unwrap().to_string())
            .collect()
    }

    #[test]
    fn keeps_every_entry_in_file_order() {
        let mut table = Table::new();
        table.read_string(SHADOWED, false).unwrap();

        assert_eq!(devices(table.entries()), ["UUID=A", "tmpfs", "UUID=B"]);
        assert_eq!(table.entries_by_type("ext4").count(), 2);
        assert_eq!(
            table.entry_by_directory("/mnt").unwrap().device,
            Some("UUID=B".into())
        );
    }

    #[test]
    fn only_effective_keeps_last_mount_per_directory() {
        let mut table = Table::new();
        table.read_string(SHADOWED, true).unwrap();

        assert_eq!(devices(table.entries()), ["tmpfs", "UUID=B"]);
        assert_eq!(table.entries_by_device("UUID=A").count(), 0);
        assert_eq!(table.directories().collect::<Vec<_>>(), ["/mnt", "/tmp"]);
    }

    #[test]
    fn devices_mounted_at_many_directories() {
        let mut table = Table::new();
        table
            .read_string(
                "UUID=1 /a ext4 rw 0 1\nUUID=1 /b ext4 rw 0 1\nUUID=2 /c xfs rw 0 2",
                true,
            )
            .unwrap();

        let directories = table
            .entries_by_device("UUID=1")
            .map(|entry| entry.directory.as_deref().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(directories, ["/a", "/b"]);
        assert_eq!(table.devices().collect::<Vec<_>>(), ["UUID=1", "UUID=2"]);
        assert_eq!(table.filesystem_types().collect::<Vec<_>>(), ["ext4", "xfs"]);
    }

    #[test]
    fn malformed_line_leaves_table_untouched() {
        let mut table = Table::new();
        table.read_string("UUID=1 / ext4 rw 0 1", false).unwrap();

        let result = table.read_string("UUID=2 /home ext4 rw 0 2\nbad line here\n", false);
        assert!(matches!(result, Err(FstabError::MalformedLine { .. })));
        assert_eq!(table.len(), 1);
        assert!(table.entry_by_directory("/home").is_none());
    }

    #[test]
    fn repeated_reads_prepend() {
        let mut table = Table::new();
        table.read_string("UUID=B /mnt ext4 rw 0 1", true).unwrap();
        table
            .read_string("UUID=A /mnt ext4 rw 0 1\nUUID=C /srv ext4 rw 0 2", true)
            .unwrap();

        assert_eq!(devices(table.entries()), ["UUID=C", "UUID=B"]);
        assert_eq!(
            table.entry_by_directory("/mnt").unwrap().device,
            Some("UUID=B".into())
        );
    }

    #[test]
    fn push_takes_effect_and_rejects_incomplete_entries() {
        let mut table = Table::new();
        table.push(Entry::new("UUID=X", "/", "ext4", "rw", 0, 1)).unwrap();
        table.push(Entry::new("UUID=Y", "/", "ext4", "ro", 0, 1)).unwrap();

        assert_eq!(
            table.entry_by_directory("/").unwrap().options.as_deref(),
            Some("ro")
        );

        let mut incomplete = Entry::new("UUID=Z", "/z", "ext4", "rw", 0, 1);
        incomplete.dump = None;
        assert!(matches!(table.push(incomplete), Err(FstabError::Unformattable)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn writes_lines_without_trailing_newline() {
        let mut table = Table::new();
        table.push(Entry::new("UUID=X", "/", "ext4", "rw", 0, 1)).unwrap();
        table.push(Entry::new("UUID=Y", "none", "swap", "defaults", 0, 0)).unwrap();

        assert_eq!(
            table.write_string().unwrap(),
            "UUID=X / ext4 rw 0 1\nUUID=Y none swap defaults 0 0"
        );
        assert_eq!(Table::new().write_string().unwrap(), "");
    }
}
