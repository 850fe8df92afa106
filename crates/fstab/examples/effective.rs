// Copyright 2021 System76 <info@system76.com>
// SPDX-License-Identifier: GPL-3.0-only

#[macro_use]
extern crate fomat_macros;

use anyhow::Context;
use pop_fstab::Table;
use std::fs::File;

/// Lists the mounts which take effect in an fstab file (`/etc/fstab` by default).
fn main() -> anyhow::Result<()> {
    better_panic::install();
    env_logger::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "/etc/fstab".into());

    let file = File::open(&path).with_context(|| format!("failed to open {}", path))?;

    let mut table = Table::new();
    table
        .read_from(file, true)
        .with_context(|| format!("failed to parse {}", path))?;

    for directory in table.directories() {
        let entry = match table.entry_by_directory(directory) {
            Some(entry) => entry,
            None => continue,
        };

        let device = ward::ward!(entry.device.as_ref(), else { continue });
        let filesystem_type = entry.filesystem_type.as_deref().unwrap_or_default();
        let options = entry.options.as_deref().unwrap_or_default();

        pintln!(
            (directory) "\n"
            "  Device: " (device) "\n"
            "  Type: " (filesystem_type) "\n"
            "  Options: " (options) "\n"
            if let Some(tag) = entry.device_tag_type() {
                "  Tag: " (tag) "\n"
            }
            "  Dump: " (entry.dump.unwrap_or_default()) ", Fsck: " (entry.fsck_order.unwrap_or_default())
        );
    }

    Ok(())
}
