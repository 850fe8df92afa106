// Copyright 2021 System76 <info@system76.com>
// SPDX-License-Identifier: LGPL-3.0-only

//! Parsing and formatting of `/etc/fstab` tables.
//!
//! The crate works purely on text: callers hand over the contents of a table
//! and receive text back. Reading and writing files is left to them, though
//! [`Table::read_from`] and [`Table::write_to`] accept any reader or writer.

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate thiserror;

mod device;
mod entry;
mod error;
mod table;

pub use self::device::*;
pub use self::entry::*;
pub use self::error::*;
pub use self::table::*;
