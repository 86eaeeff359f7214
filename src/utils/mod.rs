// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod files;
pub mod key_pair;
pub mod terminal;
