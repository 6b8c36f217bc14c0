// Stract is an open source web search engine.
// Copyright (C) 2023 Stract ApS
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Typed little-endian readers over byte slices.
//!
//! The archive is memory-mapped, so "reading" here means slicing an
//! already-resident buffer rather than issuing syscalls — the mmap itself is
//! the cursor. Grounded on the inline `from_le_bytes` calls throughout
//! `crates/zimba/src/lib.rs`, generalized into small named helpers plus a
//! lossy zero-terminated string reader that cannot over-read.

use crate::error::{Error, Result};

pub fn u16_at(bytes: &[u8], at: usize) -> Result<u16> {
    let slice = bytes.get(at..at + 2).ok_or(Error::TruncatedArchive)?;
    Ok(u16::from_le_bytes(slice.try_into().unwrap()))
}

pub fn u32_at(bytes: &[u8], at: usize) -> Result<u32> {
    let slice = bytes.get(at..at + 4).ok_or(Error::TruncatedArchive)?;
    Ok(u32::from_le_bytes(slice.try_into().unwrap()))
}

pub fn u64_at(bytes: &[u8], at: usize) -> Result<u64> {
    let slice = bytes.get(at..at + 8).ok_or(Error::TruncatedArchive)?;
    Ok(u64::from_le_bytes(slice.try_into().unwrap()))
}

/// Reads a zero-terminated UTF-8 string starting at the beginning of
/// `bytes`. Invalid UTF-8 bytes are replaced (never over-reads past the
/// buffer's end); missing terminator before EOF is `TruncatedArchive`.
pub fn read_zero_terminated(bytes: &[u8]) -> Result<String> {
    let end = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or(Error::TruncatedArchive)?;
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fixed_width_integers() {
        let bytes = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
        assert_eq!(u16_at(&bytes, 0).unwrap(), 1);
        assert_eq!(u32_at(&bytes, 2).unwrap(), 2);
    }

    #[test]
    fn truncated_integers_error() {
        let bytes = [0x01];
        assert!(matches!(u16_at(&bytes, 0), Err(Error::TruncatedArchive)));
    }

    #[test]
    fn zero_terminated_round_trip() {
        assert_eq!(read_zero_terminated(b"hello\0world").unwrap(), "hello");
    }

    #[test]
    fn missing_terminator_is_truncated() {
        assert!(matches!(
            read_zero_terminated(b"no terminator"),
            Err(Error::TruncatedArchive)
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let bytes = [0xFF, 0xFE, 0x00];
        let s = read_zero_terminated(&bytes).unwrap();
        assert!(s.contains('\u{FFFD}'));
    }
}
