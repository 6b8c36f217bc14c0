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

//! Synthetic ZIM archive bytes shared by unit tests across this crate.
//!
//! Builds a two-entry archive matching the S1/S2 scenarios from the spec:
//! entry 0 is a redirect `Lutetia -> Paris`, entry 1 is the article `Paris`
//! whose body is stored uncompressed in a single one-blob cluster.

#![cfg(test)]

pub const PARIS_BODY: &[u8] =
    b"<html><head><title>Paris</title></head><body>Bonjour</body></html>";

fn redirect_entry(url: &str, title: &str, target: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0xFFFFu16.to_le_bytes()); // mime id
    buf.push(0); // parameter len
    buf.push(b'A'); // namespace
    buf.extend_from_slice(&0u32.to_le_bytes()); // revision
    buf.extend_from_slice(&target.to_le_bytes()); // redirect index
    buf.extend_from_slice(url.as_bytes());
    buf.push(0);
    buf.extend_from_slice(title.as_bytes());
    buf.push(0);
    buf
}

fn article_entry(url: &str, title: &str, mime_id: u16, cluster: u32, blob: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&mime_id.to_le_bytes());
    buf.push(0); // parameter len
    buf.push(b'A'); // namespace
    buf.extend_from_slice(&0u32.to_le_bytes()); // revision
    buf.extend_from_slice(&cluster.to_le_bytes());
    buf.extend_from_slice(&blob.to_le_bytes());
    buf.extend_from_slice(url.as_bytes());
    buf.push(0);
    buf.extend_from_slice(title.as_bytes());
    buf.push(0);
    buf
}

fn uncompressed_cluster(blobs: &[&[u8]]) -> Vec<u8> {
    let n = blobs.len();
    let mut offsets = Vec::with_capacity(n + 1);
    let mut running = 4 * (n as u32 + 1);
    offsets.push(running);
    for b in blobs {
        running += b.len() as u32;
        offsets.push(running);
    }

    let mut payload = Vec::new();
    for o in &offsets {
        payload.extend_from_slice(&o.to_le_bytes());
    }
    for b in blobs {
        payload.extend_from_slice(b);
    }

    let mut cluster = vec![1u8]; // compression type: uncompressed
    cluster.extend_from_slice(&payload);
    cluster
}

/// Build a full little-endian ZIM archive: mime list ["text/html"], entry 0 =
/// redirect `A/Lutetia` -> entry 1, entry 1 = article `A/Paris` in cluster 0
/// blob 0. Entries are laid out in url-sorted order ("Lutetia" < "Paris").
pub fn build_sample_archive() -> Vec<u8> {
    const HEADER_LEN: u64 = 80;

    let mime_list = {
        let mut m = b"text/html\0".to_vec();
        m.push(0); // empty terminator
        m
    };

    let redirect = redirect_entry("Lutetia", "", 1);
    let article = article_entry("Paris", "", 0, 0, 0);
    let cluster = uncompressed_cluster(&[PARIS_BODY]);

    let url_ptr_pos = HEADER_LEN;
    let title_ptr_pos = url_ptr_pos + 8 * 2;
    let cluster_ptr_pos = title_ptr_pos + 4 * 2;
    let mime_list_pos = cluster_ptr_pos + 8 * 1;

    let redirect_offset = mime_list_pos + mime_list.len() as u64;
    let article_offset = redirect_offset + redirect.len() as u64;
    let cluster_offset = article_offset + article.len() as u64;
    let checksum_pos = cluster_offset + cluster.len() as u64;

    let mut out = Vec::new();
    out.extend_from_slice(&72_173_914u32.to_le_bytes()); // magic
    out.extend_from_slice(&5u16.to_le_bytes()); // major
    out.extend_from_slice(&0u16.to_le_bytes()); // minor
    out.extend_from_slice(&[0u8; 16]); // uuid
    out.extend_from_slice(&2u32.to_le_bytes()); // entry_count
    out.extend_from_slice(&1u32.to_le_bytes()); // cluster_count
    out.extend_from_slice(&url_ptr_pos.to_le_bytes());
    out.extend_from_slice(&title_ptr_pos.to_le_bytes());
    out.extend_from_slice(&cluster_ptr_pos.to_le_bytes());
    out.extend_from_slice(&mime_list_pos.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes()); // main_page = Paris (index 1)
    out.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes()); // layout_page
    out.extend_from_slice(&checksum_pos.to_le_bytes());
    assert_eq!(out.len() as u64, HEADER_LEN);

    // url pointer table: index 0 -> redirect ("Lutetia"), index 1 -> article ("Paris")
    out.extend_from_slice(&redirect_offset.to_le_bytes());
    out.extend_from_slice(&article_offset.to_le_bytes());
    assert_eq!(out.len() as u64, title_ptr_pos);

    // title pointer table: unused by the core, zero-filled
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    assert_eq!(out.len() as u64, cluster_ptr_pos);

    out.extend_from_slice(&cluster_offset.to_le_bytes());
    assert_eq!(out.len() as u64, mime_list_pos);

    out.extend_from_slice(&mime_list);
    assert_eq!(out.len() as u64, redirect_offset);

    out.extend_from_slice(&redirect);
    assert_eq!(out.len() as u64, article_offset);

    out.extend_from_slice(&article);
    assert_eq!(out.len() as u64, cluster_offset);

    out.extend_from_slice(&cluster);
    assert_eq!(out.len() as u64, checksum_pos);

    // trailing checksum (16 bytes, content unchecked by this reader)
    out.extend_from_slice(&[0u8; 16]);

    out
}

/// First 80 bytes of the sample archive, for header-only unit tests.
pub fn sample_header_bytes() -> [u8; 80] {
    let archive = build_sample_archive();
    archive[..80].try_into().unwrap()
}
