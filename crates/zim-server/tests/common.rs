//! Synthetic ZIM archive builder for integration tests, generalizing
//! `crates/zim`'s own `testutil::build_sample_archive` to multiple entries,
//! multiple clusters and an optional corrupted cluster (for the S6 scenario).

pub struct EntrySpec {
    pub namespace: char,
    pub url: &'static str,
    pub title: &'static str,
    pub mime: &'static str,
    pub body: &'static [u8],
    pub corrupt: bool,
}

fn article_entry(namespace: char, url: &str, title: &str, mime_id: u16, cluster: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&mime_id.to_le_bytes());
    buf.push(0);
    buf.push(namespace as u8);
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&cluster.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // blob 0 in every cluster
    buf.extend_from_slice(url.as_bytes());
    buf.push(0);
    buf.extend_from_slice(title.as_bytes());
    buf.push(0);
    buf
}

fn cluster_bytes(body: &[u8], corrupt: bool) -> Vec<u8> {
    if corrupt {
        // Claims zstd (comp byte 5) but isn't a valid frame: decompression
        // fails without rejecting the cluster outright, matching the
        // `DecompressionFailed` path that degrades a single read rather
        // than the whole archive.
        return vec![5u8, 0xDE, 0xAD, 0xBE, 0xEF];
    }
    let offsets = [4u32 * 2, 4 * 2 + body.len() as u32];
    let mut payload = Vec::new();
    for o in offsets {
        payload.extend_from_slice(&o.to_le_bytes());
    }
    payload.extend_from_slice(body);
    let mut cluster = vec![1u8];
    cluster.extend_from_slice(&payload);
    cluster
}

/// Entries must already be supplied in `(namespace, url)` sort order.
pub fn build_archive(specs: &[EntrySpec], main_page: u32) -> Vec<u8> {
    const HEADER_LEN: u64 = 80;

    let mut mime_types: Vec<&str> = Vec::new();
    for spec in specs {
        if !mime_types.contains(&spec.mime) {
            mime_types.push(spec.mime);
        }
    }
    let mime_id_of = |mime: &str| mime_types.iter().position(|m| *m == mime).unwrap() as u16;

    let mut mime_list = Vec::new();
    for m in &mime_types {
        mime_list.extend_from_slice(m.as_bytes());
        mime_list.push(0);
    }
    mime_list.push(0); // empty terminator

    let entries: Vec<Vec<u8>> = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| article_entry(spec.namespace, spec.url, spec.title, mime_id_of(spec.mime), i as u32))
        .collect();
    let clusters: Vec<Vec<u8>> = specs
        .iter()
        .map(|spec| cluster_bytes(spec.body, spec.corrupt))
        .collect();

    let entry_count = specs.len() as u32;
    let cluster_count = specs.len() as u32;

    let url_ptr_pos = HEADER_LEN;
    let title_ptr_pos = url_ptr_pos + 8 * entry_count as u64;
    let cluster_ptr_pos = title_ptr_pos + 4 * entry_count as u64;
    let mime_list_pos = cluster_ptr_pos + 8 * cluster_count as u64;

    let mut entry_offsets = Vec::with_capacity(entries.len());
    let mut cursor = mime_list_pos + mime_list.len() as u64;
    for e in &entries {
        entry_offsets.push(cursor);
        cursor += e.len() as u64;
    }

    let mut cluster_offsets = Vec::with_capacity(clusters.len());
    for c in &clusters {
        cluster_offsets.push(cursor);
        cursor += c.len() as u64;
    }
    let checksum_pos = cursor;

    let mut out = Vec::new();
    out.extend_from_slice(&72_173_914u32.to_le_bytes());
    out.extend_from_slice(&5u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(&entry_count.to_le_bytes());
    out.extend_from_slice(&cluster_count.to_le_bytes());
    out.extend_from_slice(&url_ptr_pos.to_le_bytes());
    out.extend_from_slice(&title_ptr_pos.to_le_bytes());
    out.extend_from_slice(&cluster_ptr_pos.to_le_bytes());
    out.extend_from_slice(&mime_list_pos.to_le_bytes());
    out.extend_from_slice(&main_page.to_le_bytes());
    out.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    out.extend_from_slice(&checksum_pos.to_le_bytes());

    for o in &entry_offsets {
        out.extend_from_slice(&o.to_le_bytes());
    }
    for _ in specs {
        out.extend_from_slice(&0u32.to_le_bytes());
    }
    for o in &cluster_offsets {
        out.extend_from_slice(&o.to_le_bytes());
    }
    out.extend_from_slice(&mime_list);
    for e in &entries {
        out.extend_from_slice(e);
    }
    for c in &clusters {
        out.extend_from_slice(c);
    }
    out.extend_from_slice(&[0u8; 16]);

    out
}

pub fn write_archive(dir: &std::path::Path, name: &str, bytes: &[u8]) {
    std::fs::write(dir.join(format!("{name}.zim")), bytes).unwrap();
}
