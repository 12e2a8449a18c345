#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use flate2::{Compression, write::GzEncoder};
use object_store::{ObjectStore, PutPayload, memory::InMemory, path::Path};

use cloudledger::datastore::ObjectDataStore;

pub const ROOT: &str = "ledgers/pubnet";

/// Gzipped length-framed batch of `records` starting at `start`
pub fn batch_file(start: u32, records: &[&[u8]]) -> Vec<u8> {
    let end = start + records.len() as u32 - 1;
    let mut xdr = Vec::new();
    xdr.extend_from_slice(&start.to_be_bytes());
    xdr.extend_from_slice(&end.to_be_bytes());
    xdr.extend_from_slice(&(records.len() as u32).to_be_bytes());
    for record in records {
        xdr.extend_from_slice(&(record.len() as u32).to_be_bytes());
        xdr.extend_from_slice(record);
        xdr.resize(xdr.len() + (4 - record.len() % 4) % 4, 0);
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&xdr).unwrap();
    encoder.finish().unwrap()
}

/// In-memory store rooted at [`ROOT`] holding `files` (key relative to the root)
pub async fn seeded_store(files: &[(&str, Vec<u8>)]) -> ObjectDataStore {
    let memory: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    for (key, bytes) in files {
        memory
            .put(
                &Path::from(format!("{ROOT}/{key}")),
                PutPayload::from(bytes.clone()),
            )
            .await
            .unwrap();
    }
    ObjectDataStore::new(memory, ROOT)
}

/// One single-ledger file per sequence, partitioned 64000 files per directory
pub async fn pubnet_store(sequences: &[u32]) -> ObjectDataStore {
    let files: Vec<(String, Vec<u8>)> = sequences
        .iter()
        .map(|&sequence| {
            let partition_start = sequence - sequence % 64000;
            (
                format!("{}-{}/{}.xdr.gz", partition_start, partition_start + 63999, sequence),
                batch_file(sequence, &[format!("ledger-{sequence}").as_bytes()]),
            )
        })
        .collect();

    let borrowed: Vec<(&str, Vec<u8>)> = files
        .iter()
        .map(|(key, bytes)| (key.as_str(), bytes.clone()))
        .collect();
    seeded_store(&borrowed).await
}
