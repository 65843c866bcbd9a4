use super::Hasher;
use crate::errors::GateError;
use crate::types::{Fingerprint128, ReadStrategy, FRINGE_WINDOW, FULL_CHUNK};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

/// XXH3-based [`Hasher`]. Non-cryptographic, the standard choice for
/// content-addressed change detection over file bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct XxHasher;

fn digest_to_fingerprint(state: &Xxh3) -> Fingerprint128 {
    Fingerprint128(state.digest128().to_be_bytes())
}

impl Hasher for XxHasher {
    fn fringe(
        &self,
        path: &Path,
        size: u64,
        strategy: ReadStrategy,
    ) -> Result<Fingerprint128, GateError> {
        let mut file = File::open(path).map_err(GateError::Read)?;
        let window = FRINGE_WINDOW;
        let mut state = Xxh3::new();

        if size <= 2 * window {
            // Regions overlap or the file is small: read it once, in order,
            // with no double-counted bytes.
            let mut buf = vec![0u8; size as usize];
            file.read_exact(&mut buf).map_err(GateError::Read)?;
            state.update(&buf);
        } else {
            match strategy {
                ReadStrategy::SeekFringe => {
                    let mut head = vec![0u8; window as usize];
                    file.read_exact(&mut head).map_err(GateError::Read)?;
                    state.update(&head);

                    file.seek(SeekFrom::Start(size - window))
                        .map_err(GateError::Read)?;
                    let mut tail = vec![0u8; window as usize];
                    file.read_exact(&mut tail).map_err(GateError::Read)?;
                    state.update(&tail);
                }
                ReadStrategy::SequentialHdd => {
                    // Single contiguous read of the first 2W bytes: a distinct
                    // fingerprint domain from SeekFringe.
                    let mut head = vec![0u8; (2 * window) as usize];
                    file.read_exact(&mut head).map_err(GateError::Read)?;
                    state.update(&head);
                }
            }
        }

        state.update(&size.to_le_bytes());
        Ok(digest_to_fingerprint(&state))
    }

    fn full(&self, path: &Path, expected_size: u64) -> Result<Fingerprint128, GateError> {
        let mut file = File::open(path).map_err(GateError::Read)?;
        let mut state = Xxh3::new();
        let mut buf = vec![0u8; FULL_CHUNK];
        let mut total_read: u64 = 0;

        loop {
            let n = file.read(&mut buf).map_err(GateError::Read)?;
            if n == 0 {
                break;
            }
            state.update(&buf[..n]);
            total_read += n as u64;
        }

        if total_read < expected_size {
            return Err(GateError::Read(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "file shrank mid-read: expected at least {expected_size} bytes, read {total_read}"
                ),
            )));
        }

        Ok(digest_to_fingerprint(&state))
    }
}
