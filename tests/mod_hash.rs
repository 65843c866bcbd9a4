use bgate::hash::{Hasher, XxHasher};
use bgate::types::{ReadStrategy, FRINGE_WINDOW};
use std::io::Write;
use tempfile::tempdir;
use xxhash_rust::xxh3::Xxh3;

fn reference_digest(chunks: &[&[u8]]) -> [u8; 16] {
    let mut state = Xxh3::new();
    for chunk in chunks {
        state.update(chunk);
    }
    state.digest128().to_be_bytes()
}

fn write_bytes(dir: &std::path::Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let p = dir.join(name);
    let mut f = std::fs::File::create(&p).unwrap();
    f.write_all(bytes).unwrap();
    p
}

#[test]
fn fringe_is_deterministic_for_identical_content() {
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let content = vec![7u8; 1024];
    let a = write_bytes(dir.path(), "a.bin", &content);
    let b = write_bytes(dir.path(), "b.bin", &content);

    let fa = hasher.fringe(&a, content.len() as u64, ReadStrategy::SeekFringe).unwrap();
    let fb = hasher.fringe(&b, content.len() as u64, ReadStrategy::SeekFringe).unwrap();
    assert_eq!(fa.as_bytes(), fb.as_bytes());
}

#[test]
fn fringe_differs_between_distinct_content() {
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let a = write_bytes(dir.path(), "a.bin", &[1u8; 2048]);
    let b = write_bytes(dir.path(), "b.bin", &[2u8; 2048]);

    let fa = hasher.fringe(&a, 2048, ReadStrategy::SeekFringe).unwrap();
    let fb = hasher.fringe(&b, 2048, ReadStrategy::SeekFringe).unwrap();
    assert_ne!(fa.as_bytes(), fb.as_bytes());
}

#[test]
fn fringe_handles_file_smaller_than_two_windows() {
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let small = vec![9u8; 10];
    let p = write_bytes(dir.path(), "small.bin", &small);
    let fp = hasher.fringe(&p, small.len() as u64, ReadStrategy::SeekFringe);
    assert!(fp.is_ok());
}

#[test]
fn fringe_handles_exact_two_window_boundary() {
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let size = (2 * FRINGE_WINDOW) as usize;
    let content = vec![5u8; size];
    let p = write_bytes(dir.path(), "boundary.bin", &content);
    let fp = hasher.fringe(&p, size as u64, ReadStrategy::SeekFringe);
    assert!(fp.is_ok());
}

#[test]
fn fringe_at_exact_two_window_boundary_matches_single_read_reference() {
    // size == 2*FRINGE_WINDOW takes the single-contiguous-read branch, not
    // the head/tail seek branch, so the reference digest is the whole
    // buffer hashed once plus the size suffix.
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let size = (2 * FRINGE_WINDOW) as usize;
    let mut content = vec![0u8; size];
    for (i, b) in content.iter_mut().enumerate() {
        *b = (i % 256) as u8;
    }
    let p = write_bytes(dir.path(), "boundary_exact.bin", &content);

    let got = hasher.fringe(&p, size as u64, ReadStrategy::SeekFringe).unwrap();
    let want = reference_digest(&[&content, &(size as u64).to_le_bytes()]);
    assert_eq!(got.as_bytes(), &want);
}

#[test]
fn fringe_just_over_two_window_boundary_matches_head_tail_reference() {
    // size == 2*FRINGE_WINDOW + 1 takes the head/tail seek branch: the
    // reference digest concatenates the first window, the last window
    // (which overlaps the head by one byte here), then the size suffix.
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let window = FRINGE_WINDOW as usize;
    let size = 2 * window + 1;
    let mut content = vec![0u8; size];
    for (i, b) in content.iter_mut().enumerate() {
        *b = (i % 256) as u8;
    }
    let p = write_bytes(dir.path(), "boundary_over.bin", &content);

    let got = hasher.fringe(&p, size as u64, ReadStrategy::SeekFringe).unwrap();
    let head = &content[..window];
    let tail = &content[size - window..];
    let want = reference_digest(&[head, tail, &(size as u64).to_le_bytes()]);
    assert_eq!(got.as_bytes(), &want);
}

#[test]
fn fringe_just_under_two_window_boundary_matches_single_read_reference() {
    // size == 2*FRINGE_WINDOW - 1 still fits the single-read branch
    // (size <= 2*window), so no byte should be double-counted.
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let size = (2 * FRINGE_WINDOW) as usize - 1;
    let mut content = vec![0u8; size];
    for (i, b) in content.iter_mut().enumerate() {
        *b = ((i * 7 + 3) % 256) as u8;
    }
    let p = write_bytes(dir.path(), "boundary_under.bin", &content);

    let got = hasher.fringe(&p, size as u64, ReadStrategy::SeekFringe).unwrap();
    let want = reference_digest(&[&content, &(size as u64).to_le_bytes()]);
    assert_eq!(got.as_bytes(), &want);
}

#[test]
fn seek_fringe_and_sequential_hdd_are_distinct_domains() {
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let size = (4 * FRINGE_WINDOW) as usize;
    let content = (0..size).map(|i| (i % 251) as u8).collect::<Vec<_>>();
    let p = write_bytes(dir.path(), "big.bin", &content);

    let seek = hasher.fringe(&p, size as u64, ReadStrategy::SeekFringe).unwrap();
    let hdd = hasher.fringe(&p, size as u64, ReadStrategy::SequentialHdd).unwrap();
    assert_ne!(seek.as_bytes(), hdd.as_bytes());
}

#[test]
fn full_hash_is_deterministic_and_order_sensitive() {
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let a = write_bytes(dir.path(), "a.bin", b"hello world");
    let b = write_bytes(dir.path(), "b.bin", b"hello world");
    let c = write_bytes(dir.path(), "c.bin", b"hello worlD");

    let fa = hasher.full(&a, 11).unwrap();
    let fb = hasher.full(&b, 11).unwrap();
    let fc = hasher.full(&c, 11).unwrap();
    assert_eq!(fa.as_bytes(), fb.as_bytes());
    assert_ne!(fa.as_bytes(), fc.as_bytes());
}

#[test]
fn full_hash_rejects_file_shorter_than_expected_size() {
    let dir = tempdir().unwrap();
    let hasher = XxHasher;
    let p = write_bytes(dir.path(), "short.bin", b"abc");
    let result = hasher.full(&p, 100);
    assert!(result.is_err());
}
