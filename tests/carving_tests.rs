use std::cell::Cell;
use std::io::{self, Cursor, Write};

use lfle::analysis::MagicLocator;
use lfle::progress::ScanProgress;
use lfle::{BlockSource, CarveError, Carver, Record, ResumePolicy, ScanConfig, ScanStats};

fn record(length: u32, fill: u8) -> Vec<u8> {
    let mut r = vec![fill; length as usize];
    r[..4].copy_from_slice(&length.to_le_bytes());
    r[4..8].copy_from_slice(b"LfLe");
    let n = r.len();
    r[n - 4..].copy_from_slice(&length.to_le_bytes());
    r
}

fn place(image: &mut [u8], offset: usize, bytes: &[u8]) {
    image[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn small_config() -> ScanConfig {
    ScanConfig::new()
        .with_window_size(256)
        .with_record_bounds(0x30, 0x80)
        .with_progress(false)
}

fn carve(image: Vec<u8>, config: ScanConfig) -> (Vec<u8>, ScanStats) {
    let carver = Carver::new(config).unwrap();
    let outcome = carver.carve(&mut Cursor::new(image), Vec::new(), None).unwrap();
    assert!(!outcome.cancelled);
    (outcome.sink, outcome.stats)
}

#[test]
fn test_no_magic_no_output() {
    let image: Vec<u8> = (0..2000).map(|i| (i % 0x4C) as u8).collect();
    let (out, stats) = carve(image, small_config());

    assert!(out.is_empty());
    assert_eq!(stats.total_skipped(), 0);
    assert_eq!(stats.candidates, 0);
    assert_eq!(stats.records_written(), 0);
}

#[test]
fn test_single_record_default_config() {
    let rec = record(0x100, 0xAA);
    let mut image = vec![0u8; 0x1000];
    place(&mut image, 0x400, &rec);

    let (out, stats) = carve(image, ScanConfig::new().with_progress(false));

    assert_eq!(out, rec);
    assert_eq!(stats.total_skipped(), 0);
    assert_eq!(stats.accepted, vec![Record::new(0x400, 0x100)]);
}

#[test]
fn test_length_bounds_default_config() {
    let mut image = vec![0u8; 0x100];
    place(&mut image, 0x10, &0x10001u32.to_le_bytes());
    place(&mut image, 0x14, b"LfLe");
    place(&mut image, 0x80, &0x30u32.to_le_bytes());
    place(&mut image, 0x84, b"LfLe");

    let (out, stats) = carve(image, ScanConfig::new().with_progress(false));

    assert!(out.is_empty());
    assert_eq!(stats.too_large, 1);
    assert_eq!(stats.too_small, 1);
    assert_eq!(stats.total_skipped(), 2);
}

#[test]
fn test_length_bounds_are_configurable() {
    let mut image = vec![0u8; 512];
    place(&mut image, 16, &0x81u32.to_le_bytes());
    place(&mut image, 20, b"LfLe");
    place(&mut image, 100, &0x31u32.to_le_bytes());
    place(&mut image, 104, b"LfLe");
    place(&mut image, 200, &0x30u32.to_le_bytes());
    place(&mut image, 204, b"LfLe");

    let (_, stats) = carve(image, small_config());

    assert_eq!(stats.too_large, 1);
    assert_eq!(stats.too_small, 1);
    // 0x31 passes the bounds but its trailer is missing
    assert_eq!(stats.invalid_structure, 1);
}

#[test]
fn test_mismatched_footer_is_invalid_structure() {
    let mut rec = record(0x40, 0xAA);
    rec[0x3C] = 0x41;
    let mut image = vec![0u8; 512];
    place(&mut image, 32, &rec);

    let (out, stats) = carve(image, small_config());

    assert!(out.is_empty());
    assert_eq!(stats.invalid_structure, 1);
    assert_eq!(stats.total_skipped(), 1);
}

#[test]
fn test_embedded_magic_is_invalid_contents() {
    let mut rec = record(0x60, 0xAA);
    place(&mut rec, 0x30, b"LfLe");
    let mut image = vec![0u8; 512];
    place(&mut image, 32, &rec);

    let (out, stats) = carve(image, small_config());

    assert!(out.is_empty());
    assert_eq!(stats.invalid_contents, 1);
    assert_eq!(stats.candidates, 1);
}

#[test]
fn test_boundary_record_matches_in_window_record() {
    let rec = record(0x80, 0xAA);

    let mut inside = vec![0u8; 1024];
    place(&mut inside, 16, &rec);
    let (inside_out, inside_stats) = carve(inside, small_config());

    let mut crossing = vec![0u8; 1024];
    place(&mut crossing, 200, &rec);
    let (crossing_out, crossing_stats) = carve(crossing, small_config());

    assert_eq!(inside_out, rec);
    assert_eq!(crossing_out, inside_out);
    assert_eq!(inside_stats.rereads, 0);
    assert_eq!(crossing_stats.rereads, 1);
    assert_eq!(crossing_stats.accepted, vec![Record::new(200, 0x80)]);
}

#[test]
fn test_invalid_record_on_reread_path_is_skipped() {
    let mut rec = record(0x80, 0xAA);
    rec[0x7F] = 0x00;
    rec[0x7C] = 0x7F;
    let mut image = vec![0u8; 1024];
    place(&mut image, 220, &rec);

    let (out, stats) = carve(image, small_config());

    assert!(out.is_empty());
    assert_eq!(stats.rereads, 1);
    assert_eq!(stats.invalid_structure, 1);
}

#[test]
fn test_records_across_many_windows() {
    let offsets = [0usize, 100, 190, 254, 330, 508, 700, 1020, 1530, 2040, 3000, 4032];
    let mut image = vec![0u8; 4096];
    let mut expected = Vec::new();
    for (i, &off) in offsets.iter().enumerate() {
        let rec = record(0x40, 0x80 + i as u8);
        place(&mut image, off, &rec);
        expected.extend_from_slice(&rec);
    }

    let (out, stats) = carve(image, small_config());

    assert_eq!(out, expected);
    assert_eq!(stats.total_skipped(), 0);
    let found: Vec<u64> = stats.accepted.iter().map(|r| r.offset).collect();
    let wanted: Vec<u64> = offsets.iter().map(|&o| o as u64).collect();
    assert_eq!(found, wanted);
    assert_eq!(stats.windows, 16);
}

#[test]
fn test_adjacent_records_back_to_back() {
    let mut image = Vec::new();
    image.extend_from_slice(&record(0x40, 0x90));
    image.extend_from_slice(&record(0x50, 0x91));
    image.extend_from_slice(&record(0x38, 0x92));
    let expected = image.clone();

    let (out, stats) = carve(image, small_config());

    assert_eq!(out, expected);
    assert_eq!(stats.records_written(), 3);
}

#[test]
fn test_record_truncated_by_end_of_input() {
    let rec = record(0x60, 0xAA);
    let mut image = vec![0u8; 100];
    place(&mut image, 50, &rec[..50]);

    let (out, stats) = carve(image, small_config());

    assert!(out.is_empty());
    assert_eq!(stats.invalid_structure, 1);
}

fn bogus_span_image() -> (Vec<u8>, Vec<u8>) {
    // a plausible length whose span swallows a genuine record
    let genuine = record(0x40, 0xAA);
    let mut image = vec![0u8; 512];
    place(&mut image, 16, &0x70u32.to_le_bytes());
    place(&mut image, 20, b"LfLe");
    place(&mut image, 40, &genuine);
    (image, genuine)
}

#[test]
fn test_skip_span_policy_jumps_over_rejected_span() {
    let (image, _) = bogus_span_image();
    let (out, stats) = carve(image, small_config());

    assert!(out.is_empty());
    assert_eq!(stats.invalid_contents, 1);
    assert_eq!(stats.candidates, 1);
}

#[test]
fn test_next_byte_policy_finds_record_inside_rejected_span() {
    let (image, genuine) = bogus_span_image();
    let config = small_config().with_resume_policy(ResumePolicy::NextByte);
    let (out, stats) = carve(image, config);

    assert_eq!(out, genuine);
    assert_eq!(stats.invalid_contents, 1);
    assert_eq!(stats.accepted, vec![Record::new(40, 0x40)]);
}

#[test]
fn test_single_linear_pass_candidate_count() {
    let mut bad = record(0x60, 0x00);
    place(&mut bad, 0x28, b"LfLe");
    let good = record(0x40, 0xAA);
    let mut image = vec![0u8; 1024];
    place(&mut image, 16, &bad);
    place(&mut image, 200, &good);

    let locator = MagicLocator::new(b"LfLe");
    assert_eq!(locator.count_in(&image, usize::MAX), 3);

    let (out, stats) = carve(image.clone(), small_config());
    assert_eq!(out, good);
    // the embedded hit sits inside a classified span
    assert_eq!(stats.candidates, 2);
    assert_eq!(stats.invalid_contents, 1);

    let strict = small_config().with_resume_policy(ResumePolicy::NextByte);
    let (_, stats) = carve(image, strict);
    assert_eq!(stats.candidates, 3);
    assert_eq!(stats.too_small, 1);
}

#[test]
fn test_span_tail_is_not_rescanned_by_next_window() {
    // second magic sits in the next window's scan range but inside the
    // rejected span
    let mut bad = record(0x80, 0xAA);
    place(&mut bad, 0x70, b"LfLe");
    let mut image = vec![0u8; 1024];
    place(&mut image, 200, &bad);

    let (_, stats) = carve(image, small_config());

    assert_eq!(stats.invalid_contents, 1);
    assert_eq!(stats.candidates, 1);
}

#[test]
fn test_progress_callback() {
    let mut image = vec![0u8; 1000];
    place(&mut image, 300, &record(0x40, 0xAA));

    let calls = Cell::new(0u64);
    let last = Cell::new(0u64);
    let cb = |p: &ScanProgress| {
        calls.set(calls.get() + 1);
        last.set(p.scanned_bytes);
        assert!(p.percentage() <= 100.0);
    };

    let carver = Carver::new(small_config().with_progress(true)).unwrap();
    let outcome = carver
        .carve(&mut Cursor::new(image.clone()), Vec::new(), Some(&cb))
        .unwrap();
    assert_eq!(outcome.stats.windows, 4);
    assert_eq!(calls.get(), 4);
    assert_eq!(last.get(), 1000);

    calls.set(0);
    let quiet = Carver::new(small_config()).unwrap();
    quiet
        .carve(&mut Cursor::new(image), Vec::new(), Some(&cb))
        .unwrap();
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_invalid_config_rejected() {
    let config = ScanConfig::new().with_window_size(0x100);
    assert!(Carver::new(config).is_err());
}

/// Serves `data` until `bad_from`, then fails like a bad sector.
struct FailingSource {
    data: Vec<u8>,
    bad_from: u64,
}

impl BlockSource for FailingSource {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> lfle::Result<usize> {
        if offset >= self.bad_from {
            return Err(CarveError::Read {
                offset,
                source: io::Error::other("bad sector"),
            });
        }
        let end = (self.bad_from as usize).min(self.data.len());
        let start = (offset as usize).min(end);
        let n = buffer.len().min(end - start);
        buffer[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Accepts nothing, like a full disk.
#[derive(Debug)]
struct FullDisk;

impl Write for FullDisk {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("no space left on device"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_read_error_is_fatal() {
    let mut source = FailingSource {
        data: vec![0u8; 1024],
        bad_from: 64,
    };
    let carver = Carver::new(small_config()).unwrap();

    let err = carver.carve(&mut source, Vec::new(), None).unwrap_err();

    assert!(matches!(err, CarveError::Read { offset: 64, .. }));
}

#[test]
fn test_write_error_is_fatal() {
    let mut image = vec![0u8; 1024];
    place(&mut image, 0x40, &record(0x60, 0xAA));
    let carver = Carver::new(small_config()).unwrap();

    let err = carver
        .carve(&mut Cursor::new(image), FullDisk, None)
        .unwrap_err();

    assert!(matches!(err, CarveError::Io(_)));
}
