#[cfg(feature = "zstd-support")]
#[test]
fn zstd_entry_round_trip() {
    use m_zip::{CompressionMethod, ZipArchive, ZipEntry};

    let content = vec![42u8; 10_000];
    let mut archive = ZipArchive::new();
    archive.set_entry(ZipEntry::with_data(
        "test.bin",
        content.clone(),
        CompressionMethod::Zstd,
    ));

    let buffer = archive.to_buffer().unwrap();
    let reread = ZipArchive::from_buffer(buffer).unwrap();

    let entry = reread.entry("test.bin").unwrap();
    assert_eq!(entry.header().method, 93); // Zstd method
    // Verify compression actually happened
    assert!(entry.header().compressed_size < entry.header().size / 2);
    assert_eq!(entry.data().unwrap(), content);
}

#[cfg(feature = "zstd-support")]
#[test]
fn zstd_payload_survives_reassembly_untouched() {
    use m_zip::{CompressionMethod, ZipArchive, ZipEntry};

    let mut archive = ZipArchive::new();
    archive.set_entry(ZipEntry::with_data(
        "log.txt",
        b"zstd compressed entry payload".to_vec(),
        CompressionMethod::Zstd,
    ));

    let first = archive.to_buffer().unwrap();
    let mut reread = ZipArchive::from_buffer(first.clone()).unwrap();
    let second = reread.to_buffer().unwrap();
    assert_eq!(first, second);
}
