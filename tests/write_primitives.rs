//! Writing through growable handles, checked by reading back.

mod common;

use common::{Fixture, WINDOW_SIZES, all_handles};
use locio::{AccessMode, ErrorKind, Handle, Location, HandleConfig};

#[tokio::test]
async fn floats_round_trip_in_sequence() {
    let values = [0.0f32, 1.0, -1.0, 3.1415927, f32::MAX, f32::NEG_INFINITY];
    for Fixture { mut handle, label, .. } in all_handles(&[0u8; 28], AccessMode::ReadWrite).await {
        for value in values {
            handle.write_f32(value).await.unwrap();
        }
        handle.write_f32(f32::NAN).await.unwrap();
        assert_eq!(handle.length(), 28, "{label}");

        handle.seek(0);
        for value in values {
            assert_eq!(handle.read_f32().await.unwrap(), value, "{label}");
        }
        assert!(handle.read_f32().await.unwrap().is_nan(), "{label}");
        handle.close().await.unwrap();
    }
}

#[tokio::test]
async fn floats_written_after_seeking_forward() {
    for Fixture { mut handle, label, .. } in all_handles(&[0u8; 28], AccessMode::ReadWrite).await {
        handle.seek(8);
        handle.write_f32(-1.0).await.unwrap();
        handle.write_f32(3.1415927).await.unwrap();
        handle.seek(8);
        assert_eq!(handle.read_f32().await.unwrap(), -1.0, "{label}");
        assert_eq!(handle.read_f32().await.unwrap(), 3.1415927, "{label}");
        handle.seek(0);
        assert_eq!(handle.read_f64().await.unwrap(), 0.0, "{label}");
        handle.close().await.unwrap();
    }
}

#[tokio::test]
async fn overwrite_after_reading_back() {
    for Fixture { mut handle, label, .. } in all_handles(&[0u8; 28], AccessMode::ReadWrite).await {
        handle.write_f32(0.0).await.unwrap();
        handle.write_f32(1.0).await.unwrap();
        handle.seek(0);
        assert_eq!(handle.read_f32().await.unwrap(), 0.0, "{label}");
        assert_eq!(handle.read_f32().await.unwrap(), 1.0, "{label}");

        handle.seek(0);
        handle.write_f32(-1.0).await.unwrap();
        handle.write_f32(3.1415927).await.unwrap();
        handle.seek(0);
        assert_eq!(handle.read_f32().await.unwrap(), -1.0, "{label}");
        assert_eq!(handle.read_f32().await.unwrap(), 3.1415927, "{label}");
        handle.close().await.unwrap();
    }
}

#[tokio::test]
async fn chars_grow_an_empty_store() {
    for Fixture { mut handle, label, .. } in all_handles(&[], AccessMode::ReadWrite).await {
        handle.write_chars("ab").await.unwrap();
        assert_eq!(handle.file_pointer(), 4, "{label}");
        assert_eq!(handle.length(), 4, "{label}");

        handle.seek(0);
        let mut bytes = [0u8; 4];
        handle.read_exact(&mut bytes).await.unwrap();
        assert_eq!(bytes, [0x00, 0x61, 0x00, 0x62], "{label}");

        handle.write_chars("wx").await.unwrap();
        assert_eq!(handle.length(), 8, "{label}");
        assert_eq!(handle.file_pointer(), 8, "{label}");
        handle.seek(4);
        assert_eq!(handle.read_char_unit().await.unwrap(), u16::from(b'w'), "{label}");
        assert_eq!(handle.read_char_unit().await.unwrap(), u16::from(b'x'), "{label}");
        handle.close().await.unwrap();
    }
}

#[tokio::test]
async fn chars_sequentially_fill_a_page() {
    for Fixture { mut handle, label, .. } in all_handles(&[0u8; 16], AccessMode::ReadWrite).await {
        for pair in ["ab", "cd", "ef", "gh"] {
            handle.write_chars(pair).await.unwrap();
        }
        assert_eq!(handle.length(), 16, "{label}");
        handle.seek(0);
        for c in b'a'..=b'h' {
            assert_eq!(handle.read_u8().await.unwrap(), 0, "{label}");
            assert_eq!(handle.read_u8().await.unwrap(), c, "{label}");
        }
        handle.close().await.unwrap();
    }
}

#[tokio::test]
async fn chars_twice_off_the_end() {
    for Fixture { mut handle, label, .. } in all_handles(&[0u8; 16], AccessMode::ReadWrite).await {
        handle.seek(16);
        handle.write_chars("wx").await.unwrap();
        assert_eq!(handle.file_pointer(), 20, "{label}");
        assert_eq!(handle.length(), 20, "{label}");
        handle.write_chars("yz").await.unwrap();
        assert_eq!(handle.file_pointer(), 24, "{label}");
        assert_eq!(handle.length(), 24, "{label}");

        handle.seek(16);
        for c in [b'w', b'x', b'y', b'z'] {
            assert_eq!(handle.read_u8().await.unwrap(), 0, "{label}");
            assert_eq!(handle.read_u8().await.unwrap(), c, "{label}");
        }
        handle.close().await.unwrap();
    }
}

#[tokio::test]
async fn chars_encode_utf16_units() {
    let mut handle = Handle::from_bytes(Vec::new(), AccessMode::ReadWrite, 4);
    handle.write_chars("é€").await.unwrap();
    handle.write_bytes_str("hi").await.unwrap();
    handle.write_char_unit(0xD83D).await.unwrap();
    handle.flush().await.unwrap();
    assert_eq!(
        handle.store().as_bytes(),
        &[0x00, 0xE9, 0x20, 0xAC, b'h', b'i', 0xD8, 0x3D]
    );
}

// A write that starts beyond the current length is assumed to zero-fill the
// gap; the sequences above only ever append at the end.
#[tokio::test]
async fn gap_before_a_far_write_reads_as_zeros() {
    for Fixture { mut handle, label, .. } in all_handles(&[0xAAu8; 4], AccessMode::ReadWrite).await {
        handle.seek(12);
        handle.write_i32(0x01020304).await.unwrap();
        assert_eq!(handle.length(), 16, "{label}");

        handle.seek(0);
        assert_eq!(handle.read_u32().await.unwrap(), 0xAAAAAAAA, "{label}");
        let mut gap = [0xFFu8; 8];
        handle.read_exact(&mut gap).await.unwrap();
        assert_eq!(gap, [0; 8], "{label}");
        assert_eq!(handle.read_i32().await.unwrap(), 0x01020304, "{label}");
        handle.close().await.unwrap();
    }
}

#[tokio::test]
async fn every_integer_width_round_trips() {
    for Fixture { mut handle, label, .. } in all_handles(&[], AccessMode::ReadWrite).await {
        handle.write_bool(true).await.unwrap();
        handle.write_i8(-3).await.unwrap();
        handle.write_i16(-300).await.unwrap();
        handle.write_u16(65000).await.unwrap();
        handle.write_i32(-70000).await.unwrap();
        handle.write_u32(4_000_000_000).await.unwrap();
        handle.write_i64(i64::MIN).await.unwrap();
        handle.write_u64(u64::MAX).await.unwrap();
        handle.write_f64(std::f64::consts::E).await.unwrap();
        assert_eq!(handle.length(), 1 + 1 + 2 + 2 + 4 + 4 + 8 + 8 + 8, "{label}");

        handle.seek(0);
        assert!(handle.read_bool().await.unwrap(), "{label}");
        assert_eq!(handle.read_i8().await.unwrap(), -3, "{label}");
        assert_eq!(handle.read_i16().await.unwrap(), -300, "{label}");
        assert_eq!(handle.read_u16().await.unwrap(), 65000, "{label}");
        assert_eq!(handle.read_i32().await.unwrap(), -70000, "{label}");
        assert_eq!(handle.read_u32().await.unwrap(), 4_000_000_000, "{label}");
        assert_eq!(handle.read_i64().await.unwrap(), i64::MIN, "{label}");
        assert_eq!(handle.read_u64().await.unwrap(), u64::MAX, "{label}");
        assert_eq!(handle.read_f64().await.unwrap(), std::f64::consts::E, "{label}");
        handle.close().await.unwrap();
    }
}

#[tokio::test]
async fn read_only_handles_reject_every_write() {
    for Fixture { mut handle, label, .. } in all_handles(&[0u8; 8], AccessMode::Read).await {
        assert!(!handle.is_writable(), "{label}");
        let err = handle.write_u8(1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported, "{label}");
        let err = handle.write_chars("ab").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported, "{label}");
        assert_eq!(handle.length(), 8, "{label}");
        assert_eq!(handle.read_i64().await.unwrap(), 0, "{label}");
    }
}

#[tokio::test]
async fn close_persists_staged_bytes_to_disk() {
    for &window in WINDOW_SIZES {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let config = HandleConfig::default()
            .with_window_size(window)
            .with_mode(AccessMode::ReadWrite);

        let mut handle = Location::from_path(&path).open(&config).await.unwrap();
        handle.write_chars("ab").await.unwrap();
        handle.write_u16(0xCAFE).await.unwrap();
        handle.close().await.unwrap();

        assert_eq!(
            std::fs::read(&path).unwrap(),
            vec![0x00, 0x61, 0x00, 0x62, 0xCA, 0xFE],
            "window={window}"
        );
    }
}

#[tokio::test]
async fn flush_makes_writes_visible_to_a_second_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.bin");

    let mut writer = Handle::open_file(&path, AccessMode::ReadWrite, 1024).unwrap();
    writer.write_i32(42).await.unwrap();
    writer.write_chars("ok").await.unwrap();

    let reader = Handle::open_file(&path, AccessMode::Read, 1024).unwrap();
    assert_eq!(reader.length(), 0, "nothing reaches disk before a flush");

    writer.flush().await.unwrap();
    let mut reader = Handle::open_file(&path, AccessMode::Read, 1024).unwrap();
    assert_eq!(reader.length(), 8);
    assert_eq!(reader.read_i32().await.unwrap(), 42);
    assert_eq!(reader.read_string(4).await.unwrap(), "\0o\0k");
    writer.close().await.unwrap();
}
