// tests/stream_tests.rs
use pdcstream_rs::*;
use std::fs;
use std::io::Cursor;
use std::num::NonZeroU8;
use std::sync::Arc;

fn setup_test_file(name: &str) -> String {
    fs::create_dir_all("test_output").unwrap();
    let path = format!("test_output/{}", name);
    fs::remove_file(&path).ok();
    path
}

fn cleanup_test_file(path: &str) {
    fs::remove_file(path).ok();
}

/// Configuration body used by these tests: nominal frame rate (u16) then revision (u8)
fn config_frame(rate: u16, revision: Revision) -> Vec<u8> {
    let mut body = rate.to_be_bytes().to_vec();
    body.extend_from_slice(&[revision.as_u8(), 0x00]);
    let header = DecodedHeader::configuration(body.len()).unwrap();
    build_frame(&header, &body, [0x00, 0x00]).unwrap().to_vec()
}

fn parse_config(frame: &Frame) -> (u16, Revision) {
    let rate = u16::from_be_bytes([frame.payload[0], frame.payload[1]]);
    let revision = Revision::from_u8(frame.payload[2]).unwrap();
    (rate, revision)
}

fn data_frame(packet: u8, second_of_century: u32, sample: i16) -> Vec<u8> {
    let header = DecodedHeader::data(NonZeroU8::new(packet).unwrap(), 8, second_of_century, sample, None).unwrap();
    let mut payload = encode_extended(&header).unwrap()[4..].to_vec();
    payload.extend_from_slice(&[0x12, 0x34]);
    build_frame(&header, &payload, [0x00, 0x00]).unwrap().to_vec()
}

fn recorded_session() -> Vec<u8> {
    let mut bytes = Vec::new();
    // a data frame arriving before any configuration
    bytes.extend(data_frame(1, 3_700_000_000, 3));
    bytes.extend(config_frame(30, Revision::Revision0));
    bytes.extend(data_frame(2, 3_700_000_000, 3));
    // line noise
    bytes.extend_from_slice(&[0x55, 0x55, 0xAA, 0x00, 0x00, 0x01]);
    // reconfiguration to revision 2 at 60 frames per second
    bytes.extend(config_frame(60, Revision::Revision2));
    bytes.extend(data_frame(3, 1_700_000_000, 6));
    bytes
}

fn check_session(frames: &[Frame]) {
    assert_eq!(frames.len(), 5);

    let early = &frames[0].header;
    assert!(early.is_provisional());
    assert_eq!(early.timestamp.unix_seconds(), 3_700_000_000 - 2_208_988_800);

    let rev0 = &frames[2].header;
    assert_eq!(rev0.timestamp_source, TimestampSource::TimeTag);
    assert_eq!(rev0.timestamp, early.timestamp.add_ticks(3 * 333_333));

    let rev2 = &frames[4].header;
    assert_eq!(rev2.timestamp.unix_seconds(), 1_700_000_000);
    assert_eq!(rev2.timestamp.subsec_nanos(), 99_999_600);
    assert_eq!(&frames[4].cell_data()[..], &[0x12, 0x34]);
}

#[test]
fn test_reader_tracks_reconfiguration() {
    let context = Arc::new(ContextCell::new());
    let mut reader = FrameReader::new(Cursor::new(recorded_session()), Arc::clone(&context));

    let mut frames = Vec::new();
    while let Some(frame) = reader.read_frame().unwrap() {
        if frame.kind() == FrameKind::ConfigurationFrame {
            let (rate, revision) = parse_config(&frame);
            context.update(rate, revision).unwrap();
        }
        frames.push(frame);
    }

    check_session(&frames);
    assert_eq!(context.load().unwrap().generation(), 1);
    assert_eq!(reader.assembler().discarded_bytes(), 6);
}

#[test]
fn test_capture_file_matches_reader() {
    let path = setup_test_file("session.pdc");
    fs::write(&path, recorded_session()).unwrap();

    let capture = CaptureFile::open(&path).unwrap();
    let context = ContextCell::new();
    let mut frames = Vec::new();
    for frame in capture.frames(&context) {
        if frame.kind() == FrameKind::ConfigurationFrame {
            let (rate, revision) = parse_config(&frame);
            context.update(rate, revision).unwrap();
        }
        frames.push(frame);
    }

    check_session(&frames);
    cleanup_test_file(&path);
}

#[test]
fn test_assembler_with_legacy_firmware() {
    // Legacy senders leave garbage in the high byte of the word count
    let mut bytes = data_frame(1, 1_000, 0);
    bytes[2] = 0xEE;

    let options = DecoderOptions::default().with_legacy_byte_count_quirk(true);
    let mut assembler = FrameAssembler::with_options(options);
    assembler.push(&bytes);

    let frame = assembler.next_frame(None, &NoChecksum).unwrap();
    assert_eq!(frame.header.word_count, 7);
    assert_eq!(frame.total_length(), 14);
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_async_reader_session() {
    let context = Arc::new(ContextCell::new());
    let session = recorded_session();
    let mut reader = AsyncFrameReader::new(session.as_slice(), Arc::clone(&context));

    let mut frames = Vec::new();
    while let Some(frame) = reader.read_frame().await.unwrap() {
        if frame.kind() == FrameKind::ConfigurationFrame {
            let (rate, revision) = parse_config(&frame);
            context.update(rate, revision).unwrap();
        }
        frames.push(frame);
    }

    check_session(&frames);
}
