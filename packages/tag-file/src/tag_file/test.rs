//! Tests for the tag file engine, run against the in-memory filesystem.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use ntest::timeout;

use crate::config::TagFileConfig;
use crate::content::BasicTag;
use crate::error::TagError;
use crate::format::{PrependedHeader, TrailerFields, FOOTER_FLAG, TRAILER_LEN};
use crate::fs::{FileMode, FileSystem, MemoryFileSystem};
use crate::tag_file::{TagFile, TagKinds};

const SONG: &str = "/music/song.mp3";

fn engine(fs: &MemoryFileSystem) -> TagFile<BasicTag, MemoryFileSystem> {
    let config = TagFileConfig {
        copy_chunk_size: 64,
        retry_delay_ms: 0,
        ..Default::default()
    };
    TagFile::with_file_system(BasicTag::new(), fs.clone(), config).unwrap()
}

fn prepended(frames: &[u8]) -> Vec<u8> {
    let mut out = PrependedHeader::new(4, 0, frames.len())
        .unwrap()
        .render()
        .to_vec();
    out.extend_from_slice(frames);
    out
}

fn trailer(title: &str) -> Vec<u8> {
    let mut fields = TrailerFields::new();
    fields.set_title(title).unwrap();
    fields.render().to_vec()
}

fn media() -> Vec<u8> {
    (0..1000u32).map(|i| (i % 251) as u8).collect()
}

fn tagged_file(fs: &MemoryFileSystem, frames: &[u8], title: Option<&str>) -> Vec<u8> {
    let mut contents = prepended(frames);
    contents.extend(media());
    if let Some(title) = title {
        contents.extend(trailer(title));
    }
    fs.insert(SONG, contents.clone());
    contents
}

#[timeout(1000)]
#[test]
fn test_update_empty_file_prepends_payload() {
    let fs = MemoryFileSystem::new();
    fs.insert(SONG, Vec::new());
    let mut tag = engine(&fs);
    assert_eq!(tag.link(SONG, TagKinds::PREPENDED).unwrap(), 0);

    tag.content_mut().frames = vec![1u8; 40];
    assert_eq!(tag.update(TagKinds::PREPENDED).unwrap(), TagKinds::PREPENDED);
    assert_eq!(tag.prepended_bytes(), 50);
    assert_eq!(tag.file_size(), 50);
    assert_eq!(fs.contents(SONG).unwrap().len(), 50);

    let mut reread = engine(&fs);
    assert_eq!(reread.link(SONG, TagKinds::ALL).unwrap(), 50);
    assert_eq!(reread.content().frames, vec![1u8; 40]);
}

#[timeout(1000)]
#[test]
fn test_update_missing_file_creates_it() {
    let fs = MemoryFileSystem::new();
    let mut tag = engine(&fs);
    assert_eq!(tag.link("new.mp3", TagKinds::ALL).unwrap(), 0);
    assert!(!tag.has_tag_type(TagKinds::PREPENDED));

    tag.content_mut().frames = vec![2u8; 20];
    let written = tag.update(TagKinds::ALL).unwrap();
    assert_eq!(written, TagKinds::ALL);
    assert_eq!(tag.prepended_bytes(), 30);
    assert_eq!(tag.appended_bytes(), TRAILER_LEN as u64);
    assert_eq!(fs.contents("new.mp3").unwrap().len(), 30 + TRAILER_LEN);
    assert_eq!(tag.data_size(), 0);
}

#[timeout(1000)]
#[test]
fn test_update_adds_tag_before_media_data() {
    let fs = MemoryFileSystem::new();
    fs.insert(SONG, media());
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    tag.content_mut().frames = vec![3u8; 40];
    assert_eq!(tag.update(TagKinds::PREPENDED).unwrap(), TagKinds::PREPENDED);

    let contents = fs.contents(SONG).unwrap();
    assert_eq!(&contents[..50], prepended(&[3u8; 40]).as_slice());
    assert_eq!(&contents[50..], media().as_slice());
    assert_eq!(tag.file_size(), 1050);
    assert_eq!(tag.data_size(), 1000);
    assert_eq!(fs.paths(), vec![PathBuf::from(SONG)]);
}

#[timeout(1000)]
#[test]
fn test_update_same_size_writes_in_place() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[4u8; 40], None);
    let mut tag = engine(&fs);
    assert_eq!(tag.link(SONG, TagKinds::ALL).unwrap(), 50);

    // A rewrite would lose the file
    fs.set_fail_rename(true);
    tag.content_mut().frames = vec![5u8; 40];
    assert_eq!(tag.update(TagKinds::PREPENDED).unwrap(), TagKinds::PREPENDED);

    let contents = fs.contents(SONG).unwrap();
    assert_eq!(&contents[10..50], &[5u8; 40]);
    assert_eq!(&contents[50..], media().as_slice());
}

#[timeout(1000)]
#[test]
fn test_update_shrinking_tag_rewrites_file() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[6u8; 100], Some("Old"));
    let mut tag = engine(&fs);
    assert_eq!(tag.link(SONG, TagKinds::ALL).unwrap(), 110);

    tag.content_mut().frames = vec![7u8; 10];
    assert_eq!(tag.update(TagKinds::PREPENDED).unwrap(), TagKinds::PREPENDED);
    assert_eq!(tag.prepended_bytes(), 20);
    assert_eq!(tag.appended_bytes(), TRAILER_LEN as u64);

    let mut expected = prepended(&[7u8; 10]);
    expected.extend(media());
    expected.extend(trailer("Old"));
    assert_eq!(fs.contents(SONG).unwrap(), expected);
}

#[timeout(1000)]
#[test]
fn test_trailer_appended_once_then_overwritten() {
    let fs = MemoryFileSystem::new();
    fs.insert(SONG, media());
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    tag.content_mut().trailer.set_title("First").unwrap();
    assert_eq!(tag.update(TagKinds::APPENDED).unwrap(), TagKinds::APPENDED);
    assert_eq!(tag.file_size(), 1128);
    assert_eq!(tag.appended_bytes(), 128);

    tag.content_mut().trailer.set_title("Second").unwrap();
    assert_eq!(tag.update(TagKinds::APPENDED).unwrap(), TagKinds::APPENDED);
    assert_eq!(tag.file_size(), 1128);
    assert_eq!(tag.appended_bytes(), 128);

    let contents = fs.contents(SONG).unwrap();
    assert_eq!(&contents[1000..], trailer("Second").as_slice());
}

#[timeout(1000)]
#[test]
fn test_unparsed_trailer_is_overwritten_not_duplicated() {
    let fs = MemoryFileSystem::new();
    let original = tagged_file(&fs, &[1u8; 10], Some("Kept"));
    let mut tag = engine(&fs);
    tag.link_with_options(SONG, false).unwrap();
    assert_eq!(tag.appended_bytes(), 0);

    assert_eq!(tag.update(TagKinds::APPENDED).unwrap(), TagKinds::APPENDED);
    assert_eq!(tag.file_size(), original.len() as u64);
    assert_eq!(tag.appended_bytes(), 128);
}

#[timeout(1000)]
#[test]
fn test_clean_tags_are_not_rewritten() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[1u8; 10], Some("Title"));
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();
    assert!(tag.has_changed());

    assert_eq!(tag.update(TagKinds::ALL).unwrap(), TagKinds::ALL);
    assert!(!tag.has_changed());
    assert_eq!(tag.update(TagKinds::ALL).unwrap(), TagKinds::empty());
}

#[timeout(1000)]
#[test]
fn test_strip_appended_truncates_trailer() {
    let fs = MemoryFileSystem::new();
    let original = tagged_file(&fs, &[1u8; 10], Some("Gone"));
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    assert_eq!(tag.strip(TagKinds::APPENDED).unwrap(), TagKinds::APPENDED);
    assert_eq!(tag.file_size(), original.len() as u64 - 128);
    assert_eq!(
        fs.contents(SONG).unwrap(),
        &original[..original.len() - TRAILER_LEN]
    );
    assert!(!tag.has_tag_type(TagKinds::APPENDED));
    assert!(tag.has_tag_type(TagKinds::PREPENDED));
}

#[timeout(1000)]
#[test]
fn test_strip_is_idempotent() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[1u8; 10], Some("Gone"));
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    assert_eq!(tag.strip(TagKinds::ALL).unwrap(), TagKinds::ALL);
    assert_eq!(fs.contents(SONG).unwrap(), media());

    assert_eq!(tag.strip(TagKinds::ALL).unwrap(), TagKinds::empty());
    assert_eq!(tag.strip(TagKinds::ALL).unwrap(), TagKinds::empty());
    assert_eq!(fs.contents(SONG).unwrap(), media());
    assert_eq!(tag.file_size(), 1000);
}

#[timeout(1000)]
#[test]
fn test_strip_prepended_keeps_trailer() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[1u8; 10], Some("Stay"));
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    assert_eq!(tag.strip(TagKinds::PREPENDED).unwrap(), TagKinds::PREPENDED);
    let mut expected = media();
    expected.extend(trailer("Stay"));
    assert_eq!(fs.contents(SONG).unwrap(), expected);
    assert_eq!(tag.appended_bytes(), 128);

    assert_eq!(tag.strip(TagKinds::APPENDED).unwrap(), TagKinds::APPENDED);
    assert_eq!(fs.contents(SONG).unwrap(), media());
}

#[timeout(1000)]
#[test]
fn test_disk_full_rewrite_in_update_is_tolerated() {
    let fs = MemoryFileSystem::new();
    fs.insert(SONG, media());
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    tag.content_mut().frames = vec![1u8; 40];
    fs.set_write_budget(Some(100));
    assert_eq!(tag.update(TagKinds::PREPENDED).unwrap(), TagKinds::empty());
    assert_eq!(tag.prepended_bytes(), 0);
    assert_eq!(fs.contents(SONG).unwrap(), media());
    assert_eq!(fs.paths(), vec![PathBuf::from(SONG)]);
}

#[timeout(1000)]
#[test]
fn test_disk_full_strip_leaves_original_untouched() {
    let fs = MemoryFileSystem::new();
    let original = tagged_file(&fs, &[1u8; 10], None);
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    fs.set_write_budget(Some(10));
    let err = tag.strip(TagKinds::PREPENDED).unwrap_err();
    assert!(matches!(err, TagError::DiskFull(_)));
    assert_eq!(fs.contents(SONG).unwrap(), original);
    assert_eq!(tag.prepended_bytes(), 20);
    assert_eq!(fs.paths(), vec![PathBuf::from(SONG)]);
}

#[timeout(1000)]
#[test]
fn test_truncate_failure_keeps_counters() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[1u8; 10], Some("Title"));
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    fs.set_fail_truncate(true);
    assert!(matches!(
        tag.strip(TagKinds::APPENDED),
        Err(TagError::IoError(_))
    ));
    assert_eq!(tag.appended_bytes(), 128);
    assert!(tag.has_tag_type(TagKinds::APPENDED));
}

#[timeout(1000)]
#[test]
fn test_read_only_file_fails_update() {
    let fs = MemoryFileSystem::new();
    let original = tagged_file(&fs, &[1u8; 10], None);
    fs.set_mode(Path::new(SONG), FileMode(0o444)).unwrap();
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    tag.content_mut().frames = vec![9u8; 30];
    assert!(matches!(
        tag.update(TagKinds::ALL),
        Err(TagError::ReadOnly(_))
    ));
    assert_eq!(fs.contents(SONG).unwrap(), original);
}

#[timeout(1000)]
#[test]
fn test_rename_failure_after_delete_reports_success() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[1u8; 10], None);
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();

    fs.set_fail_rename(true);
    assert_eq!(tag.strip(TagKinds::PREPENDED).unwrap(), TagKinds::PREPENDED);
    assert!(!fs.exists(Path::new(SONG)));

    let paths = fs.paths();
    assert_eq!(paths.len(), 1);
    assert_eq!(fs.contents(&paths[0]).unwrap(), media());
}

#[timeout(1000)]
#[test]
fn test_stream_link_cannot_write() {
    let mut bytes = prepended(&[1u8; 10]);
    bytes.extend(media());
    bytes.extend(trailer("Stream"));

    let mut tag = TagFile::new(BasicTag::new());
    assert_eq!(
        tag.link_reader(Cursor::new(bytes), TagKinds::ALL).unwrap(),
        20
    );
    assert_eq!(tag.appended_bytes(), 128);
    assert_eq!(tag.content().trailer.title(), "Stream");
    assert_eq!(tag.file_name(), None);

    assert!(matches!(tag.update(TagKinds::ALL), Err(TagError::NotLinked)));
    assert!(matches!(tag.strip(TagKinds::ALL), Err(TagError::NotLinked)));
}

#[timeout(1000)]
#[test]
fn test_footer_is_part_of_prepended_region() {
    let fs = MemoryFileSystem::new();
    let mut header = PrependedHeader::new(4, 0, 10).unwrap();
    header.flags = FOOTER_FLAG;
    let mut contents = header.render().to_vec();
    contents.extend([0u8; 10]);
    contents.extend(b"3DI\x04\x00\x10\x00\x00\x00\x0a");
    contents.extend(media());
    fs.insert(SONG, contents);

    let mut tag = engine(&fs);
    assert_eq!(tag.link(SONG, TagKinds::ALL).unwrap(), 30);
    assert_eq!(tag.data_size(), 1000);
}

#[timeout(1000)]
#[test]
fn test_marker_inside_prepended_tag_is_ignored() {
    let fs = MemoryFileSystem::new();
    let mut frames = vec![0u8; 200];
    frames[62..65].copy_from_slice(b"TAG");
    fs.insert(SONG, prepended(&frames));

    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();
    assert_eq!(tag.prepended_bytes(), 210);
    assert_eq!(tag.appended_bytes(), 0);
}

#[timeout(1000)]
#[test]
fn test_invalid_config_is_rejected() {
    let config = TagFileConfig {
        copy_chunk_size: 0,
        ..Default::default()
    };
    let result = TagFile::with_file_system(BasicTag::new(), MemoryFileSystem::new(), config);
    assert!(matches!(result, Err(TagError::InvalidConfig(_))));
}

#[timeout(1000)]
#[test]
fn test_strip_marks_tag_changed() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[1u8; 10], Some("Title"));
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();
    tag.update(TagKinds::ALL).unwrap();
    assert!(!tag.has_changed());

    assert_eq!(tag.strip(TagKinds::ALL).unwrap(), TagKinds::ALL);
    assert!(tag.has_changed());

    // Writing the content back restores both tags
    assert_eq!(tag.update(TagKinds::ALL).unwrap(), TagKinds::ALL);
    assert!(!tag.has_changed());
    assert_eq!(tag.prepended_bytes(), 20);
    assert_eq!(tag.appended_bytes(), 128);
}

#[timeout(1000)]
#[test]
fn test_strip_of_nothing_leaves_tag_clean() {
    let fs = MemoryFileSystem::new();
    fs.insert(SONG, media());
    let mut tag = engine(&fs);
    tag.link(SONG, TagKinds::ALL).unwrap();
    tag.update(TagKinds::empty()).unwrap();
    assert!(!tag.has_changed());

    assert_eq!(tag.strip(TagKinds::ALL).unwrap(), TagKinds::empty());
    assert!(!tag.has_changed());
}

#[timeout(1000)]
#[test]
fn test_empty_prepended_content_is_not_reported_written() {
    let fs = MemoryFileSystem::new();
    tagged_file(&fs, &[1u8; 10], None);
    let mut tag = engine(&fs);
    assert_eq!(tag.link(SONG, TagKinds::ALL).unwrap(), 20);

    tag.content_mut().frames.clear();
    assert_eq!(tag.update(TagKinds::PREPENDED).unwrap(), TagKinds::empty());
    assert_eq!(tag.prepended_bytes(), 0);
    assert!(!tag.has_tag_type(TagKinds::PREPENDED));
    assert_eq!(fs.contents(SONG).unwrap(), media());
}
