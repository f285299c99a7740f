//! Update and strip against real files.

use std::fs;
use std::path::Path;

use ntest::timeout;
use tag_file::{BasicTag, TagFile, TagKinds};
use tempfile::tempdir;

fn media() -> Vec<u8> {
    (0..4096u32).map(|i| (i % 253) as u8).collect()
}

fn write_media(path: &Path) {
    fs::write(path, media()).unwrap();
}

#[timeout(5000)]
#[test]
fn test_tag_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("track.mp3");
    write_media(&path);

    let mut tag = TagFile::new(BasicTag::new());
    assert_eq!(tag.link(&path, TagKinds::ALL)?, 0);
    tag.content_mut().frames = b"TIT2 frame body".to_vec();
    tag.content_mut().trailer.set_title("Round Trip")?;
    tag.content_mut().trailer.set_track(Some(3));
    assert_eq!(tag.update(TagKinds::ALL)?, TagKinds::ALL);

    let size = fs::metadata(&path)?.len();
    assert_eq!(size, 25 + 4096 + 128);

    let mut reread = TagFile::new(BasicTag::new());
    assert_eq!(reread.link(&path, TagKinds::ALL)?, 25);
    assert_eq!(reread.content().frames, b"TIT2 frame body");
    assert_eq!(reread.content().trailer.title(), "Round Trip");
    assert_eq!(reread.content().trailer.track(), Some(3));
    assert_eq!(reread.data_size(), 4096);
    Ok(())
}

#[timeout(5000)]
#[test]
fn test_growing_tag_leaves_no_temp_files() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("track.mp3");
    write_media(&path);

    let mut tag = TagFile::new(BasicTag::new());
    tag.link(&path, TagKinds::ALL)?;
    for len in [10usize, 500, 20] {
        tag.content_mut().frames = vec![b'x'; len];
        assert_eq!(tag.update(TagKinds::PREPENDED)?, TagKinds::PREPENDED);
        assert_eq!(tag.prepended_bytes(), len as u64 + 10);

        let contents = fs::read(&path)?;
        assert_eq!(&contents[len + 10..], media().as_slice());
    }

    let entries = fs::read_dir(dir.path())?.count();
    assert_eq!(entries, 1);
    Ok(())
}

#[timeout(5000)]
#[test]
fn test_strip_restores_media() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("track.mp3");
    write_media(&path);

    let mut tag = TagFile::new(BasicTag::with_frames(vec![1u8; 64]));
    tag.link(&path, TagKinds::ALL)?;
    tag.update(TagKinds::ALL)?;

    let mut relinked = TagFile::new(BasicTag::new());
    relinked.link(&path, TagKinds::ALL)?;
    assert!(relinked.has_tag_type(TagKinds::ALL));
    assert_eq!(relinked.strip(TagKinds::ALL)?, TagKinds::ALL);
    assert_eq!(fs::read(&path)?, media());
    assert_eq!(relinked.strip(TagKinds::ALL)?, TagKinds::empty());
    Ok(())
}

#[cfg(unix)]
#[timeout(5000)]
#[test]
fn test_rewrite_preserves_permissions() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    let path = dir.path().join("track.mp3");
    write_media(&path);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640))?;

    let mut tag = TagFile::new(BasicTag::with_frames(vec![2u8; 100]));
    tag.link(&path, TagKinds::PREPENDED)?;
    tag.update(TagKinds::PREPENDED)?;

    let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
    Ok(())
}

#[timeout(5000)]
#[test]
fn test_missing_file_is_created_on_update() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("new.mp3");

    let mut tag = TagFile::new(BasicTag::with_frames(vec![3u8; 40]));
    assert_eq!(tag.link(&path, TagKinds::ALL)?, 0);
    assert_eq!(tag.update(TagKinds::PREPENDED)?, TagKinds::PREPENDED);
    assert_eq!(fs::metadata(&path)?.len(), 50);
    Ok(())
}
