//! Windows shell link (`.lnk`) files
//!
//! The target is the link's RelativePath string, or the LinkInfo local
//! base path when no relative path is recorded. A rewrite rebuilds only
//! the header flags and the StringData section; the ID list, LinkInfo and
//! extra data blocks are copied through byte for byte.

use super::{anchor, staging_path, ShortcutStore, ShortcutTarget};
use crate::error::{RelinkError, RelinkResult};
use async_trait::async_trait;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const HEADER_SIZE: usize = 0x4C;
const FLAGS_OFFSET: usize = 0x14;
const LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

const HAS_ID_LIST: u32 = 0x01;
const HAS_LINK_INFO: u32 = 0x02;
const HAS_NAME: u32 = 0x04;
const HAS_RELATIVE_PATH: u32 = 0x08;
const HAS_WORKING_DIR: u32 = 0x10;
const HAS_ARGUMENTS: u32 = 0x20;
const HAS_ICON_LOCATION: u32 = 0x40;
const IS_UNICODE: u32 = 0x80;

/// StringData entries, in file order
const STRING_FLAGS: [u32; 5] = [
    HAS_NAME,
    HAS_RELATIVE_PATH,
    HAS_WORKING_DIR,
    HAS_ARGUMENTS,
    HAS_ICON_LOCATION,
];
const RELATIVE_PATH: usize = 1;
const WORKING_DIR: usize = 2;

const LINK_INFO_MIN_HEADER: usize = 0x1C;
const LINK_INFO_UNICODE_HEADER: usize = 0x24;
const VOLUME_ID_AND_LOCAL_BASE_PATH: u32 = 0x01;

/// Shell links read and rewritten at the byte level
#[derive(Debug, Clone, Copy, Default)]
pub struct LnkStore;

#[async_trait]
impl ShortcutStore for LnkStore {
    async fn read(&self, path: &Path) -> RelinkResult<ShortcutTarget> {
        let link = load(path).await?;

        let target = match (&link.strings[RELATIVE_PATH], &link.local_base_path) {
            (Some(relative), _) => anchor(path, PathBuf::from(relative)),
            (None, Some(base)) => {
                debug!("{} has no relative path, using LinkInfo", path.display());
                PathBuf::from(base)
            }
            (None, None) => return Err(RelinkError::NotFileShortcut(path.to_path_buf())),
        };

        Ok(ShortcutTarget {
            target,
            working_dir: link.strings[WORKING_DIR].as_ref().map(PathBuf::from),
        })
    }

    /// Stage the rebuilt link next to the original and rename it over
    async fn write(&self, path: &Path, target: &ShortcutTarget) -> RelinkResult<()> {
        let link = load(path).await?;
        let updated = link
            .rewrite(target)
            .map_err(|reason| RelinkError::write(path, reason))?;

        let staging = staging_path(path)?;
        if let Err(e) = fs::write(&staging, &updated).await {
            let _ = fs::remove_file(&staging).await;
            return Err(RelinkError::write(path, e.to_string()));
        }
        if let Err(e) = fs::rename(&staging, path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(RelinkError::write(path, e.to_string()));
        }
        Ok(())
    }
}

async fn load(path: &Path) -> RelinkResult<ShellLinkFile> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| RelinkError::parse(path, e.to_string()))?;
    ShellLinkFile::parse(bytes).map_err(|reason| RelinkError::parse(path, reason))
}

/// A parsed link, keeping the raw bytes for rewriting
#[derive(Debug, Clone)]
struct ShellLinkFile {
    bytes: Vec<u8>,
    flags: u32,
    local_base_path: Option<String>,
    /// Decoded StringData, indexed like [`STRING_FLAGS`]
    strings: [Option<String>; 5],
    string_data: Range<usize>,
}

impl ShellLinkFile {
    fn parse(bytes: Vec<u8>) -> Result<Self, String> {
        if bytes.len() < HEADER_SIZE
            || le_u32(&bytes, 0) != Some(HEADER_SIZE as u32)
            || bytes[4..20] != LINK_CLSID
        {
            return Err("not a shell link".to_string());
        }
        let flags = le_u32(&bytes, FLAGS_OFFSET).unwrap_or_default();
        let mut cursor = Cursor {
            bytes: &bytes,
            pos: HEADER_SIZE,
        };

        if flags & HAS_ID_LIST != 0 {
            let size = cursor.u16("ID list size")?;
            cursor.take(usize::from(size), "ID list")?;
        }

        let mut local_base_path = None;
        if flags & HAS_LINK_INFO != 0 {
            let size = le_u32(&bytes, cursor.pos).ok_or("truncated LinkInfo")? as usize;
            if size < LINK_INFO_MIN_HEADER {
                return Err(format!("LinkInfo block too small ({} bytes)", size));
            }
            local_base_path = local_base_path_of(cursor.take(size, "LinkInfo")?);
        }

        let start = cursor.pos;
        let unicode = flags & IS_UNICODE != 0;
        let mut strings: [Option<String>; 5] = Default::default();
        for (slot, flag) in strings.iter_mut().zip(STRING_FLAGS) {
            if flags & flag == 0 {
                continue;
            }
            let count = usize::from(cursor.u16("string length")?);
            *slot = Some(if unicode {
                let units: Vec<u16> = cursor
                    .take(count * 2, "string data")?
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            } else {
                latin1(cursor.take(count, "string data")?)
            });
        }
        let string_data = start..cursor.pos;

        Ok(Self {
            bytes,
            flags,
            local_base_path,
            strings,
            string_data,
        })
    }

    /// Link bytes with the relative path and working directory replaced.
    ///
    /// StringData is always written as UTF-16 and the header's unicode
    /// flag is set, so ANSI links are converted on their first rewrite.
    fn rewrite(&self, target: &ShortcutTarget) -> Result<Vec<u8>, String> {
        let mut strings = self.strings.clone();
        strings[RELATIVE_PATH] = Some(target.target.to_string_lossy().into_owned());
        strings[WORKING_DIR] = target
            .working_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned());

        let mut flags = self.flags | IS_UNICODE;
        let mut out = Vec::with_capacity(self.bytes.len() + 256);
        out.extend_from_slice(&self.bytes[..self.string_data.start]);

        for (value, flag) in strings.iter().zip(STRING_FLAGS) {
            let Some(text) = value else {
                flags &= !flag;
                continue;
            };
            flags |= flag;
            let units: Vec<u16> = text.encode_utf16().collect();
            let count = u16::try_from(units.len())
                .map_err(|_| format!("string of {} characters is too long", units.len()))?;
            out.extend_from_slice(&count.to_le_bytes());
            for unit in units {
                out.extend_from_slice(&unit.to_le_bytes());
            }
        }

        out.extend_from_slice(&self.bytes[self.string_data.end..]);
        out[FLAGS_OFFSET..FLAGS_OFFSET + 4].copy_from_slice(&flags.to_le_bytes());
        Ok(out)
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| format!("truncated {}", what))?;
        let bytes = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self, what: &str) -> Result<u16, String> {
        let raw = self.take(2, what)?;
        Ok(u16::from_le_bytes([raw[0], raw[1]]))
    }
}

/// Local base path plus common path suffix, preferring the unicode copies
fn local_base_path_of(info: &[u8]) -> Option<String> {
    let header_size = le_u32(info, 4)? as usize;
    let flags = le_u32(info, 8)?;
    if flags & VOLUME_ID_AND_LOCAL_BASE_PATH == 0 {
        return None;
    }

    let unicode = if header_size >= LINK_INFO_UNICODE_HEADER {
        let base = le_u32(info, 0x1C).filter(|offset| *offset != 0);
        let suffix = le_u32(info, 0x20).filter(|offset| *offset != 0);
        base.and_then(|offset| utf16_cstr(info, offset as usize))
            .map(|base| {
                let suffix = suffix
                    .and_then(|offset| utf16_cstr(info, offset as usize))
                    .unwrap_or_default();
                base + &suffix
            })
    } else {
        None
    };

    let path = unicode.or_else(|| {
        let base = ansi_cstr(info, le_u32(info, 0x10)? as usize)?;
        let suffix = le_u32(info, 0x18)
            .and_then(|offset| ansi_cstr(info, offset as usize))
            .unwrap_or_default();
        Some(base + &suffix)
    })?;
    (!path.is_empty()).then_some(path)
}

fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn ansi_cstr(bytes: &[u8], at: usize) -> Option<String> {
    let rest = bytes.get(at..)?;
    let end = rest.iter().position(|b| *b == 0)?;
    Some(latin1(&rest[..end]))
}

fn utf16_cstr(bytes: &[u8], at: usize) -> Option<String> {
    let units: Vec<u16> = bytes
        .get(at..)?
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|unit| *unit != 0)
        .collect();
    Some(String::from_utf16_lossy(&units))
}

/// Single-byte strings are decoded as Latin-1
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}
