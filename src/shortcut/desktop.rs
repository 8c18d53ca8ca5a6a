//! freedesktop.org desktop entries (`.desktop`)
//!
//! Only the `[Desktop Entry]` group is interpreted. The target is taken
//! from, in order:
//! 1. `URL=file://...` of a `Type=Link` entry
//! 2. the program token of `Exec`, when it is a path
//! 3. `TryExec`, when it is a path
//!
//! Rewrites touch only the lines holding the target and `Path`; every
//! other line is written back unchanged, line endings included.

use super::{anchor, ShortcutStore, ShortcutTarget};
use crate::error::{RelinkError, RelinkResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

const MAIN_GROUP: &str = "[Desktop Entry]";

/// Desktop entries read and rewritten as text
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopStore;

#[async_trait]
impl ShortcutStore for DesktopStore {
    async fn read(&self, path: &Path) -> RelinkResult<ShortcutTarget> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RelinkError::io(format!("reading {}", path.display()), e))?;

        let entry = DesktopEntry::parse(&content).map_err(|reason| RelinkError::parse(path, reason))?;
        let target = entry
            .target()
            .ok_or_else(|| RelinkError::NotFileShortcut(path.to_path_buf()))?;

        Ok(ShortcutTarget {
            target: anchor(path, PathBuf::from(target.value)),
            working_dir: entry.path.map(|field| PathBuf::from(field.value)),
        })
    }

    async fn write(&self, path: &Path, target: &ShortcutTarget) -> RelinkResult<()> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RelinkError::io(format!("reading {}", path.display()), e))?;

        let updated = rewrite(&content, target).map_err(|reason| RelinkError::write(path, reason))?;

        fs::write(path, updated)
            .await
            .map_err(|e| RelinkError::write(path, e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKey {
    Url,
    Exec,
    TryExec,
}

/// A key's value as located in the file
#[derive(Debug, Clone)]
struct Field {
    line: usize,
    /// Byte offset of the value within the line body
    start: usize,
    value: String,
}

/// Program path found in `Exec`, with where its token ends in the value
#[derive(Debug, Clone)]
struct ExecField {
    field: Field,
    program: String,
    token_end: usize,
}

#[derive(Debug, Clone)]
struct Target {
    key: TargetKey,
    value: String,
}

#[derive(Debug, Default)]
struct DesktopEntry {
    kind: Option<String>,
    url: Option<Field>,
    exec: Option<ExecField>,
    try_exec: Option<Field>,
    path: Option<Field>,
    /// Last non-blank line of the main group
    group_last: usize,
}

impl DesktopEntry {
    fn parse(content: &str) -> Result<Self, String> {
        let mut entry = Self::default();
        let mut in_group = false;
        let mut seen_group = false;

        for (line, raw) in content.split_inclusive('\n').enumerate() {
            let body = line_body(raw);
            let trimmed = body.trim();

            if trimmed.starts_with('[') {
                in_group = trimmed == MAIN_GROUP;
                if in_group {
                    seen_group = true;
                    entry.group_last = line;
                }
                continue;
            }
            if !in_group || trimmed.is_empty() {
                continue;
            }
            entry.group_last = line;
            if trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = body.split_once('=') else {
                continue;
            };
            let leading = value.len() - value.trim_start().len();
            let field = Field {
                line,
                start: body.len() - value.len() + leading,
                value: value.trim().to_string(),
            };

            match key.trim() {
                "Type" => entry.kind = Some(field.value),
                "URL" => entry.url = Some(field),
                "TryExec" => entry.try_exec = Some(field),
                "Path" => entry.path = Some(field),
                "Exec" => {
                    let (program, token_end) = first_token(&field.value);
                    entry.exec = Some(ExecField {
                        field,
                        program,
                        token_end,
                    });
                }
                _ => {}
            }
        }

        if !seen_group {
            return Err(format!("missing {} group", MAIN_GROUP));
        }
        Ok(entry)
    }

    fn target(&self) -> Option<Target> {
        if self.kind.as_deref() == Some("Link") {
            let url = self.url.as_ref()?;
            return file_url_path(&url.value).map(|value| Target {
                key: TargetKey::Url,
                value,
            });
        }
        if let Some(exec) = &self.exec {
            if is_path_like(&exec.program) {
                return Some(Target {
                    key: TargetKey::Exec,
                    value: exec.program.clone(),
                });
            }
        }
        self.try_exec
            .as_ref()
            .filter(|field| is_path_like(&field.value))
            .map(|field| Target {
                key: TargetKey::TryExec,
                value: field.value.clone(),
            })
    }
}

/// Rewrite the entry in `content` to point at `target`
fn rewrite(content: &str, target: &ShortcutTarget) -> Result<String, String> {
    let entry = DesktopEntry::parse(content)?;
    let current = entry
        .target()
        .ok_or_else(|| "entry does not reference a file".to_string())?;
    let new_path = target.target.to_string_lossy().into_owned();

    let mut lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();

    match current.key {
        TargetKey::Url => {
            if let Some(url) = &entry.url {
                replace_value(&mut lines, url, &file_url(&new_path));
            }
        }
        TargetKey::Exec | TargetKey::TryExec => {
            if let Some(exec) = entry.exec.as_ref().filter(|e| e.program == current.value) {
                let rest = &exec.field.value[exec.token_end..];
                let value = format!("{}{}", quote_program(&new_path), rest);
                replace_value(&mut lines, &exec.field, &value);
            }
            if let Some(try_exec) = entry.try_exec.as_ref().filter(|f| f.value == current.value) {
                replace_value(&mut lines, try_exec, &new_path);
            }

            if let Some(dir) = &target.working_dir {
                let dir = dir.to_string_lossy();
                match &entry.path {
                    Some(path) => replace_value(&mut lines, path, &dir),
                    None => insert_after(&mut lines, entry.group_last, &format!("Path={}", dir)),
                }
            }
        }
    }

    Ok(lines.concat())
}

/// Line without its `\n` / `\r\n` terminator
fn line_body(raw: &str) -> &str {
    raw.trim_end_matches(['\n', '\r'])
}

fn replace_value(lines: &mut [String], field: &Field, value: &str) {
    let raw = &lines[field.line];
    let body = line_body(raw);
    let terminator = &raw[body.len()..];
    let updated = format!("{}{}{}", &body[..field.start], value, terminator);
    lines[field.line] = updated;
}

fn insert_after(lines: &mut Vec<String>, index: usize, body: &str) {
    if !lines[index].ends_with('\n') {
        lines[index].push('\n');
    }
    lines.insert(index + 1, format!("{}\n", body));
}

/// First word of an `Exec` value, unquoted, and the byte offset after it
fn first_token(value: &str) -> (String, usize) {
    let mut chars = value.char_indices();
    if value.starts_with('"') {
        chars.next();
        let mut token = String::new();
        let mut escaped = false;
        for (i, c) in chars {
            if escaped {
                token.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                return (token, i + 1);
            } else {
                token.push(c);
            }
        }
        // unterminated quote: everything after it is the program
        return (token, value.len());
    }

    let end = value.find(char::is_whitespace).unwrap_or(value.len());
    (value[..end].to_string(), end)
}

/// Quote a program path for `Exec` when it contains reserved characters
fn quote_program(program: &str) -> String {
    let reserved = |c: char| c.is_whitespace() || "\"'\\><~|&;$*?#()`".contains(c);
    if !program.contains(reserved) {
        return program.to_string();
    }
    let mut quoted = String::with_capacity(program.len() + 2);
    quoted.push('"');
    for c in program.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn is_path_like(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}

/// Local path of a `file://` URL, percent-decoded
fn file_url_path(url: &str) -> Option<String> {
    let rest = url.strip_prefix("file://")?;
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);
    Some(percent_decode(rest))
}

fn file_url(path: &str) -> String {
    let mut url = String::from("file://");
    for b in path.bytes() {
        match b {
            b'%' | b' ' | b'#' | b'?' => url.push_str(&format!("%{:02X}", b)),
            _ if b.is_ascii() => url.push(b as char),
            _ => url.push_str(&format!("%{:02X}", b)),
        }
    }
    url
}

fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(value) = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const APP: &str = "\
[Desktop Entry]
Name=Tool
Exec=/opt/old/tool.sh --fast %U
TryExec=/opt/old/tool.sh
Type=Application

[Desktop Action New]
Exec=/opt/old/tool.sh --new
";

    #[test]
    fn exec_program_is_the_target() {
        let entry = DesktopEntry::parse(APP).unwrap();
        let target = entry.target().unwrap();
        assert_eq!(target.key, TargetKey::Exec);
        assert_eq!(target.value, "/opt/old/tool.sh");
    }

    #[test]
    fn bare_command_is_not_a_file_target() {
        let content = "[Desktop Entry]\nExec=firefox %u\nType=Application\n";
        assert!(DesktopEntry::parse(content).unwrap().target().is_none());
    }

    #[tokio::test]
    async fn launchers_and_web_links_are_not_file_shortcuts() {
        let temp = TempDir::new().unwrap();
        let launcher = temp.path().join("firefox.desktop");
        let web = temp.path().join("site.desktop");
        std::fs::write(&launcher, "[Desktop Entry]\nType=Application\nExec=firefox %u\n").unwrap();
        std::fs::write(&web, "[Desktop Entry]\nType=Link\nURL=https://example.com\n").unwrap();

        for path in [launcher, web] {
            let err = DesktopStore.read(&path).await.unwrap_err();
            assert!(matches!(err, RelinkError::NotFileShortcut(p) if p == path));
        }
    }

    #[test]
    fn missing_group_is_rejected() {
        assert!(DesktopEntry::parse("Exec=/bin/true\n").is_err());
    }

    #[test]
    fn quoted_exec_program() {
        let (program, end) = first_token(r#""/opt/My Apps/run me" --flag"#);
        assert_eq!(program, "/opt/My Apps/run me");
        assert_eq!(end, 21);
    }

    #[test]
    fn rewrite_exec_keeps_arguments_and_other_groups() {
        let target = ShortcutTarget::relocated(Path::new("/mnt/new/tool.sh"));
        let updated = rewrite(APP, &target).unwrap();

        assert!(updated.contains("Exec=/mnt/new/tool.sh --fast %U\n"));
        assert!(updated.contains("TryExec=/mnt/new/tool.sh\n"));
        assert!(updated.contains("Type=Application\nPath=/mnt/new\n"));
        // secondary groups are left alone
        assert!(updated.contains("[Desktop Action New]\nExec=/opt/old/tool.sh --new\n"));
    }

    #[test]
    fn rewrite_quotes_paths_with_spaces() {
        let target = ShortcutTarget::relocated(Path::new("/mnt/My Disk/tool.sh"));
        let updated = rewrite(APP, &target).unwrap();
        assert!(updated.contains("Exec=\"/mnt/My Disk/tool.sh\" --fast %U\n"));
    }

    #[test]
    fn rewrite_replaces_existing_path_and_keeps_crlf() {
        let content = "[Desktop Entry]\r\nExec = /old/run.sh\r\nPath=/old\r\n";
        let target = ShortcutTarget::relocated(Path::new("/new/run.sh"));
        let updated = rewrite(content, &target).unwrap();
        assert_eq!(
            updated,
            "[Desktop Entry]\r\nExec = /new/run.sh\r\nPath=/new\r\n"
        );
    }

    #[test]
    fn rewrite_link_url() {
        let content = "[Desktop Entry]\nType=Link\nURL=file:///home/me/Old%20Docs/plan.pdf\n";
        let entry = DesktopEntry::parse(content).unwrap();
        assert_eq!(entry.target().unwrap().value, "/home/me/Old Docs/plan.pdf");

        let target = ShortcutTarget::relocated(Path::new("/mnt/Docs 2/plan.pdf"));
        let updated = rewrite(content, &target).unwrap();
        assert_eq!(
            updated,
            "[Desktop Entry]\nType=Link\nURL=file:///mnt/Docs%202/plan.pdf\n"
        );
    }

    #[test]
    fn percent_decode_leaves_invalid_escapes() {
        assert_eq!(percent_decode("a%2"), "a%2");
        assert_eq!(percent_decode("a%zz"), "a%zz");
        assert_eq!(percent_decode("%41b"), "Ab");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn store_round_trip_on_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tool.desktop");
        std::fs::write(&path, APP).unwrap();

        let before = DesktopStore.read(&path).await.unwrap();
        assert_eq!(before.target, PathBuf::from("/opt/old/tool.sh"));
        assert_eq!(before.working_dir, None);

        let moved = ShortcutTarget::relocated(Path::new("/srv/tool.sh"));
        DesktopStore.write(&path, &moved).await.unwrap();

        let after = DesktopStore.read(&path).await.unwrap();
        assert_eq!(after, moved);
    }
}
