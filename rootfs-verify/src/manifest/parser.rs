//! Manifest line parser.
//!
//! Grammar (mtree subset): a marker character, a path token, then
//! whitespace separated `key=value` attributes drawn from `mode`, `uid`,
//! `gid`, `type`, `link`, `size` and `sha256`. Lines starting with `#` are
//! comments.
//!
//! ```text
//! ./etc mode=755 uid=0 gid=0 type=dir
//! ./etc/localtime mode=777 uid=0 gid=0 type=link link=/usr/share/zoneinfo/UTC
//! ./etc/hosts mode=644 uid=0 gid=0 type=file size=10 sha256=9f86d0...
//! ```

use super::entry::{EntryKind, ManifestEntry, TYPE_DIR, TYPE_LINK};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A manifest line that cannot be turned into an entry.
///
/// Any parse error makes the whole manifest untrustworthy, so callers abort
/// the run instead of recording a discrepancy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} in {line:?}")]
pub struct ParseError {
    /// Offending line content
    pub line: String,

    pub kind: ParseErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("missing path")]
    MissingPath,

    #[error("missing required attribute `{0}=`")]
    MissingAttribute(&'static str),

    #[error("attribute `{key}=` is not a number: {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("mode is not an octal number: {0:?}")]
    InvalidMode(String),

    #[error("token is not a key=value pair: {0:?}")]
    MalformedToken(String),

    #[error("unknown keyword `{0}`")]
    UnknownKeyword(String),

    #[error("keyword `{0}` given more than once")]
    DuplicateKeyword(String),

    #[error("attribute `{key}=` does not apply to type={type_tag}")]
    UnexpectedAttribute { key: &'static str, type_tag: String },
}

/// Parse one manifest line.
///
/// Returns `Ok(None)` for comments and blank lines.
pub fn parse_line(line: &str) -> Result<Option<ManifestEntry>, ParseError> {
    if line.starts_with('#') || line.trim().is_empty() {
        return Ok(None);
    }

    parse_record(line).map(Some).map_err(|kind| ParseError {
        line: line.to_string(),
        kind,
    })
}

fn parse_record(line: &str) -> Result<ManifestEntry, ParseErrorKind> {
    // Drop the leading marker (`.` in mtree output)
    let mut chars = line.chars();
    chars.next();
    let rest = chars.as_str();

    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return Err(ParseErrorKind::MissingPath);
    }

    let mut tokens = rest.split_whitespace();
    let path = tokens.next().ok_or(ParseErrorKind::MissingPath)?;
    let attrs = Attributes::collect(tokens)?;

    let mode = required(attrs.mode, "mode")?;
    if !mode.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(ParseErrorKind::InvalidMode(mode.to_string()));
    }

    let uid = number(attrs.uid, "uid")?;
    let gid = number(attrs.gid, "gid")?;
    let type_tag = required(attrs.kind, "type")?;

    let kind = match type_tag {
        TYPE_DIR => {
            attrs.reject(&[("link", attrs.link), ("size", attrs.size), ("sha256", attrs.sha256)], type_tag)?;
            EntryKind::Directory
        }
        TYPE_LINK => {
            attrs.reject(&[("size", attrs.size), ("sha256", attrs.sha256)], type_tag)?;
            EntryKind::Link {
                target: required(attrs.link, "link")?.to_string(),
            }
        }
        other => {
            attrs.reject(&[("link", attrs.link)], type_tag)?;
            EntryKind::File {
                type_tag: other.to_string(),
                size: number(attrs.size, "size")?,
                sha256: required(attrs.sha256, "sha256")?.to_string(),
            }
        }
    };

    Ok(ManifestEntry {
        path: PathBuf::from(path),
        mode: mode.to_string(),
        uid,
        gid,
        kind,
    })
}

/// Attribute values of one record, keyed by keyword.
#[derive(Default)]
struct Attributes<'a> {
    mode: Option<&'a str>,
    uid: Option<&'a str>,
    gid: Option<&'a str>,
    kind: Option<&'a str>,
    link: Option<&'a str>,
    size: Option<&'a str>,
    sha256: Option<&'a str>,
}

impl<'a> Attributes<'a> {
    fn collect(tokens: impl Iterator<Item = &'a str>) -> Result<Self, ParseErrorKind> {
        let mut attrs = Attributes::default();

        for token in tokens {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| ParseErrorKind::MalformedToken(token.to_string()))?;

            let slot = match key {
                "mode" => &mut attrs.mode,
                "uid" => &mut attrs.uid,
                "gid" => &mut attrs.gid,
                "type" => &mut attrs.kind,
                "link" => &mut attrs.link,
                "size" => &mut attrs.size,
                "sha256" => &mut attrs.sha256,
                _ => return Err(ParseErrorKind::UnknownKeyword(key.to_string())),
            };

            if slot.replace(value).is_some() {
                return Err(ParseErrorKind::DuplicateKeyword(key.to_string()));
            }
        }

        Ok(attrs)
    }

    fn reject(
        &self,
        unexpected: &[(&'static str, Option<&str>)],
        type_tag: &str,
    ) -> Result<(), ParseErrorKind> {
        match unexpected.iter().find(|(_, value)| value.is_some()) {
            Some((key, _)) => Err(ParseErrorKind::UnexpectedAttribute {
                key: *key,
                type_tag: type_tag.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn required<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ParseErrorKind> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ParseErrorKind::MissingAttribute(key)),
    }
}

fn number<T: FromStr>(value: Option<&str>, key: &'static str) -> Result<T, ParseErrorKind> {
    let raw = value.ok_or(ParseErrorKind::MissingAttribute(key))?;
    raw.parse().map_err(|_| ParseErrorKind::InvalidNumber {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    fn parse_ok(line: &str) -> ManifestEntry {
        parse_line(line).unwrap().unwrap()
    }

    fn parse_err(line: &str) -> ParseErrorKind {
        parse_line(line).unwrap_err().kind
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_line("#mtree v2.0").unwrap(), None);
        assert_eq!(parse_line("# ./etc mode=755").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   \t").unwrap(), None);
    }

    #[test]
    fn test_parse_directory() {
        let entry = parse_ok("./etc mode=755 uid=0 gid=0 type=dir");

        assert_eq!(entry.path, PathBuf::from("/etc"));
        assert_eq!(entry.mode, "755");
        assert_eq!(entry.uid, 0);
        assert_eq!(entry.gid, 0);
        assert_eq!(entry.kind, EntryKind::Directory);
        assert_eq!(entry.link_target(), None);
        assert_eq!(entry.size(), None);
        assert_eq!(entry.sha256(), None);
    }

    #[test]
    fn test_parse_link() {
        let entry = parse_ok("./etc/localtime mode=777 uid=0 gid=0 type=link link=../usr/share/zoneinfo/UTC");

        assert_eq!(entry.path, PathBuf::from("/etc/localtime"));
        assert_eq!(entry.mode, "777");
        assert_eq!(entry.link_target(), Some("../usr/share/zoneinfo/UTC"));
        assert_eq!(entry.size(), None);
        assert_eq!(entry.sha256(), None);
    }

    #[test]
    fn test_parse_file() {
        let line = format!("./etc/hosts mode=644 uid=0 gid=0 type=file size=10 sha256={}", DIGEST);
        let entry = parse_ok(&line);

        assert_eq!(entry.path, PathBuf::from("/etc/hosts"));
        assert_eq!(entry.mode, "644");
        assert_eq!(entry.kind.type_tag(), "file");
        assert_eq!(entry.size(), Some(10));
        assert_eq!(entry.sha256(), Some(DIGEST));
        assert_eq!(entry.link_target(), None);
    }

    #[test]
    fn test_unknown_type_tag_is_kept_as_file_shape() {
        let entry = parse_ok("./usr/lib/libfoo.so mode=0755 uid=0 gid=0 type=lib size=3 sha256=abc");

        assert_eq!(entry.kind.type_tag(), "lib");
        assert_eq!(entry.mode, "0755");
        assert_eq!(entry.size(), Some(3));
        assert_eq!(entry.sha256(), Some("abc"));
    }

    #[test]
    fn test_attributes_are_matched_by_keyword() {
        let entry = parse_ok("./srv gid=12 type=dir mode=700 uid=34");

        assert_eq!(entry.uid, 34);
        assert_eq!(entry.gid, 12);
        assert_eq!(entry.mode, "700");
    }

    #[test]
    fn test_relative_paths_keep_their_form() {
        let entry = parse_ok("xdata/cache mode=755 uid=0 gid=0 type=dir");
        assert_eq!(entry.path, PathBuf::from("data/cache"));
    }

    #[test]
    fn test_missing_gid_is_an_error() {
        assert_eq!(
            parse_err("./etc mode=755 uid=0 type=dir"),
            ParseErrorKind::MissingAttribute("gid")
        );
    }

    #[test]
    fn test_error_carries_line() {
        let err = parse_line("./etc mode=755 uid=0 type=dir").unwrap_err();
        assert_eq!(err.line, "./etc mode=755 uid=0 type=dir");
        assert!(err.to_string().contains("gid="));
    }

    #[test]
    fn test_non_numeric_fields() {
        assert_eq!(
            parse_err("./etc mode=755 uid=root gid=0 type=dir"),
            ParseErrorKind::InvalidNumber { key: "uid", value: "root".to_string() }
        );
        assert_eq!(
            parse_err("./etc mode=755 uid=0 gid=-1 type=dir"),
            ParseErrorKind::InvalidNumber { key: "gid", value: "-1".to_string() }
        );
        assert_eq!(
            parse_err("./f mode=644 uid=0 gid=0 type=file size=ten sha256=abc"),
            ParseErrorKind::InvalidNumber { key: "size", value: "ten".to_string() }
        );
    }

    #[test]
    fn test_invalid_mode() {
        assert_eq!(
            parse_err("./etc mode=rwx uid=0 gid=0 type=dir"),
            ParseErrorKind::InvalidMode("rwx".to_string())
        );
        assert_eq!(
            parse_err("./etc mode=789 uid=0 gid=0 type=dir"),
            ParseErrorKind::InvalidMode("789".to_string())
        );
    }

    #[test]
    fn test_shape_requirements() {
        assert_eq!(
            parse_err("./l mode=777 uid=0 gid=0 type=link"),
            ParseErrorKind::MissingAttribute("link")
        );
        assert_eq!(
            parse_err("./f mode=644 uid=0 gid=0 type=file size=1"),
            ParseErrorKind::MissingAttribute("sha256")
        );
        assert_eq!(
            parse_err("./f mode=644 uid=0 gid=0 type=file sha256=abc"),
            ParseErrorKind::MissingAttribute("size")
        );
        assert_eq!(
            parse_err("./d mode=755 uid=0 gid=0 type=dir link=/x"),
            ParseErrorKind::UnexpectedAttribute { key: "link", type_tag: "dir".to_string() }
        );
        assert_eq!(
            parse_err("./l mode=777 uid=0 gid=0 type=link link=x size=1"),
            ParseErrorKind::UnexpectedAttribute { key: "size", type_tag: "link".to_string() }
        );
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(parse_err(". mode=755"), ParseErrorKind::MissingPath);
        assert_eq!(parse_err("."), ParseErrorKind::MissingPath);
        assert_eq!(
            parse_err("./etc mode=755 uid=0 gid=0 type=dir nlink"),
            ParseErrorKind::MalformedToken("nlink".to_string())
        );
        assert_eq!(
            parse_err("./etc mode=755 uid=0 gid=0 type=dir time=1.0"),
            ParseErrorKind::UnknownKeyword("time".to_string())
        );
        assert_eq!(
            parse_err("./etc mode=755 uid=0 uid=1 gid=0 type=dir"),
            ParseErrorKind::DuplicateKeyword("uid".to_string())
        );
        assert_eq!(
            parse_err("./etc mode=755 uid=0 gid=0 type="),
            ParseErrorKind::MissingAttribute("type")
        );
    }
}
