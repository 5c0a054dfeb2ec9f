//! File classification.
//!
//! Every file gets exactly one category label, computed by one of three
//! strategies chosen for the whole run:
//!
//! - [`Criterion::Suffix`]: the lowercased extension (`report.PDF` -> `pdf`)
//! - [`Criterion::MimeName`]: a MIME type looked up from the file name
//! - [`Criterion::MimeContent`]: a MIME type sniffed from the first bytes
//!
//! Classification never fails. Whatever cannot be determined becomes
//! [`UNKNOWN_CATEGORY`].
//!
//! # Examples
//!
//! ```
//! use categorize::file_category::MimeTable;
//!
//! let table = MimeTable::default();
//! assert_eq!(table.guess("index.html"), Some("text/html"));
//! assert_eq!(table.guess("backup.tar.gz"), Some("application/x-tar"));
//! assert_eq!(table.guess("README"), None);
//! ```

use crate::config::Criterion;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Category used when no label can be determined.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Number of leading bytes inspected when sniffing content.
const SNIFF_LEN: u64 = 8192;

/// Suffixes that describe a compression wrapper rather than a type.
const ENCODING_SUFFIXES: &[&str] = &["gz", "bz2", "xz", "z", "br"];

/// Classifies files according to the run's criterion.
#[derive(Debug, Clone)]
pub struct Classifier {
    criterion: Criterion,
    mime_table: MimeTable,
}

impl Classifier {
    pub fn new(criterion: Criterion) -> Self {
        Self {
            criterion,
            mime_table: MimeTable::default(),
        }
    }

    /// Returns the category label for the file at `path`.
    ///
    /// Suffix and name-based lookups look at the entry's own name, so a
    /// symlink is classified by its name, not by its target's name.
    pub fn classify(&self, path: &Path) -> String {
        let category = match self.criterion {
            Criterion::Suffix => suffix_category(path),
            Criterion::MimeName => path
                .file_name()
                .and_then(OsStr::to_str)
                .and_then(|name| self.mime_table.guess(name))
                .map(str::to_string),
            Criterion::MimeContent => match sniff_mime(path) {
                Ok(mime) => Some(mime),
                Err(e) => {
                    debug!("cannot sniff content of {}: {}", path.display(), e);
                    None
                }
            },
        };

        category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }
}

/// Lowercased extension without the leading dot, or `None` when the name
/// has no extension. Dot files such as `.bashrc` have none.
pub fn suffix_category(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if ext.is_empty() { None } else { Some(ext) }
}

/// Detects a MIME type from the beginning of the file's content.
///
/// Known binary signatures are recognized through `infer`. Files without a
/// signature are reported as `text/plain` when their prefix is valid UTF-8
/// without NUL bytes, otherwise as `application/octet-stream`. Empty files
/// are `inode/x-empty`.
pub fn sniff_mime(path: &Path) -> io::Result<String> {
    let mut buf = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut buf)?;

    if buf.is_empty() {
        return Ok("inode/x-empty".to_string());
    }

    if let Some(kind) = infer::get(&buf) {
        return Ok(kind.mime_type().to_string());
    }

    let mime = if looks_like_text(&buf) {
        "text/plain"
    } else {
        "application/octet-stream"
    };
    Ok(mime.to_string())
}

/// UTF-8 with no NUL bytes. A multi-byte sequence cut off by the read
/// limit does not count against the buffer.
fn looks_like_text(buf: &[u8]) -> bool {
    if buf.contains(&0) {
        return false;
    }
    match std::str::from_utf8(buf) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

/// Static file-name to MIME type table.
///
/// Lookups are case-insensitive. Compression suffixes are treated as an
/// encoding layered on the real type, so `notes.txt.gz` is `text/plain`
/// while a bare `data.gz` has no type.
#[derive(Debug, Clone)]
pub struct MimeTable {
    types: HashMap<String, &'static str>,
    aliases: HashMap<String, &'static str>,
}

impl MimeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: HashMap::new(),
            aliases: HashMap::new(),
        };
        table.populate_standard_types();
        table
    }

    fn populate_standard_types(&mut self) {
        // Shorthand archive suffixes, expanded to the extension they stand for
        self.add_alias("tgz", "tar");
        self.add_alias("taz", "tar");
        self.add_alias("tz", "tar");
        self.add_alias("tbz2", "tar");
        self.add_alias("txz", "tar");
        self.add_alias("svgz", "svg");

        // Text
        self.add_type("txt", "text/plain");
        self.add_type("text", "text/plain");
        self.add_type("log", "text/plain");
        self.add_type("c", "text/plain");
        self.add_type("h", "text/plain");
        self.add_type("cc", "text/plain");
        self.add_type("bat", "text/plain");
        self.add_type("md", "text/markdown");
        self.add_type("markdown", "text/markdown");
        self.add_type("html", "text/html");
        self.add_type("htm", "text/html");
        self.add_type("css", "text/css");
        self.add_type("csv", "text/csv");
        self.add_type("tsv", "text/tab-separated-values");
        self.add_type("xml", "text/xml");
        self.add_type("js", "text/javascript");
        self.add_type("mjs", "text/javascript");
        self.add_type("py", "text/x-python");
        self.add_type("rtx", "text/richtext");
        self.add_type("vcf", "text/x-vcard");
        self.add_type("ics", "text/calendar");

        // Application
        self.add_type("json", "application/json");
        self.add_type("pdf", "application/pdf");
        self.add_type("ps", "application/postscript");
        self.add_type("eps", "application/postscript");
        self.add_type("rtf", "application/rtf");
        self.add_type("zip", "application/zip");
        self.add_type("tar", "application/x-tar");
        self.add_type("7z", "application/x-7z-compressed");
        self.add_type("rar", "application/vnd.rar");
        self.add_type("jar", "application/java-archive");
        self.add_type("sh", "application/x-sh");
        self.add_type("wasm", "application/wasm");
        self.add_type("bin", "application/octet-stream");
        self.add_type("exe", "application/octet-stream");
        self.add_type("so", "application/octet-stream");
        self.add_type("o", "application/octet-stream");
        self.add_type("dll", "application/x-msdownload");
        self.add_type("iso", "application/x-iso9660-image");
        self.add_type("sqlite", "application/vnd.sqlite3");
        self.add_type("doc", "application/msword");
        self.add_type("dot", "application/msword");
        self.add_type(
            "docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        );
        self.add_type("xls", "application/vnd.ms-excel");
        self.add_type(
            "xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        );
        self.add_type("ppt", "application/vnd.ms-powerpoint");
        self.add_type(
            "pptx",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        );
        self.add_type("odt", "application/vnd.oasis.opendocument.text");
        self.add_type("ods", "application/vnd.oasis.opendocument.spreadsheet");
        self.add_type("odp", "application/vnd.oasis.opendocument.presentation");
        self.add_type("epub", "application/epub+zip");

        // Images
        self.add_type("png", "image/png");
        self.add_type("jpg", "image/jpeg");
        self.add_type("jpeg", "image/jpeg");
        self.add_type("jpe", "image/jpeg");
        self.add_type("gif", "image/gif");
        self.add_type("bmp", "image/bmp");
        self.add_type("webp", "image/webp");
        self.add_type("svg", "image/svg+xml");
        self.add_type("tif", "image/tiff");
        self.add_type("tiff", "image/tiff");
        self.add_type("ico", "image/vnd.microsoft.icon");
        self.add_type("heic", "image/heic");
        self.add_type("heif", "image/heif");
        self.add_type("avif", "image/avif");

        // Audio
        self.add_type("mp3", "audio/mpeg");
        self.add_type("mp2", "audio/mpeg");
        self.add_type("wav", "audio/x-wav");
        self.add_type("flac", "audio/flac");
        self.add_type("aac", "audio/aac");
        self.add_type("m4a", "audio/mp4");
        self.add_type("ogg", "audio/ogg");
        self.add_type("opus", "audio/opus");
        self.add_type("mid", "audio/midi");
        self.add_type("midi", "audio/midi");

        // Video
        self.add_type("mp4", "video/mp4");
        self.add_type("m4v", "video/mp4");
        self.add_type("mpeg", "video/mpeg");
        self.add_type("mpg", "video/mpeg");
        self.add_type("mov", "video/quicktime");
        self.add_type("qt", "video/quicktime");
        self.add_type("avi", "video/x-msvideo");
        self.add_type("mkv", "video/x-matroska");
        self.add_type("webm", "video/webm");
        self.add_type("flv", "video/x-flv");
        self.add_type("3gp", "video/3gpp");

        // Fonts
        self.add_type("ttf", "font/ttf");
        self.add_type("otf", "font/otf");
        self.add_type("woff", "font/woff");
        self.add_type("woff2", "font/woff2");
    }

    /// Adds an extension to MIME type mapping.
    pub fn add_type(&mut self, ext: &str, mime: &'static str) {
        self.types.insert(ext.to_lowercase(), mime);
    }

    /// Makes `ext` behave like `target` followed by a compression suffix.
    pub fn add_alias(&mut self, ext: &str, target: &'static str) {
        self.aliases.insert(ext.to_lowercase(), target);
    }

    /// Looks up the MIME type for a file name.
    pub fn guess(&self, file_name: &str) -> Option<&'static str> {
        let path = Path::new(file_name);
        let ext = path.extension()?.to_str()?.to_lowercase();

        if let Some(target) = self.aliases.get(&ext) {
            return self.types.get(*target).copied();
        }

        if ENCODING_SUFFIXES.contains(&ext.as_str()) {
            let inner = Path::new(path.file_stem()?).extension()?.to_str()?;
            let inner = inner.to_lowercase();
            return match self.aliases.get(&inner) {
                Some(target) => self.types.get(*target).copied(),
                None => self.types.get(&inner).copied(),
            };
        }

        self.types.get(&ext).copied()
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::new()
    }
}
