//! Destination path construction and name collision handling.
//!
//! [`map_destination`] is a pure function of its inputs. [`resolve_collision`]
//! looks at the live filesystem and, when asked to replace, removes the
//! existing entry.

use crate::config::Layout;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Builds the candidate destination for a file.
///
/// `relative_source` is the file's path relative to the input directory.
/// The result always lives under `output_root/category`.
///
/// # Examples
///
/// ```
/// use categorize::config::Layout;
/// use categorize::destination::map_destination;
/// use std::path::Path;
///
/// let dst = map_destination(Path::new("sub/b.TXT"), "txt", Path::new("out"), Layout::FlatPath, false);
/// assert_eq!(dst, Path::new("out/txt/sub_b.TXT"));
/// ```
pub fn map_destination(
    relative_source: &Path,
    category: &str,
    output_root: &Path,
    layout: Layout,
    remove_leading_dots: bool,
) -> PathBuf {
    let category_dir = output_root.join(category);

    let destination = match layout {
        // Walked files always have a name; a path ending in `..` has none and
        // is kept whole.
        Layout::FlatName => {
            category_dir.join(relative_source.file_name().unwrap_or(relative_source.as_os_str()))
        }
        Layout::FlatPath => category_dir.join(flatten_path(relative_source)),
        Layout::Nested => category_dir.join(relative_source),
    };

    if remove_leading_dots {
        strip_leading_dots(destination)
    } else {
        destination
    }
}

/// Joins the components of a relative path with underscores.
///
/// Works on components rather than on a separator character, so both `/` and
/// `\` separated inputs flatten the same way on Windows.
fn flatten_path(path: &Path) -> OsString {
    let mut flat = OsString::new();
    for component in path.components() {
        let part = match component {
            Component::Normal(part) => part,
            Component::ParentDir => OsStr::new(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => continue,
        };
        if !flat.is_empty() {
            flat.push("_");
        }
        flat.push(part);
    }
    flat
}

/// Removes every leading dot from the final file name, leaving parent
/// directories untouched.
///
/// Works on the encoded bytes, so names that are not valid UTF-8 are
/// stripped too. A name made only of dots is left as is.
pub fn strip_leading_dots(path: PathBuf) -> PathBuf {
    let Some(name) = path.file_name() else {
        return path;
    };
    let bytes = name.as_encoded_bytes();
    let dots = bytes.iter().take_while(|&&b| b == b'.').count();
    if dots == 0 {
        return path;
    }
    if dots == bytes.len() {
        warn!(
            "cannot remove leading dots from {}: nothing would be left",
            path.display()
        );
        return path;
    }

    // SAFETY: the bytes come from an `OsStr` and are split right after an
    // ASCII character, which keeps them a valid encoded `OsStr`.
    let stripped = unsafe { OsStr::from_encoded_bytes_unchecked(&bytes[dots..]) }.to_os_string();
    let rewritten = path.with_file_name(stripped);
    info!(
        "removing leading dots: `{}' -> `{}'",
        path.display(),
        rewritten.display()
    );
    rewritten
}

/// True if anything, including a dangling symlink, occupies `path`.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Picks the final destination for `candidate`.
///
/// - Free candidate: returned unchanged.
/// - Occupied and `replace`: the existing entry is removed and the candidate
///   returned.
/// - Occupied otherwise: `.1`, `.2`, ... is appended to the full file name
///   until a free path is found. The existing entry is never touched.
pub fn resolve_collision(candidate: PathBuf, replace: bool) -> io::Result<PathBuf> {
    if !entry_exists(&candidate) {
        return Ok(candidate);
    }

    if replace {
        info!("name collision: `{}' will be replaced", candidate.display());
        fs::remove_file(&candidate)?;
        return Ok(candidate);
    }

    let base_name = candidate
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();

    let mut counter: u64 = 1;
    loop {
        let mut name = base_name.clone();
        name.push(format!(".{counter}"));
        let alternative = candidate.with_file_name(name);
        if !entry_exists(&alternative) {
            info!(
                "name collision: `{}' will be saved as `{}'",
                candidate.display(),
                alternative.display()
            );
            return Ok(alternative);
        }
        counter += 1;
    }
}
