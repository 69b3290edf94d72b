//! Filename decoration for downloaded assets
//!
//! Pure string manipulation: nothing here touches the filesystem.

use crate::config::NamingPolicy;
use crate::types::Asset;

/// Timestamp layout used for the date decoration (`202401011530`)
pub const DATE_FORMAT: &str = "%Y%m%d%H%M";

/// Split a filename into its base and extension
///
/// `.tar.gz` is treated as one extension (case-insensitive); everything else
/// splits at the last dot of the final path component. The extension keeps its
/// leading dot and is empty when there is none.
///
/// ```
/// use release_dl::naming::split_name_ext;
///
/// assert_eq!(split_name_ext("a.tar.gz"), ("a", ".tar.gz"));
/// assert_eq!(split_name_ext("a.gz"), ("a", ".gz"));
/// assert_eq!(split_name_ext("README"), ("README", ""));
/// ```
pub fn split_name_ext(path: &str) -> (&str, &str) {
    const TAR_GZ: &str = ".tar.gz";

    if path.len() >= TAR_GZ.len() {
        let split = path.len() - TAR_GZ.len();
        if path.is_char_boundary(split) && path[split..].eq_ignore_ascii_case(TAR_GZ) {
            return (&path[..split], &path[split..]);
        }
    }

    let file_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) => path.split_at(file_start + dot),
        None => (path, ""),
    }
}

/// Append `-suffix` for each suffix, in order, between base and extension
///
/// ```
/// use release_dl::naming::decorate;
///
/// assert_eq!(decorate("a.zip", &["v1", "202401010000"]), "a-v1-202401010000.zip");
/// ```
pub fn decorate<S: AsRef<str>>(path: &str, suffixes: &[S]) -> String {
    let (base, ext) = split_name_ext(path);
    let mut name = String::with_capacity(path.len() + suffixes.len() * 16);
    name.push_str(base);
    for suffix in suffixes {
        name.push('-');
        name.push_str(suffix.as_ref());
    }
    name.push_str(ext);
    name
}

/// On-disk filename for `asset` from a release tagged `tag`
///
/// The date suffix comes from the asset's last-updated timestamp and is left
/// out entirely when the service did not report one.
pub fn asset_file_name(asset: &Asset, tag: &str, policy: &NamingPolicy) -> String {
    let mut suffixes: Vec<String> = Vec::with_capacity(2);
    if policy.append_tag && !tag.is_empty() {
        suffixes.push(tag.to_string());
    }
    if policy.append_date
        && let Some(updated_at) = asset.updated_at
        && updated_at.timestamp() > 0
    {
        suffixes.push(updated_at.format(DATE_FORMAT).to_string());
    }
    decorate(&asset.name, &suffixes)
}
