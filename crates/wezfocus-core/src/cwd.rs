//! Working-directory normalization.
//!
//! WezTerm reports a pane's cwd as a `file://` URI (`file:///C:/proj/`,
//! percent-encoded). Snapshots hold a plain path (`C:/proj` or
//! `C:\proj`). Both are brought to the same `C:/proj` form before
//! comparing.

use std::borrow::Cow;

use url::Url;

/// Converts a multiplexer cwd URI into a plain path.
///
/// Decodes percent-escapes, strips the leading slash in front of a drive
/// letter (`/C:/x` becomes `C:/x`) and drops trailing slashes. Input that
/// is not a `file:` URI is returned with trailing slashes removed.
pub fn normalize_mux_cwd(cwd: &str) -> String {
    let decoded: Cow<'_, str> = match Url::parse(cwd) {
        Ok(url) if url.scheme() == "file" => {
            let encoded = url.path().to_string();
            match urlencoding::decode(&encoded) {
                Ok(path) => Cow::Owned(path.into_owned()),
                Err(_) => Cow::Owned(encoded),
            }
        }
        _ => Cow::Borrowed(cwd),
    };

    trim_trailing_slashes(strip_drive_slash(&decoded)).to_string()
}

/// Converts a snapshot project dir into the same form as
/// [`normalize_mux_cwd`]: forward slashes, no trailing slash.
pub fn normalize_project_dir(dir: &str) -> String {
    let forward = dir.trim().replace('\\', "/");
    trim_trailing_slashes(strip_drive_slash(&forward)).to_string()
}

/// Case-insensitive comparison of a multiplexer cwd against a project dir.
pub fn same_directory(mux_cwd: &str, project_dir: &str) -> bool {
    let cwd = normalize_mux_cwd(mux_cwd);
    if cwd.is_empty() {
        return false;
    }
    cwd.to_lowercase() == normalize_project_dir(project_dir).to_lowercase()
}

/// `/C:/path` -> `C:/path`
fn strip_drive_slash(path: &str) -> &str {
    let mut chars = path.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('/'), Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            path.get(1..).unwrap_or(path)
        }
        _ => path,
    }
}

/// Keeps a lone `/` so the filesystem root survives.
fn trim_trailing_slashes(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encodes a path the way WezTerm reports it.
    fn encode(path: &str) -> String {
        let segments: Vec<String> = path
            .split('/')
            .map(|segment| {
                if segment.len() == 2 && segment.ends_with(':') {
                    segment.to_string()
                } else {
                    urlencoding::encode(segment).into_owned()
                }
            })
            .collect();
        let joined = segments.join("/");
        if joined.starts_with('/') {
            format!("file://{joined}/")
        } else {
            format!("file:///{joined}/")
        }
    }

    #[test]
    fn test_normalize_drive_letter_uri() {
        assert_eq!(normalize_mux_cwd("file:///C:/proj/"), "C:/proj");
        assert_eq!(normalize_mux_cwd("file:///d:/work/repo"), "d:/work/repo");
    }

    #[test]
    fn test_normalize_with_hostname() {
        assert_eq!(normalize_mux_cwd("file://DESKTOP-01/C:/proj/"), "C:/proj");
    }

    #[test]
    fn test_normalize_percent_escapes() {
        assert_eq!(
            normalize_mux_cwd("file:///C:/My%20Projects/app/"),
            "C:/My Projects/app"
        );
        assert_eq!(
            normalize_mux_cwd("file:///C:/Users/%E5%B1%B1%E7%94%B0/src/"),
            "C:/Users/山田/src"
        );
    }

    #[test]
    fn test_normalize_unix_uri() {
        assert_eq!(normalize_mux_cwd("file:///home/me/proj/"), "/home/me/proj");
        assert_eq!(normalize_mux_cwd("file:///"), "/");
    }

    #[test]
    fn test_normalize_plain_path_passthrough() {
        assert_eq!(normalize_mux_cwd("C:/proj/"), "C:/proj");
        assert_eq!(normalize_mux_cwd(""), "");
    }

    #[test]
    fn test_normalize_is_left_inverse_of_encoding() {
        let paths = [
            "C:/proj",
            "C:/Users/me/My Documents/repo",
            "D:/作業/プロジェクト",
            "C:/Users/José/100% done",
            "E:/a#b/c?d",
            "/home/me/src/ünïcödé",
        ];
        for path in paths {
            let encoded = encode(path);
            assert_eq!(normalize_mux_cwd(&encoded), path, "via {encoded}");
        }
    }

    #[test]
    fn test_normalize_project_dir_backslashes() {
        assert_eq!(normalize_project_dir("C:\\Users\\me\\proj\\"), "C:/Users/me/proj");
        assert_eq!(normalize_project_dir("/C:/proj"), "C:/proj");
    }

    #[test]
    fn test_same_directory_case_insensitive() {
        assert!(same_directory("file:///C:/Proj/", "c:\\proj"));
        assert!(same_directory("file:///C:/%C3%84pfel/", "C:/äpfel"));
        assert!(!same_directory("file:///C:/proj2/", "C:/proj"));
        assert!(!same_directory("", "C:/proj"));
    }
}
