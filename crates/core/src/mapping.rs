//! Upload mapping
//!
//! Maps local source files to the names they carry in the Crowdin project.
//! The whole mapping is validated before any file is sent anywhere.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Characters Crowdin rejects in file names
pub const FORBIDDEN_NAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Local path -> remote file name, ordered by local path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadMapping {
    entries: BTreeMap<String, String>,
}

impl UploadMapping {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Parse the JSON object form, e.g. `{"locales/en.json": "en.json"}`
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::Validation("upload files list cannot be empty".into()));
        }

        let entries: BTreeMap<String, String> = serde_json::from_str(raw).map_err(|e| {
            Error::Validation(format!("failed to read upload files list: {e}"))
        })?;

        let mapping = Self::new(entries);
        if mapping.is_empty() {
            return Err(Error::Validation("upload files list cannot be empty".into()));
        }
        Ok(mapping)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(local_path, remote_name)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check every entry; the first violation rejects the whole mapping
    pub fn validate(&self) -> Result<()> {
        for (local_path, remote_name) in self.iter() {
            validate_entry(local_path, remote_name)?;
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for UploadMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn validate_entry(local_path: &str, remote_name: &str) -> Result<()> {
    if local_path.is_empty() {
        return Err(Error::Validation("local file path cannot be empty".into()));
    }

    if remote_name.is_empty() {
        return Err(Error::Validation(format!(
            "Crowdin file name for '{local_path}' cannot be empty"
        )));
    }

    if remote_name.contains(FORBIDDEN_NAME_CHARS) {
        let forbidden: String = FORBIDDEN_NAME_CHARS.iter().collect();
        return Err(Error::Validation(format!(
            "Crowdin file name cannot contain any of '{forbidden}': {remote_name}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> UploadMapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_valid_mapping() {
        let m = mapping(&[("locales/en.json", "en.json"), ("po/base.pot", "base.pot")]);
        assert!(m.validate().is_ok());
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_empty_local_path_rejected() {
        let m = mapping(&[("", "en.json")]);
        assert!(matches!(m.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_empty_remote_name_rejected() {
        let m = mapping(&[("locales/en.json", "")]);
        assert!(matches!(m.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_every_forbidden_char_rejected() {
        for c in FORBIDDEN_NAME_CHARS {
            let name = format!("en{c}json");
            let m = mapping(&[("locales/en.json", name.as_str())]);
            assert!(
                matches!(m.validate(), Err(Error::Validation(_))),
                "'{c}' should be rejected"
            );
        }
    }

    #[test]
    fn test_one_bad_entry_rejects_batch() {
        let m = mapping(&[
            ("a.json", "a.json"),
            ("b.json", "dir/b.json"),
            ("c.json", "c.json"),
        ]);
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("dir/b.json"));
    }

    #[test]
    fn test_from_json() {
        let m = UploadMapping::from_json(r#"{"b.json": "b.json", "a.json": "a.json"}"#).unwrap();
        let locals: Vec<_> = m.iter().map(|(local, _)| local).collect();
        assert_eq!(locals, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_from_json_rejects_empty_and_garbage() {
        assert!(matches!(UploadMapping::from_json(""), Err(Error::Validation(_))));
        assert!(matches!(UploadMapping::from_json("{}"), Err(Error::Validation(_))));
        assert!(matches!(UploadMapping::from_json("[1, 2]"), Err(Error::Validation(_))));
    }
}
