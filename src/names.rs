//! Loading the list of names posted to the monitored endpoint.

use std::path::Path;

use thiserror::Error;

/// Name used when the CSV file yields nothing.
pub const FALLBACK_NAME: &str = "TestName";

#[derive(Error, Debug)]
pub enum NamesError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing `name` column")]
    MissingColumn,
}

/// Read the `name` column of a CSV file with a header row.
pub fn load_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>, NamesError> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    read_names(reader)
}

fn read_names<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<String>, NamesError> {
    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == "name")
        .ok_or(NamesError::MissingColumn)?;

    let mut names = Vec::new();
    for record in reader.records() {
        if let Some(name) = record?.get(column) {
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Load names, falling back to `FALLBACK_NAME` when the file is unusable.
pub fn load_names_or_fallback<P: AsRef<Path>>(path: P) -> Vec<String> {
    let path = path.as_ref();
    let names = match load_names(path) {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!("Could not load names from {}: {}", path.display(), e);
            Vec::new()
        }
    };

    if names.is_empty() {
        tracing::warn!("No names loaded, using {:?}", FALLBACK_NAME);
        return vec![FALLBACK_NAME.to_string()];
    }

    tracing::info!("Loaded {} names from {}", names.len(), path.display());
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(contents.as_bytes()).unwrap();
        tmp
    }

    #[test]
    fn test_load_names() {
        let tmp = csv_file("id,name\n1,Alice\n2,\"O'Brien, Jr.\"\n3,Zoë\n");
        let names = load_names(tmp.path()).unwrap();
        assert_eq!(names, vec!["Alice", "O'Brien, Jr.", "Zoë"]);
    }

    #[test]
    fn test_skips_empty_names() {
        let tmp = csv_file("name\nAlice\n\"\"\nBob\n");
        assert_eq!(load_names(tmp.path()).unwrap(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_missing_column() {
        let tmp = csv_file("first,last\nAda,Lovelace\n");
        assert!(matches!(load_names(tmp.path()), Err(NamesError::MissingColumn)));
    }

    #[test]
    fn test_fallback_when_missing_or_empty() {
        assert_eq!(
            load_names_or_fallback("/nonexistent/names.csv"),
            vec![FALLBACK_NAME.to_string()]
        );

        let tmp = csv_file("name\n");
        assert_eq!(load_names_or_fallback(tmp.path()), vec![FALLBACK_NAME.to_string()]);
    }
}
