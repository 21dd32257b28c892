use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum FileExtensionError {
    #[error("Failed to get file extension")]
    MissingFileExtension,
    #[error("Unsupported file extension for file: {0}")]
    UnsupportedFileExtension(String),
}

pub type FileFormatResult<T> = Result<T, FileExtensionError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Extension(#[from] FileExtensionError),
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

pub fn get_file_extension(filename: &str) -> Option<&str> {
    Path::new(filename)
        .extension()
        .and_then(|os_str| os_str.to_str())
}

/// Text formats accepted for pipeline descriptions and cascade data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    pub fn from_file_name(file_name: &str) -> FileFormatResult<Self> {
        let ext = get_file_extension(file_name).ok_or(FileExtensionError::MissingFileExtension)?;

        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Ok(Self::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(FileExtensionError::UnsupportedFileExtension(
                file_name.to_string(),
            ))
        }
    }
}

pub fn serialize<T: Serialize>(value: &T, format: FileFormat) -> Result<String, ConfigError> {
    let text = match format {
        FileFormat::Yaml => serde_yml::to_string(value)?,
        FileFormat::Json => serde_json::to_string_pretty(value)?,
    };
    Ok(text)
}

pub fn deserialize<T: DeserializeOwned + 'static>(text: &str, format: FileFormat) -> Result<T, ConfigError> {
    match format {
        FileFormat::Yaml => Ok(serde_yml::from_str(text)?),
        FileFormat::Json => Ok(serde_json::from_str(text)?),
    }
}

/// Reads `path` and deserializes it using the format implied by its extension.
pub fn load_file<T: DeserializeOwned + 'static>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    let format = FileFormat::from_file_name(&shown)?;
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: shown.clone(),
        source,
    })?;

    tracing::debug!("Loading {:?} config from {}", format, shown);

    deserialize(&text, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Sample {
        name: String,
        level: i32,
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::from_file_name("a.yaml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_file_name("a.YML").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_file_name("a.json").unwrap(), FileFormat::Json);
        assert!(matches!(
            FileFormat::from_file_name("a.lua"),
            Err(FileExtensionError::UnsupportedFileExtension(_))
        ));
        assert!(matches!(
            FileFormat::from_file_name("noext"),
            Err(FileExtensionError::MissingFileExtension)
        ));
    }

    #[test]
    fn yaml_and_json_agree() {
        let sample = Sample {
            name: "otsu".to_string(),
            level: -12,
        };

        for format in [FileFormat::Yaml, FileFormat::Json] {
            let text = serialize(&sample, format).unwrap();
            let back: Sample = deserialize(&text, format).unwrap();
            assert_eq!(back, sample);
        }
    }

    #[test]
    fn load_file_reads_yaml_from_disk() {
        let path = std::env::temp_dir().join(format!("jjil_load_{}.yaml", std::process::id()));
        std::fs::write(&path, "name: gauss\nlevel: 3\n").unwrap();
        let loaded: Sample = load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            loaded,
            Sample {
                name: "gauss".to_string(),
                level: 3,
            }
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_file::<Sample>("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.yaml"));
    }
}
