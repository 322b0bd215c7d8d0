use crate::utils::error::{PlotError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

/// 設定檔格式，依副檔名決定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
    Json,
}

impl DocumentFormat {
    /// `.toml` and `.json` by extension; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "toml" => DocumentFormat::Toml,
            "json" => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// 讀取並解析設定檔
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PlotError::config(path.display().to_string(), format!("Cannot read document: {}", e))
    })?;
    parse_document(&content, DocumentFormat::from_path(path), &path.display().to_string())
}

pub fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: DocumentFormat,
    source: &str,
) -> Result<T> {
    let processed = substitute_env_vars(content);
    let parsed = match format {
        DocumentFormat::Yaml => serde_yaml_ng::from_str(&processed).map_err(|e| e.to_string()),
        DocumentFormat::Toml => toml::from_str(&processed).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::from_str(&processed).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| {
        PlotError::config(source, format!("{:?} parsing error: {}", format, message))
    })
}

pub fn to_document_string<T: Serialize>(value: &T, format: DocumentFormat) -> Result<String> {
    let written = match format {
        DocumentFormat::Yaml => serde_yaml_ng::to_string(value).map_err(|e| e.to_string()),
        DocumentFormat::Toml => toml::to_string(value).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
    };
    written.map_err(|message| PlotError::config("serialization", message))
}

/// 替換環境變數 (例如 ${PLOT_DIR})；未定義的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env pattern"));

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Doc {
        plot_dir: String,
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("plt_cfg")), DocumentFormat::Yaml);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FTAG_PLOTS_TEST_DIR", "/tmp/plots");
        let doc: Doc = parse_document(
            "plot_dir: ${FTAG_PLOTS_TEST_DIR}",
            DocumentFormat::Yaml,
            "inline",
        )
        .unwrap();
        assert_eq!(doc.plot_dir, "/tmp/plots");
        std::env::remove_var("FTAG_PLOTS_TEST_DIR");

        let doc: Doc = parse_document(
            "plot_dir = \"${FTAG_PLOTS_UNDEFINED_VAR}\"",
            DocumentFormat::Toml,
            "inline",
        )
        .unwrap();
        assert_eq!(doc.plot_dir, "${FTAG_PLOTS_UNDEFINED_VAR}");
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = parse_document::<Doc>("plot_dir: [", DocumentFormat::Yaml, "broken.yaml")
            .unwrap_err();
        assert!(matches!(err, PlotError::ConfigValidationError { ref field, .. } if field == "broken.yaml"));
    }

    #[test]
    fn test_read_json_document() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"plot_dir": "out"}"#).unwrap();
        let doc: Doc = read_document(file.path()).unwrap();
        assert_eq!(doc.plot_dir, "out");

        let missing = NamedTempFile::new().unwrap().path().with_extension("missing");
        assert!(read_document::<Doc>(&missing).is_err());
    }
}
