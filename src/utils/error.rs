use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error(
        "Could not identify a unique tagger in '{source_name}' for flavours [{}]: candidates [{}]",
        .flavours.join(", "),
        .candidates.join(", ")
    )]
    AmbiguousOrMissingTagger {
        source_name: String,
        flavours: Vec<String>,
        candidates: Vec<String>,
    },

    #[error("Failed to load sample '{path}': {message}")]
    SampleLoadError { path: String, message: String },

    #[error("Failed to render plot '{plot}': {message}")]
    RenderError { plot: String, message: String },
}

/// 錯誤分類，用於日誌與結束碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Rendering,
    System,
}

/// 錯誤嚴重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PlotError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        PlotError::ConfigValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn sample(path: impl Into<String>, message: impl Into<String>) -> Self {
        PlotError::SampleLoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn render(plot: impl Into<String>, message: impl Into<String>) -> Self {
        PlotError::RenderError {
            plot: plot.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PlotError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            PlotError::AmbiguousOrMissingTagger { .. }
            | PlotError::SampleLoadError { .. }
            | PlotError::CsvError(_) => ErrorCategory::Data,
            PlotError::RenderError { .. } => ErrorCategory::Rendering,
            PlotError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Rendering => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 結束碼，失敗一律非零
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PlotError::ConfigValidationError { field, .. } => {
                format!("Check the '{}' entry of the configuration document", field)
            }
            PlotError::AmbiguousOrMissingTagger { candidates, .. } if candidates.is_empty() => {
                "Set an explicit tagger `name` or check the probability columns of the sample"
                    .to_string()
            }
            PlotError::AmbiguousOrMissingTagger { .. } => {
                "Several taggers share the sample; set an explicit tagger `name`".to_string()
            }
            PlotError::SampleLoadError { .. } | PlotError::CsvError(_) => {
                "Make sure the sample file exists and has a header row with numeric columns"
                    .to_string()
            }
            PlotError::RenderError { .. } => {
                "Check the plot arguments and that the output directory is writable".to_string()
            }
            PlotError::IoError(_) => "Check file permissions and available disk space".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Sample data problem: {}", self),
            ErrorCategory::Rendering => format!("Plotting failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
