//! Output formats of the generation engine and test suite split strategies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Code-emission backend of the generation engine.
///
/// The wire names (`JS_JEST`, `JAVA_JUNIT_5`, ...) are what the engine
/// expects for its `outputFormat` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputFormat {
    #[serde(rename = "JAVA_JUNIT_5")]
    JavaJunit5,
    #[serde(rename = "JAVA_JUNIT_4")]
    JavaJunit4,
    #[serde(rename = "KOTLIN_JUNIT_5")]
    KotlinJunit5,
    #[serde(rename = "KOTLIN_JUNIT_4")]
    KotlinJunit4,
    JsJest,
    PythonUnittest,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::JavaJunit5,
        OutputFormat::JavaJunit4,
        OutputFormat::KotlinJunit5,
        OutputFormat::KotlinJunit4,
        OutputFormat::JsJest,
        OutputFormat::PythonUnittest,
    ];

    /// Engine wire name
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::JavaJunit5 => "JAVA_JUNIT_5",
            OutputFormat::JavaJunit4 => "JAVA_JUNIT_4",
            OutputFormat::KotlinJunit5 => "KOTLIN_JUNIT_5",
            OutputFormat::KotlinJunit4 => "KOTLIN_JUNIT_4",
            OutputFormat::JsJest => "JS_JEST",
            OutputFormat::PythonUnittest => "PYTHON_UNITTEST",
        }
    }

    pub fn is_javascript(self) -> bool {
        matches!(self, OutputFormat::JsJest)
    }

    pub fn is_java(self) -> bool {
        matches!(self, OutputFormat::JavaJunit5 | OutputFormat::JavaJunit4)
    }

    pub fn is_kotlin(self) -> bool {
        matches!(self, OutputFormat::KotlinJunit5 | OutputFormat::KotlinJunit4)
    }

    pub fn is_python(self) -> bool {
        matches!(self, OutputFormat::PythonUnittest)
    }

    /// Java or Kotlin output, compiled and run on the JVM
    pub fn is_jvm(self) -> bool {
        self.is_java() || self.is_kotlin()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown output format name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format '{0}' (expected one of JAVA_JUNIT_5, JAVA_JUNIT_4, KOTLIN_JUNIT_5, KOTLIN_JUNIT_4, JS_JEST, PYTHON_UNITTEST)")]
pub struct ParseOutputFormatError(pub String);

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    /// Accepts wire names case-insensitively, with `-` in place of `_`
    /// (`js-jest`, `JS_JEST`, `java_junit_5`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
            .ok_or_else(|| ParseOutputFormatError(s.to_string()))
    }
}

/// How the engine splits the generated suite into files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestSuiteSplitType {
    None,
    /// One file per fault category plus the remaining successful calls
    #[default]
    Faults,
}

impl fmt::Display for TestSuiteSplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestSuiteSplitType::None => f.write_str("NONE"),
            TestSuiteSplitType::Faults => f.write_str("FAULTS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_cli_spellings() {
        assert_eq!("JS_JEST".parse::<OutputFormat>(), Ok(OutputFormat::JsJest));
        assert_eq!("js-jest".parse::<OutputFormat>(), Ok(OutputFormat::JsJest));
        assert_eq!(
            "java_junit_5".parse::<OutputFormat>(),
            Ok(OutputFormat::JavaJunit5)
        );
        assert!("COBOL".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_display_matches_serde_name() {
        for format in OutputFormat::ALL {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{format}\""));
        }
    }

    #[test]
    fn test_family_predicates() {
        assert!(OutputFormat::JsJest.is_javascript());
        assert!(!OutputFormat::JsJest.is_jvm());
        assert!(OutputFormat::KotlinJunit4.is_kotlin());
        assert!(OutputFormat::KotlinJunit4.is_jvm());
        assert!(OutputFormat::JavaJunit5.is_java());
        assert!(OutputFormat::PythonUnittest.is_python());
        assert!(!OutputFormat::PythonUnittest.is_javascript());
    }

    #[test]
    fn test_split_type_default_is_faults() {
        assert_eq!(TestSuiteSplitType::default().to_string(), "FAULTS");
        assert_eq!(TestSuiteSplitType::None.to_string(), "NONE");
    }
}
