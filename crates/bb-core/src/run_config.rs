//! Engine run configuration
//!
//! A [`RunConfiguration`] is an ordered mapping from option name to string
//! value. Writing an existing key replaces its value in place, so the
//! rendered argument list keeps the position where the option first
//! appeared. Builders consume `self` and return a new value; nothing holds a
//! shared mutable argument list.

use serde::Serialize;

/// Option names understood by the generation engine
pub mod keys {
    pub const BLACK_BOX: &str = "blackBox";
    pub const BB_TARGET_URL: &str = "bbTargetUrl";
    pub const BB_SWAGGER_URL: &str = "bbSwaggerUrl";
    pub const PROBLEM_TYPE: &str = "problemType";
    pub const OUTPUT_FORMAT: &str = "outputFormat";
    /// Deprecated, always `false`
    pub const BB_EXPERIMENTS: &str = "bbExperiments";
    pub const OUTPUT_FOLDER: &str = "outputFolder";
    pub const TEST_SUITE_FILE_NAME: &str = "testSuiteFileName";
    pub const CREATE_TESTS: &str = "createTests";
    pub const SEED: &str = "seed";
    pub const USE_TIME_IN_FEEDBACK_SAMPLING: &str = "useTimeInFeedbackSampling";
    pub const MAX_EVALUATIONS: &str = "maxEvaluations";
    pub const STOPPING_CRITERION: &str = "stoppingCriterion";
    pub const TEST_SUITE_SPLIT_TYPE: &str = "testSuiteSplitType";
    pub const EXPECTATIONS_ACTIVE: &str = "expectationsActive";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunConfiguration {
    options: Vec<(String, String)>,
}

impl RunConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a configuration with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Return a configuration with every pair applied in order.
    pub fn with_all<K, V, I>(self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .fold(self, |config, (key, value)| config.with(key, value))
    }

    /// Return a configuration without `key`.
    pub fn without(mut self, key: &str) -> Self {
        self.options.retain(|(k, _)| k != key);
        self
    }

    fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.options.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.options.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as engine command-line arguments: `--key value` per option.
    ///
    /// Empty values are kept as an explicit empty argument; the engine reads
    /// an empty `testSuiteFileName` as "use default naming".
    pub fn to_args(&self) -> Vec<String> {
        self.options
            .iter()
            .flat_map(|(k, v)| [format!("--{k}"), v.clone()])
            .collect()
    }

    /// Parse `key=value` overrides as given on the command line.
    pub fn parse_override(raw: &str) -> Option<(String, String)> {
        let (key, value) = raw.split_once('=')?;
        let key = key.trim().trim_start_matches("--");
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RunConfiguration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RunConfiguration::new().with_all(iter)
    }
}
