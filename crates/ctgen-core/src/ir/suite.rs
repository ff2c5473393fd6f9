use chrono::{DateTime, Utc};
use heck::ToSnakeCase;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::test_case::{TestCase, TestType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSetup {
    pub base_url: String,
    /// Unique, first-seen order.
    pub provider_states: Vec<String>,
    pub auth_headers: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteMetadata {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub is_provider_mode: bool,
    pub operation_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_operations: Vec<String>,
}

/// Every test case for one API plus consumer/provider identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub name: String,
    pub consumer: String,
    pub provider: String,
    pub tests: Vec<TestCase>,
    pub setup: SuiteSetup,
    pub metadata: SuiteMetadata,
    pub is_provider_mode: bool,
}

impl TestSuite {
    pub fn tests_of(&self, test_type: TestType) -> impl Iterator<Item = &TestCase> {
        self.tests.iter().filter(move |t| t.test_type == test_type)
    }

    /// Everything except performance cases, which go to their own file.
    pub fn contract_tests(&self) -> impl Iterator<Item = &TestCase> {
        self.tests
            .iter()
            .filter(|t| t.test_type != TestType::Performance)
    }

    /// `provider` or `consumer`.
    pub fn mode(&self) -> &'static str {
        if self.is_provider_mode { "provider" } else { "consumer" }
    }

    pub fn has_performance_tests(&self) -> bool {
        self.tests_of(TestType::Performance).next().is_some()
    }

    /// `user_management_api`, the stem of every generated file name.
    pub fn file_stem(&self) -> String {
        let stem = self.name.to_snake_case();
        if stem.is_empty() {
            "api".to_string()
        } else {
            stem
        }
    }

    /// Count of cases per category, in category order.
    pub fn counts(&self) -> IndexMap<TestType, usize> {
        let mut counts = IndexMap::new();
        for test_type in TestType::ALL {
            let n = self.tests_of(test_type).count();
            if n > 0 {
                counts.insert(test_type, n);
            }
        }
        counts
    }
}

/// Lowercase, hyphen-separated identifier derived from an API title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "api".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("User Management API"), "user-management-api");
        assert_eq!(slugify("  Pet--Store v2! "), "pet-store-v2");
        assert_eq!(slugify("!!!"), "api");
    }
}
