// ── Operator profile ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The operator card shown on the profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorProfile {
    pub name: String,
    pub student_id: String,
    pub github: String,
    pub report_url: String,
    pub api_docs_url: String,
    /// Avatar image path or URL.
    pub avatar: String,
}

/// Editable fields of [`OperatorProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ProfileField {
    Name,
    StudentId,
    Github,
    ReportUrl,
    ApiDocsUrl,
    Avatar,
}

impl OperatorProfile {
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::StudentId => &self.student_id,
            ProfileField::Github => &self.github,
            ProfileField::ReportUrl => &self.report_url,
            ProfileField::ApiDocsUrl => &self.api_docs_url,
            ProfileField::Avatar => &self.avatar,
        }
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::Name => &mut self.name,
            ProfileField::StudentId => &mut self.student_id,
            ProfileField::Github => &mut self.github,
            ProfileField::ReportUrl => &mut self.report_url,
            ProfileField::ApiDocsUrl => &mut self.api_docs_url,
            ProfileField::Avatar => &mut self.avatar,
        };
        *slot = value.into();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fields_parse_in_kebab_case() {
        assert_eq!(
            "student-id".parse::<ProfileField>().unwrap(),
            ProfileField::StudentId
        );
        assert_eq!(ProfileField::ApiDocsUrl.to_string(), "api-docs-url");
    }

    #[test]
    fn set_then_get() {
        let mut profile = OperatorProfile::default();
        profile.set(ProfileField::Github, "https://github.com/op");
        assert_eq!(profile.get(ProfileField::Github), "https://github.com/op");
        assert_eq!(profile.get(ProfileField::Name), "");
    }
}
