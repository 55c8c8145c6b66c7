//! Snippet persistence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ServiceResult;
use crate::provider::RecordContext;

/// A stored CML snippet. `cml_text` is always in storage form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub label: String,
    pub cml_text: String,
}

/// The statement keyword a snippet is created for and grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetKeyword {
    Constraint,
    Require,
    Message,
    SetDefault,
    Rule,
}

impl SnippetKeyword {
    /// Section order in the snippet list.
    pub const ALL: [SnippetKeyword; 5] = [
        SnippetKeyword::Constraint,
        SnippetKeyword::Require,
        SnippetKeyword::Message,
        SnippetKeyword::SetDefault,
        SnippetKeyword::Rule,
    ];

    /// The CML keyword, lowercase.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Constraint => "constraint",
            Self::Require => "require",
            Self::Message => "message",
            Self::SetDefault => "setdefault",
            Self::Rule => "rule",
        }
    }

    /// Key of the list section this keyword groups into.
    pub fn section_key(self) -> &'static str {
        match self {
            Self::Constraint => "constraints",
            other => other.keyword(),
        }
    }

    pub fn section_label(self) -> &'static str {
        match self {
            Self::Constraint => "Constraints",
            Self::Require => "Require",
            Self::Message => "Message",
            Self::SetDefault => "SetDefault",
            Self::Rule => "Rule",
        }
    }

    pub fn from_section_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.section_key() == key)
    }
}

/// Where snippets live.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    async fn create(
        &self,
        record: &RecordContext,
        keyword: SnippetKeyword,
        label: &str,
    ) -> ServiceResult<Snippet>;

    /// Persists `cml_text`, which must already be in storage form.
    async fn save(&self, id: &str, label: &str, cml_text: &str) -> ServiceResult<()>;

    async fn delete(&self, id: &str) -> ServiceResult<()>;

    /// Snippets of a record matching `search_term`, in no particular order.
    async fn list(&self, record: &RecordContext, search_term: &str) -> ServiceResult<Vec<Snippet>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_keys() {
        assert_eq!(SnippetKeyword::Constraint.section_key(), "constraints");
        assert_eq!(SnippetKeyword::SetDefault.section_key(), "setdefault");
        assert_eq!(
            SnippetKeyword::from_section_key("constraints"),
            Some(SnippetKeyword::Constraint)
        );
        assert_eq!(SnippetKeyword::from_section_key("constraint"), None);
    }

    #[test]
    fn test_snippet_json_shape() {
        let snippet: Snippet =
            serde_json::from_str(r#"{"id":"a1","label":"Min","cmlText":"rule x"}"#).unwrap();
        assert_eq!(snippet.cml_text, "rule x");
    }
}
