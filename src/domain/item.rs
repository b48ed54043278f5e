use serde::{Deserialize, Serialize};

/// A content object from the remote API: story, comment, job, or poll.
///
/// Every field except `id` is optional on the wire; deleted or dead
/// items in particular may carry nothing else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descendants: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kids: Vec<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dead: bool,
}

impl Item {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    pub fn display_author(&self) -> &str {
        self.by.as_deref().unwrap_or("unknown")
    }

    /// Deleted or dead items render nothing and their subtrees are never mounted.
    pub fn is_removed(&self) -> bool {
        self.deleted || self.dead
    }

    /// Hostname of the story URL for compact display, `www.` stripped.
    pub fn host(&self) -> Option<String> {
        let url = url::Url::parse(self.url.as_deref()?).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    /// Unix timestamp in seconds of account creation.
    pub created: i64,
    #[serde(default)]
    pub karma: Option<i64>,
    #[serde(default)]
    pub about: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_story() {
        let json = r#"{"id":1,"type":"story","by":"pg","time":1160418111,
                       "title":"Y Combinator","url":"http://ycombinator.com",
                       "score":57,"descendants":15,"kids":[15,234]}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 1);
        assert_eq!(item.kind.as_deref(), Some("story"));
        assert_eq!(item.kids, vec![15, 234]);
        assert!(!item.is_removed());
    }

    #[test]
    fn test_deserialize_deleted_comment() {
        let json = r#"{"id":42,"type":"comment","deleted":true}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.is_removed());
        assert!(item.kids.is_empty());
    }

    #[test]
    fn test_missing_item_is_null() {
        let item: Option<Item> = serde_json::from_str("null").unwrap();
        assert!(item.is_none());
    }

    #[test]
    fn test_host_strips_www() {
        let item = Item {
            id: 1,
            url: Some("https://www.example.com/post".into()),
            ..Default::default()
        };
        assert_eq!(item.host().as_deref(), Some("example.com"));
    }

    #[test]
    fn test_host_absent_without_url() {
        assert!(Item { id: 1, ..Default::default() }.host().is_none());
    }
}
