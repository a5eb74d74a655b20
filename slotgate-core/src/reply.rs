use serde::{Deserialize, Serialize};

/// A backend reply for one command, passed through to the caller verbatim.
///
/// Serialized untagged: SADD yields a bare JSON number, ZRANGE a bare array
/// of member strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// An integer reply, e.g. the number of members SADD added.
    Integer(i64),
    /// A list of members, e.g. the result of ZRANGE.
    Members(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_serializes_without_tag() {
        let count = match serde_json::to_string(&Reply::Integer(2)) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(count, "2");

        let members = match serde_json::to_string(&Reply::Members(vec!["a".to_owned(), "b".to_owned()])) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(members, r#"["a","b"]"#);
    }
}
