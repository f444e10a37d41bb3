//! 评论数据结构与响应信封归一化
//!
//! 服务器的评论列表可能以三种形态返回：`{comments: [...]}`、`{data: [...]}`
//! 或裸数组。三种形态在适配器边界上建模为一个和类型，归一化后对上层
//! 完全等价；其他任何形态都降级为空列表而不是报错。

use crate::community::serialization::{
    generate_fallback_id, now_rfc3339, placeholder_avatar_url, resolve_display_name,
    UNKNOWN_AUTHOR,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 归一化后的评论（上层只见这个形状）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_display_name: String,
    pub author_avatar_url: String,
    /// ISO-8601 时间戳
    pub timestamp: String,
}

/// 服务器原始评论（字段名和形态不统一，全部宽松反序列化）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    /// ID 可能叫 `id` 或 `_id`，可能是字符串或数字
    #[serde(default, alias = "_id")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub content: String,
    /// 作者可能是字符串，也可能是嵌套对象
    #[serde(default)]
    pub author: Option<RawAuthor>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// 时间戳可能叫 `timestamp` 或 `createdAt`
    #[serde(default, alias = "createdAt")]
    pub timestamp: Option<String>,
}

/// 作者字段的两种形态
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAuthor {
    /// 纯字符串作者名
    Name(String),
    /// 嵌套作者对象
    Profile(RawAuthorProfile),
}

/// 嵌套作者对象
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuthorProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl RawComment {
    /// 归一化为标准评论形状
    pub fn normalize(self) -> Comment {
        let author_display_name = match self.author {
            Some(RawAuthor::Name(name)) if !name.trim().is_empty() => name.trim().to_string(),
            Some(RawAuthor::Profile(profile)) => {
                resolve_display_name(&profile.first_name, &profile.last_name)
            }
            _ => UNKNOWN_AUTHOR.to_string(),
        };

        let author_avatar_url = self
            .avatar
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| placeholder_avatar_url(&author_display_name));

        let id = match self.id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            // 服务器没给 ID 时用本地时间戳兜底
            _ => generate_fallback_id(),
        };

        let timestamp = self
            .timestamp
            .filter(|t| !t.is_empty())
            .unwrap_or_else(now_rfc3339);

        Comment {
            id,
            content: self.content,
            author_display_name,
            author_avatar_url,
            timestamp,
        }
    }
}

/// 评论列表响应信封（三种合法形态的和类型）
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CommentListEnvelope {
    /// `{comments: [...]}`
    Wrapped { comments: Vec<RawComment> },
    /// `{data: [...]}`（外层 `{success, data}` 信封也落入此形态）
    Data { data: Vec<RawComment> },
    /// 裸数组 `[...]`
    Bare(Vec<RawComment>),
    /// 其他任何形态（降级为空列表）
    Other(serde_json::Value),
}

impl CommentListEnvelope {
    fn into_raw(self) -> Vec<RawComment> {
        match self {
            CommentListEnvelope::Wrapped { comments } => comments,
            CommentListEnvelope::Data { data } => data,
            CommentListEnvelope::Bare(list) => list,
            CommentListEnvelope::Other(value) => {
                warn!("[CommentAPI] ⚠️ 评论列表形态不符合预期，降级为空列表: {}", value);
                Vec::new()
            }
        }
    }
}

/// 把任意 JSON 载荷归一化为标准评论列表
pub fn normalize_comment_list(value: serde_json::Value) -> Vec<Comment> {
    let envelope: CommentListEnvelope = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        // Other 变体兜底后理论上不会走到这里
        Err(_) => return Vec::new(),
    };
    envelope
        .into_raw()
        .into_iter()
        .map(RawComment::normalize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!([
            {
                "id": "c-1",
                "content": "Amen!",
                "author": "Grace Lee",
                "timestamp": "2025-11-02T09:30:00Z"
            },
            {
                "_id": 42,
                "content": "Blessed message",
                "author": {"firstName": "Sam", "lastName": "Park"},
                "createdAt": "2025-11-02T09:31:00Z"
            }
        ])
    }

    #[test]
    fn three_envelopes_normalize_identically() {
        let bare = normalize_comment_list(payload());
        let wrapped = normalize_comment_list(json!({"comments": payload()}));
        let data = normalize_comment_list(json!({"success": true, "data": payload()}));

        assert_eq!(bare.len(), 2);
        assert_eq!(bare, wrapped);
        assert_eq!(bare, data);
    }

    #[test]
    fn unexpected_shape_degrades_to_empty() {
        let list = normalize_comment_list(json!({"unexpected": true}));
        assert!(list.is_empty());
        let list = normalize_comment_list(json!(null));
        assert!(list.is_empty());
        let list = normalize_comment_list(json!("junk"));
        assert!(list.is_empty());
    }

    #[test]
    fn author_string_is_trimmed() {
        let list = normalize_comment_list(json!([{"id": "c", "content": "hi", "author": "  Grace Lee  "}]));
        assert_eq!(list[0].author_display_name, "Grace Lee");
    }

    #[test]
    fn author_object_resolves_full_name() {
        let list = normalize_comment_list(json!([
            {"id": "c", "content": "hi", "author": {"firstName": " Sam ", "lastName": " Park "}}
        ]));
        assert_eq!(list[0].author_display_name, "Sam Park");
    }

    #[test]
    fn missing_author_uses_sentinel_and_placeholder_avatar() {
        let list = normalize_comment_list(json!([{"id": "c", "content": "hi"}]));
        assert_eq!(list[0].author_display_name, "Unknown User");
        assert!(list[0].author_avatar_url.contains("ui-avatars.com"));
        assert!(list[0].author_avatar_url.contains("Unknown%20User"));
    }

    #[test]
    fn numeric_and_underscore_ids_accepted() {
        let list = normalize_comment_list(json!([{"_id": 42, "content": "hi"}]));
        assert_eq!(list[0].id, "42");
    }

    #[test]
    fn missing_id_gets_local_fallback() {
        let list = normalize_comment_list(json!([{"content": "hi"}]));
        assert!(list[0].id.parse::<i64>().is_ok());
    }

    #[test]
    fn created_at_alias_accepted() {
        let list = normalize_comment_list(json!([
            {"id": "c", "content": "hi", "createdAt": "2025-11-02T09:31:00Z"}
        ]));
        assert_eq!(list[0].timestamp, "2025-11-02T09:31:00Z");
    }
}
