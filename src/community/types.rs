//! 共享类型与 HTTP 响应处理
//!
//! 定义后端统一的 `{success, data, message}` 响应信封、内容项标识类型，
//! 以及所有 API 共用的响应处理函数。

use crate::community::error::{SdkError, SdkResult};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, error, info};

/// 统一的 API 响应包装结构体（包含 success、message、data）
/// data 字段可能为 null 或缺失，因此使用 `Option<T>`；
/// serde 会自动将缺失或 null 的字段反序列化为 None
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// 通用 HTTP 响应处理函数：直接反序列化为统一的响应信封
/// 返回 `ApiResponse<T>`，调用方可以根据需要处理 `data` 字段（可能为 None）
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> SdkResult<ApiResponse<T>> {
    let status = response.status();

    // 读取 body bytes（只能读取一次）
    let body_bytes = response.bytes().await?;
    let body_str = String::from_utf8_lossy(&body_bytes);
    debug!("[HTTP] {}响应 Body: {}", operation_name, body_str);

    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(SdkError::Http {
            status,
            body: body_str.to_string(),
        });
    }
    debug!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

    // 从 bytes 反序列化（因为 body 已经被消费了）
    let api_resp: ApiResponse<T> = serde_json::from_slice(&body_bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}，原始响应: {}",
            operation_name, e, body_str
        );
        SdkError::Malformed(e)
    })?;

    // 检查业务层错误
    if !api_resp.success {
        let message = api_resp
            .message
            .clone()
            .unwrap_or_else(|| "未知错误".to_string());
        error!("[HTTP] {}服务器错误: {}", operation_name, message);
        return Err(SdkError::Api { message });
    }

    info!("[HTTP] ✅ {}成功", operation_name);
    Ok(api_resp)
}

/// 内容类型：评论/点赞可以挂在四类内容上
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// 媒体（图片/视频）
    Media,
    /// 灵修
    Devotional,
    /// 博客文章
    BlogPost,
    /// 社区帖子
    CommunityPost,
}

impl ContentKind {
    /// 提交评论时请求体中携带的内容项 ID 字段名（各内容类型不同）
    pub fn item_field(&self) -> &'static str {
        match self {
            ContentKind::Media => "mediaId",
            ContentKind::Devotional => "devotionalId",
            ContentKind::BlogPost => "blogId",
            ContentKind::CommunityPost => "postId",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentKind::Media => "media",
            ContentKind::Devotional => "devotional",
            ContentKind::BlogPost => "blog",
            ContentKind::CommunityPost => "post",
        };
        write!(f, "{}", label)
    }
}

/// 内容项引用：类型 + 不透明 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub kind: ContentKind,
    pub id: String,
}

impl ContentRef {
    pub fn new(kind: ContentKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// ID 为空时，调用方必须把相关请求降级为空操作
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_field_per_kind() {
        assert_eq!(ContentKind::Media.item_field(), "mediaId");
        assert_eq!(ContentKind::Devotional.item_field(), "devotionalId");
        assert_eq!(ContentKind::BlogPost.item_field(), "blogId");
        assert_eq!(ContentKind::CommunityPost.item_field(), "postId");
    }

    #[test]
    fn empty_content_ref() {
        let item = ContentRef::new(ContentKind::Media, "");
        assert!(item.is_empty());
        let item = ContentRef::new(ContentKind::Media, "m-1");
        assert!(!item.is_empty());
        assert_eq!(item.to_string(), "media/m-1");
    }
}
