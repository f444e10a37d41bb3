//! 评论 HTTP API 客户端
//!
//! 负责所有评论相关的 HTTP 请求，并在边界上完成响应归一化

use crate::community::comment::types::{normalize_comment_list, Comment, RawComment};
use crate::community::error::{SdkError, SdkResult};
use crate::community::types::ContentRef;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 评论后端契约（HTTP 实现之外，测试可注入脚本化实现）
#[async_trait]
pub trait CommentBackend: Send + Sync {
    /// 拉取内容项的当前评论列表
    async fn get_comments(&self, item: &ContentRef) -> SdkResult<Vec<Comment>>;

    /// 提交评论，返回服务器回显（已归一化）
    async fn add_comment(
        &self,
        item: &ContentRef,
        content: &str,
        author_id: &str,
    ) -> SdkResult<Comment>;
}

/// 评论相关的 HTTP API 客户端
pub struct CommentApi {
    client: reqwest::Client,
    api_base_url: String,
}

impl CommentApi {
    /// 创建新的评论 API 客户端
    ///
    /// `client` 应该已经在外部配置好认证头
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }
}

#[async_trait]
impl CommentBackend for CommentApi {
    async fn get_comments(&self, item: &ContentRef) -> SdkResult<Vec<Comment>> {
        // 内容项未选中时降级为空操作，不发请求
        if item.is_empty() {
            warn!("[CommentAPI] ⚠️ 内容项 ID 为空，跳过评论拉取");
            return Ok(Vec::new());
        }

        let request_id = Uuid::new_v4().to_string();
        let url = format!("{}/comments", self.api_base_url);

        info!("[CommentAPI] 📡 拉取评论列表: item={}", item);
        debug!("[CommentAPI]   请求URL: {}, 请求ID: {}", url, request_id);

        let response = self
            .client
            .get(&url)
            .query(&[("itemId", item.id.as_str())])
            .header("X-Request-Id", &request_id)
            .send()
            .await?;

        let status = response.status();
        let body_bytes = response.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&body_bytes).to_string();
            error!(
                "[CommentAPI] 评论拉取失败，HTTP状态: {}, 响应: {}",
                status, body
            );
            return Err(SdkError::Http { status, body });
        }

        // 载荷可能是 {comments: [...]}、{data: [...]} 或裸数组，
        // 其他合法 JSON 形态降级为空列表；非法 JSON 仍作为错误返回
        let value: serde_json::Value = serde_json::from_slice(&body_bytes)?;
        let comments = normalize_comment_list(value);

        info!(
            "[CommentAPI] ✅ 评论列表响应: item={}, 评论数={}",
            item,
            comments.len()
        );
        Ok(comments)
    }

    async fn add_comment(
        &self,
        item: &ContentRef,
        content: &str,
        author_id: &str,
    ) -> SdkResult<Comment> {
        let request_id = Uuid::new_v4().to_string();
        let url = format!("{}/comments", self.api_base_url);

        info!("[CommentAPI] 📡 提交评论: item={}", item);
        debug!(
            "[CommentAPI]   请求URL: {}, 请求ID: {}, 作者: {}",
            url, request_id, author_id
        );

        // 内容项 ID 字段名随内容类型变化（mediaId/devotionalId/blogId/postId）
        let mut body = serde_json::Map::new();
        body.insert("content".to_string(), serde_json::json!(content));
        body.insert(
            item.kind.item_field().to_string(),
            serde_json::json!(item.id),
        );
        body.insert("authorId".to_string(), serde_json::json!(author_id));

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-Request-Id", &request_id)
            .json(&serde_json::Value::Object(body))
            .send()
            .await?;

        let status = response.status();
        let body_bytes = response.bytes().await?;
        let body_str = String::from_utf8_lossy(&body_bytes);
        if !status.is_success() {
            error!(
                "[CommentAPI] 评论提交失败，HTTP状态: {}, 响应: {}",
                status, body_str
            );
            return Err(SdkError::Http {
                status,
                body: body_str.to_string(),
            });
        }

        let value: serde_json::Value = serde_json::from_slice(&body_bytes)?;

        // 信封里带 success=false 时按业务错误处理
        if value.get("success").and_then(|v| v.as_bool()) == Some(false) {
            let message = value
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("未知错误")
                .to_string();
            error!("[CommentAPI] 评论提交服务器错误: {}", message);
            return Err(SdkError::Api { message });
        }

        // 回显可能裹在 data 字段里，也可能就是评论对象本身
        let payload = match value.get("data") {
            Some(data) if data.is_object() => data.clone(),
            _ => value,
        };
        let raw: RawComment = serde_json::from_value(payload)?;
        let comment = raw.normalize();

        info!("[CommentAPI] ✅ 评论提交成功: item={}, id={}", item, comment.id);
        Ok(comment)
    }
}
