//! 点赞模块
//!
//! 点赞切换没有乐观路径：本地状态只从服务器的权威响应取值，
//! 幂等性（防止重复点赞）由服务器保证。

use crate::community::error::{SdkError, SdkResult};
use crate::community::types::{handle_http_response, ContentRef};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

/// 点赞状态（服务器权威响应）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    /// 聚合点赞数
    pub likes: i64,
    /// 当前用户是否已点赞
    pub is_liked: bool,
}

/// 点赞后端契约
#[async_trait]
pub trait LikeBackend: Send + Sync {
    /// 切换点赞状态，返回服务器的权威结果
    async fn toggle(&self, item: &ContentRef, viewer_id: Option<&str>) -> SdkResult<LikeState>;
}

/// 点赞 HTTP API 客户端
pub struct LikeApi {
    client: reqwest::Client,
    api_base_url: String,
}

impl LikeApi {
    /// 创建新的点赞 API 客户端
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
impl LikeBackend for LikeApi {
    async fn toggle(&self, item: &ContentRef, viewer_id: Option<&str>) -> SdkResult<LikeState> {
        let request_id = Uuid::new_v4().to_string();
        let url = format!("{}/like", self.api_base_url);

        info!("[LikeAPI] 📡 切换点赞: item={}", item);
        debug!("[LikeAPI]   请求URL: {}, 请求ID: {}", url, request_id);

        let mut body = serde_json::Map::new();
        body.insert("itemId".to_string(), serde_json::json!(item.id));
        if let Some(viewer_id) = viewer_id {
            body.insert("viewerId".to_string(), serde_json::json!(viewer_id));
        }

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-Request-Id", &request_id)
            .json(&serde_json::Value::Object(body))
            .send()
            .await?;

        let api_resp = handle_http_response::<LikeState>(response, "点赞切换").await?;
        let state = api_resp.data.ok_or_else(|| SdkError::Api {
            message: "点赞响应中缺少 data 字段".to_string(),
        })?;

        info!(
            "[LikeAPI] ✅ 点赞切换成功: item={}, likes={}, isLiked={}",
            item, state.likes, state.is_liked
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_state_deserializes_camel_case() {
        let state: LikeState = serde_json::from_str(r#"{"likes": 12, "isLiked": true}"#).unwrap();
        assert_eq!(state.likes, 12);
        assert!(state.is_liked);
    }
}
