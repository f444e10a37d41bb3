//! 登录认证与会话用户

use crate::community::error::{SdkError, SdkResult};
use crate::community::serialization::resolve_display_name;
use crate::community::types::handle_http_response;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// 登录请求
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 登录成功返回的数据
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: SessionUser,
}

/// 会话用户（登录/拉取资料时创建，登出时清除）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub profile_complete: bool,
    #[serde(default)]
    pub must_change_password: bool,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl SessionUser {
    /// 显示名（firstName + lastName，空时返回兜底值）
    pub fn display_name(&self) -> String {
        resolve_display_name(&self.first_name, &self.last_name)
    }
}

/// 共享的会话槽：客户端与各同步器持有同一份，
/// 登录/登出对所有操作路径立即生效
pub type SessionHandle = Arc<RwLock<Option<SessionUser>>>;

/// 创建空会话槽
pub fn new_session_handle() -> SessionHandle {
    Arc::new(RwLock::new(None))
}

/// 登录并获取 token 与用户资料
pub async fn login_async(
    api_base_url: &str,
    email: String,
    password: String,
) -> SdkResult<LoginData> {
    let client = reqwest::Client::new();
    let request_id = Uuid::new_v4().to_string();

    let login_req = LoginRequest { email, password };
    let url = format!("{}/auth/login", api_base_url);

    info!("[Auth] 🔐 正在登录...");
    debug!("[Auth]   URL: {}", url);
    debug!("[Auth]   邮箱: {}", login_req.email);
    debug!("[Auth]   请求ID: {}", request_id);

    let response = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header("X-Request-Id", &request_id)
        .json(&login_req)
        .send()
        .await?;

    let api_resp = handle_http_response::<LoginData>(response, "登录").await?;
    let data = api_resp.data.ok_or_else(|| SdkError::Api {
        message: "登录响应中缺少 data 字段".to_string(),
    })?;

    info!(
        "[Auth] ✅ 登录成功，用户: {} ({})",
        data.user.display_name(),
        data.user.id
    );
    Ok(data)
}

/// 拉取用户资料（刷新会话用户字段）
///
/// `client` 应该已经在外部配置好认证头
pub async fn fetch_profile(
    client: &reqwest::Client,
    api_base_url: &str,
    user_id: &str,
) -> SdkResult<SessionUser> {
    let request_id = Uuid::new_v4().to_string();
    let url = format!("{}/users/{}", api_base_url, user_id);

    info!("[Auth] 📡 拉取用户资料: {}", user_id);
    debug!("[Auth]   URL: {}, 请求ID: {}", url, request_id);

    let response = client
        .get(&url)
        .header("X-Request-Id", &request_id)
        .send()
        .await?;

    let api_resp = handle_http_response::<SessionUser>(response, "拉取用户资料").await?;
    let user = api_resp.data.ok_or_else(|| SdkError::Api {
        message: "用户资料响应中缺少 data 字段".to_string(),
    })?;

    info!("[Auth] ✅ 用户资料已刷新: {}", user.display_name());
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_user_display_name() {
        let user = SessionUser {
            id: "u-1".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Lee".to_string(),
            profile_complete: true,
            must_change_password: false,
            profile_picture: None,
        };
        assert_eq!(user.display_name(), "Grace Lee");
    }

    #[test]
    fn session_user_deserializes_camel_case() {
        let json = r#"{
            "id": "u-9",
            "firstName": "Sam",
            "lastName": "Park",
            "profileComplete": true,
            "mustChangePassword": false,
            "profilePicture": "https://cdn.example.com/p.png"
        }"#;
        let user: SessionUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.first_name, "Sam");
        assert_eq!(
            user.profile_picture.as_deref(),
            Some("https://cdn.example.com/p.png")
        );
    }

    #[test]
    fn session_user_tolerates_missing_fields() {
        let user: SessionUser = serde_json::from_str(r#"{"id": "u-2"}"#).unwrap();
        assert_eq!(user.display_name(), "Unknown User");
        assert!(user.profile_picture.is_none());
    }
}
