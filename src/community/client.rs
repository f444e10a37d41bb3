//! GraceLink 客户端核心实现模块
//!
//! 把会话、评论同步器与点赞动作组合成一个客户端门面。
//! 每个客户端同一时刻最多打开一个内容项的评论同步器；
//! 宿主也可以绕过门面直接构造多个 `CommentSyncer` 并行使用。

use crate::community::auth::{
    fetch_profile, new_session_handle, LoginData, SessionHandle, SessionUser,
};
use crate::community::comment::listener::{CommentListener, EmptyCommentListener};
use crate::community::comment::models::{CommentSyncerConfig, DEFAULT_REFRESH_INTERVAL_MS};
use crate::community::comment::service::CommentSyncer;
use crate::community::error::{SdkError, SdkResult};
use crate::community::like::{LikeApi, LikeBackend, LikeState};
use crate::community::types::ContentRef;
use std::sync::Arc;
use tracing::{debug, info};

/// 构建带认证头的 HTTP 客户端（token 通过 default_headers 自动添加）
pub fn build_authed_client(token: &str) -> SdkResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| SdkError::InvalidConfig("token 无法作为 HTTP 头".to_string()))?;
    headers.insert(reqwest::header::AUTHORIZATION, value);
    reqwest::ClientBuilder::new()
        .default_headers(headers)
        .build()
        .map_err(SdkError::Network)
}

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// HTTP API 基础地址
    pub api_base_url: String,
    /// 认证 token
    pub token: String,
    /// 是否启用评论后台自动刷新
    pub auto_refresh: bool,
    /// 评论后台轮询间隔（毫秒）
    pub refresh_interval_ms: u64,
    /// 是否展示评论区标题（透传给宿主）
    pub show_title: bool,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new(api_base_url: String, token: String) -> Self {
        Self {
            api_base_url,
            token,
            auto_refresh: true,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            show_title: true,
        }
    }
}

/// GraceLink 社区客户端
///
/// 评论/点赞近实时同步的组合入口
pub struct CommunityClient {
    config: ClientConfig,
    /// HTTP 客户端（认证头已配置）
    http_client: reqwest::Client,
    /// 共享会话槽
    session: SessionHandle,
    /// 当前打开内容项的评论同步器
    comment_syncer: Option<Arc<CommentSyncer>>,
    /// 点赞后端
    like_backend: Arc<dyn LikeBackend>,
}

impl CommunityClient {
    /// 创建新的客户端
    pub fn new(config: ClientConfig) -> SdkResult<Self> {
        let http_client = build_authed_client(&config.token)?;
        let like_backend = Arc::new(LikeApi::new(
            http_client.clone(),
            config.api_base_url.clone(),
        ));
        Ok(Self {
            config,
            http_client,
            session: new_session_handle(),
            comment_syncer: None,
            like_backend,
        })
    }

    /// 从登录结果创建客户端（token 与会话一并就位）
    pub fn from_login(api_base_url: String, login: LoginData) -> SdkResult<Self> {
        let config = ClientConfig::new(api_base_url, login.token.clone());
        let mut client = Self::new(config)?;
        client.sign_in(login.user);
        Ok(client)
    }

    /// 注入点赞后端（测试用）
    pub fn set_like_backend(&mut self, backend: Arc<dyn LikeBackend>) {
        self.like_backend = backend;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 写入会话用户
    pub fn sign_in(&self, user: SessionUser) {
        info!("[Client] 🔐 会话已建立: {} ({})", user.display_name(), user.id);
        if let Ok(mut guard) = self.session.write() {
            *guard = Some(user);
        }
    }

    /// 清除会话（登出后评论/点赞动作会被本地拦截）
    pub fn sign_out(&self) {
        info!("[Client] 👋 会话已清除");
        if let Ok(mut guard) = self.session.write() {
            *guard = None;
        }
    }

    /// 当前会话用户
    pub fn session_user(&self) -> Option<SessionUser> {
        self.session.read().ok().and_then(|guard| (*guard).clone())
    }

    /// 共享会话槽（构造独立同步器时传入）
    pub fn session_handle(&self) -> SessionHandle {
        self.session.clone()
    }

    /// 重新拉取当前用户资料并更新会话
    pub async fn refresh_profile(&self) -> SdkResult<SessionUser> {
        let viewer = self.session_user().ok_or(SdkError::Unauthenticated)?;
        let user = fetch_profile(&self.http_client, &self.config.api_base_url, &viewer.id).await?;
        if let Ok(mut guard) = self.session.write() {
            *guard = Some(user.clone());
        }
        Ok(user)
    }

    /// 打开内容项：创建评论同步器，显式拉取后启动轮询
    ///
    /// 已有打开的内容项时，旧同步器先停止再切换（沿用最初注册的监听器），
    /// 旧内容项的迟到响应绝不会落到新内容项的状态里
    pub async fn open_item(
        &mut self,
        item: ContentRef,
        listener: Arc<dyn CommentListener>,
    ) -> SdkResult<Arc<CommentSyncer>> {
        if let Some(existing) = &self.comment_syncer {
            info!("[Client] 🔀 已有打开的内容项，切换到: {}", item);
            existing.switch_item(item).await?;
            return Ok(existing.clone());
        }

        info!("[Client] 📖 打开内容项: {}", item);
        let mut syncer_config = CommentSyncerConfig::new(
            item,
            self.config.api_base_url.clone(),
            self.config.token.clone(),
        );
        syncer_config.auto_refresh = self.config.auto_refresh;
        syncer_config.refresh_interval_ms = self.config.refresh_interval_ms;
        syncer_config.show_title = self.config.show_title;

        let syncer = Arc::new(CommentSyncer::with_listener_and_client(
            syncer_config,
            self.session.clone(),
            listener,
            self.http_client.clone(),
        ));
        syncer.refresh().await?;
        syncer.start().await;

        self.comment_syncer = Some(syncer.clone());
        Ok(syncer)
    }

    /// 打开内容项（使用默认空监听器）
    pub async fn open_item_silent(&mut self, item: ContentRef) -> SdkResult<Arc<CommentSyncer>> {
        self.open_item(item, Arc::new(EmptyCommentListener)).await
    }

    /// 关闭当前内容项：轮询停止，合并状态随同步器一起丢弃
    pub fn close_item(&mut self) {
        if let Some(syncer) = self.comment_syncer.take() {
            debug!("[Client] 📕 关闭内容项: {}", syncer.config().item);
            syncer.stop();
        }
    }

    /// 当前打开内容项的同步器
    pub fn comment_syncer(&self) -> Option<Arc<CommentSyncer>> {
        self.comment_syncer.clone()
    }

    /// 切换点赞状态（未登录时本地拦截，不发请求）
    pub async fn toggle_like(&self, item: &ContentRef) -> SdkResult<LikeState> {
        let viewer = self.session_user().ok_or(SdkError::Unauthenticated)?;
        self.like_backend
            .toggle(item, Some(viewer.id.as_str()))
            .await
    }
}

impl Drop for CommunityClient {
    fn drop(&mut self) {
        self.close_item();
    }
}
