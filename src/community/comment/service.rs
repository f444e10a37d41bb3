//! 评论同步服务层
//!
//! 实现单个内容项详情页的近实时评论同步：显式拉取、固定间隔的静默轮询、
//! 单调增长合并、乐观追加提交。同步器的生命周期与详情页一致，
//! 关闭页面（drop）或切换内容项时轮询必须先完整停止。

use crate::community::auth::SessionHandle;
use crate::community::client::build_authed_client;
use crate::community::comment::api::{CommentApi, CommentBackend};
use crate::community::comment::listener::{CommentListener, EmptyCommentListener};
use crate::community::comment::models::CommentSyncerConfig;
use crate::community::comment::state::CommentThread;
use crate::community::comment::types::Comment;
use crate::community::error::{SdkError, SdkResult};
use crate::community::serialization::{
    generate_fallback_id, now_rfc3339, placeholder_avatar_url, MAX_COMMENT_LEN,
};
use crate::community::types::ContentRef;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 评论同步器
///
/// 状态机只有两个状态：Idle（无定时器）与 Polling（定时器运行中）。
/// 所有合并状态都挂在同步器实例上，绝无模块级全局，
/// 同时打开的多个内容项互不干扰。
pub struct CommentSyncer {
    config: CommentSyncerConfig,
    /// 评论后端（HTTP 实现或测试注入）
    backend: Arc<dyn CommentBackend>,
    /// 本地合并状态
    thread: Arc<tokio::sync::Mutex<CommentThread>>,
    /// 评论监听器
    listener: Arc<dyn CommentListener>,
    /// 共享会话（提交/点赞前的登录校验）
    session: SessionHandle,
    /// 轮询纪元：停止或切换内容项时自增，
    /// 旧纪元发起的拉取在提交前会发现纪元不匹配并丢弃结果
    epoch: Arc<AtomicU64>,
    /// 轮询任务句柄
    poll_task: StdMutex<Option<JoinHandle<()>>>,
}

impl CommentSyncer {
    /// 创建新的评论同步器（使用默认空监听器）
    pub fn new(config: CommentSyncerConfig, session: SessionHandle) -> SdkResult<Self> {
        Self::with_listener(config, session, Arc::new(EmptyCommentListener))
    }

    /// 创建新的评论同步器（带自定义监听器）
    pub fn with_listener(
        config: CommentSyncerConfig,
        session: SessionHandle,
        listener: Arc<dyn CommentListener>,
    ) -> SdkResult<Self> {
        info!(
            "[CommentSync] 创建评论同步器: item={}, 间隔={}ms, 自动刷新={}",
            config.item, config.refresh_interval_ms, config.auto_refresh
        );
        let http_client = build_authed_client(&config.token)?;
        let api = CommentApi::new(http_client, config.api_base_url.clone());
        Ok(Self::with_backend(config, session, listener, Arc::new(api)))
    }

    /// 创建新的评论同步器（使用共享 HTTP 客户端）
    ///
    /// `http_client` 应该已经在外部配置好认证头
    pub fn with_listener_and_client(
        config: CommentSyncerConfig,
        session: SessionHandle,
        listener: Arc<dyn CommentListener>,
        http_client: reqwest::Client,
    ) -> Self {
        let api = CommentApi::new(http_client, config.api_base_url.clone());
        Self::with_backend(config, session, listener, Arc::new(api))
    }

    /// 创建新的评论同步器（注入后端实现）
    pub fn with_backend(
        config: CommentSyncerConfig,
        session: SessionHandle,
        listener: Arc<dyn CommentListener>,
        backend: Arc<dyn CommentBackend>,
    ) -> Self {
        let thread = CommentThread::new(config.item.clone());
        Self {
            config,
            backend,
            thread: Arc::new(tokio::sync::Mutex::new(thread)),
            listener,
            session,
            epoch: Arc::new(AtomicU64::new(0)),
            poll_task: StdMutex::new(None),
        }
    }

    pub fn config(&self) -> &CommentSyncerConfig {
        &self.config
    }

    /// 当前已提交的评论列表快照
    pub async fn comments(&self) -> Vec<Comment> {
        self.thread.lock().await.comments().to_vec()
    }

    /// 当前评论数
    pub async fn comment_count(&self) -> usize {
        self.thread.lock().await.comment_count()
    }

    /// 是否处于 Polling 状态
    pub fn is_polling(&self) -> bool {
        self.poll_task
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// 当前登录用户
    fn current_viewer(&self) -> Option<crate::community::auth::SessionUser> {
        self.session.read().ok().and_then(|guard| (*guard).clone())
    }

    /// 停止轮询并作废当前纪元（幂等）
    fn halt(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.poll_task.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }

    /// 停止后台轮询：Polling → Idle
    pub fn stop(&self) {
        info!("[CommentSync] ⏹ 停止轮询: item={}", self.config.item);
        self.halt();
    }

    /// 启动后台轮询：Idle → Polling
    ///
    /// 自动刷新关闭或内容项未选中时不启动。重复调用会先停止旧定时器。
    pub async fn start(&self) {
        if !self.config.auto_refresh {
            debug!("[CommentSync] 自动刷新已关闭，不启动轮询");
            return;
        }
        let item = { self.thread.lock().await.item().clone() };
        if item.is_empty() {
            warn!("[CommentSync] ⚠️ 内容项 ID 为空，不启动轮询");
            return;
        }

        self.halt();
        let my_epoch = self.epoch.load(Ordering::SeqCst);

        let backend = self.backend.clone();
        let thread = self.thread.clone();
        let listener = self.listener.clone();
        let epoch = self.epoch.clone();
        let interval_ms = self.config.refresh_interval_ms;

        info!(
            "[CommentSync] ▶️ 启动轮询: item={}, 间隔={}ms",
            item, interval_ms
        );

        let handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_millis(interval_ms));
            // 上一拍的拉取还没返回时不叠加请求：
            // 拉取在循环体内串行 await，错过的节拍直接跳过
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval 的第一拍立即完成，真正的轮询从一个完整间隔后开始
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if epoch.load(Ordering::SeqCst) != my_epoch {
                    break;
                }

                // 静默拉取：不触发加载指示回调
                match backend.get_comments(&item).await {
                    Ok(incoming) => {
                        // 拉取期间可能已停止/切换，迟到结果必须丢弃
                        if epoch.load(Ordering::SeqCst) != my_epoch {
                            debug!(
                                "[CommentSync] 纪元已更替，丢弃迟到的静默结果: item={}",
                                item
                            );
                            break;
                        }
                        let (replaced, snapshot, count) = {
                            let mut guard = thread.lock().await;
                            if guard.item() != &item {
                                break;
                            }
                            let replaced = guard.merge(incoming, true);
                            (
                                replaced,
                                serde_json::to_string(guard.comments()).unwrap_or_default(),
                                guard.comment_count(),
                            )
                        };
                        if replaced {
                            info!(
                                "[CommentSync] 🔄 静默合并生效: item={}, 评论数={}",
                                item, count
                            );
                            listener
                                .on_comments_changed(item.id.clone(), snapshot)
                                .await;
                            listener
                                .on_comment_count_changed(item.id.clone(), count as i64)
                                .await;
                        }
                    }
                    Err(e) => {
                        // 单次静默失败不致命：状态不动，下一拍自愈
                        warn!("[CommentSync] ⚠️ 静默拉取失败: item={}, 错误: {}", item, e);
                        listener.on_sync_failed(item.id.clone(), e.to_string()).await;
                    }
                }
            }
            debug!("[CommentSync] 轮询循环退出: item={}", item);
        });

        if let Ok(mut guard) = self.poll_task.lock() {
            *guard = Some(handle);
        }
    }

    /// 显式拉取（初次打开 / 手动刷新）：无条件替换已提交列表
    pub async fn refresh(&self) -> SdkResult<Vec<Comment>> {
        let item = { self.thread.lock().await.item().clone() };
        let my_epoch = self.epoch.load(Ordering::SeqCst);

        info!("[CommentSync] 📡 显式拉取评论: item={}", item);
        self.listener.on_sync_start(item.id.clone()).await;

        match self.backend.get_comments(&item).await {
            Ok(incoming) => {
                if self.epoch.load(Ordering::SeqCst) != my_epoch {
                    warn!(
                        "[CommentSync] ⚠️ 显式拉取期间内容项已切换，丢弃结果: item={}",
                        item
                    );
                    return Ok(Vec::new());
                }
                let (snapshot, count, json) = {
                    let mut guard = self.thread.lock().await;
                    if guard.item() != &item {
                        return Ok(Vec::new());
                    }
                    guard.merge(incoming, false);
                    (
                        guard.comments().to_vec(),
                        guard.comment_count(),
                        serde_json::to_string(guard.comments()).unwrap_or_default(),
                    )
                };
                self.listener.on_comments_changed(item.id.clone(), json).await;
                self.listener
                    .on_comment_count_changed(item.id.clone(), count as i64)
                    .await;
                self.listener.on_sync_finish(item.id.clone()).await;
                info!("[CommentSync] ✅ 显式拉取完成: item={}, 评论数={}", item, count);
                Ok(snapshot)
            }
            Err(e) => {
                // 已提交状态保持不变
                warn!("[CommentSync] ❌ 显式拉取失败: item={}, 错误: {}", item, e);
                self.listener
                    .on_sync_failed(item.id.clone(), e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    /// 切换内容项：停止旧轮询、重置合并状态、显式拉取、重启轮询
    ///
    /// 旧内容项的迟到响应由纪元守卫丢弃，绝不会写入新内容项的状态
    pub async fn switch_item(&self, item: ContentRef) -> SdkResult<Vec<Comment>> {
        let previous = { self.thread.lock().await.item().clone() };
        info!("[CommentSync] 🔀 切换内容项: {} -> {}", previous, item);
        self.halt();
        {
            self.thread.lock().await.reset(item);
        }
        let result = self.refresh().await;
        self.start().await;
        result
    }

    /// 提交评论（乐观追加路径）
    ///
    /// 顺序：登录校验 → 内容校验 → 影子评论立即入列（本地资料 + 当前时间 +
    /// 本地兜底 ID）→ 发起网络提交。提交失败时回收影子评论并返回错误。
    /// 提交者在网络往返完成之前就能看到自己的评论。
    pub async fn submit_comment(&self, content: &str) -> SdkResult<Comment> {
        // 未登录：不发起任何网络请求
        let viewer = self.current_viewer().ok_or(SdkError::Unauthenticated)?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(SdkError::Validation("评论内容不能为空".to_string()));
        }
        if trimmed.chars().count() > MAX_COMMENT_LEN {
            return Err(SdkError::Validation(format!(
                "评论内容超过 {} 字上限",
                MAX_COMMENT_LEN
            )));
        }

        let item = { self.thread.lock().await.item().clone() };
        if item.is_empty() {
            return Err(SdkError::Validation("内容项未选中".to_string()));
        }

        // 影子评论完全由本地已知的资料构造，不依赖服务器回显
        let display_name = viewer.display_name();
        let shadow = Comment {
            id: generate_fallback_id(),
            content: trimmed.to_string(),
            author_avatar_url: viewer
                .profile_picture
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| placeholder_avatar_url(&display_name)),
            author_display_name: display_name,
            timestamp: now_rfc3339(),
        };

        // 乐观追加：立即可见，长度基准抬高到追加后的值
        let (json, count) = {
            let mut guard = self.thread.lock().await;
            guard.optimistic_append(shadow.clone());
            (
                serde_json::to_string(guard.comments()).unwrap_or_default(),
                guard.comment_count(),
            )
        };
        info!(
            "[CommentSync] ✏️ 评论已乐观入列: item={}, 本地ID={}",
            item, shadow.id
        );
        self.listener.on_comments_changed(item.id.clone(), json).await;
        self.listener
            .on_comment_count_changed(item.id.clone(), count as i64)
            .await;

        match self.backend.add_comment(&item, trimmed, &viewer.id).await {
            Ok(echo) => {
                // 回显不与影子评论做去重合并，交由后续轮询带回服务器副本
                debug!(
                    "[CommentSync] ✅ 评论提交确认: item={}, 服务器ID={}",
                    item, echo.id
                );
                Ok(shadow)
            }
            Err(e) => {
                // 提交失败：回收影子评论，状态恢复到追加前
                warn!("[CommentSync] ❌ 评论提交失败: item={}, 错误: {}", item, e);
                let (json, count) = {
                    let mut guard = self.thread.lock().await;
                    guard.remove_by_id(&shadow.id);
                    (
                        serde_json::to_string(guard.comments()).unwrap_or_default(),
                        guard.comment_count(),
                    )
                };
                self.listener
                    .on_submit_failed(item.id.clone(), e.to_string())
                    .await;
                self.listener.on_comments_changed(item.id.clone(), json).await;
                self.listener
                    .on_comment_count_changed(item.id.clone(), count as i64)
                    .await;
                Err(e)
            }
        }
    }
}

impl Drop for CommentSyncer {
    fn drop(&mut self) {
        // 详情页关闭时定时器必须随之取消
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::auth::{new_session_handle, SessionUser};
    use crate::community::types::ContentKind;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Once;
    use tokio::sync::Notify;

    static INIT_LOGGER: Once = Once::new();

    fn init_test_logger() {
        INIT_LOGGER.call_once(|| {
            use tracing_subscriber::prelude::*;
            use tracing_subscriber::EnvFilter;

            let filter_layer =
                EnvFilter::new("info,gracelink_sdk_core_rust=debug,hyper_util::client=info,reqwest=info");

            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_test_writer();

            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt_layer)
                .init();
        });
    }

    fn comment(id: &str, content: &str) -> Comment {
        Comment {
            id: id.to_string(),
            content: content.to_string(),
            author_display_name: "Grace Lee".to_string(),
            author_avatar_url: "https://cdn.example.com/a.png".to_string(),
            timestamp: "2025-11-02T09:30:00Z".to_string(),
        }
    }

    fn signed_in_session() -> SessionHandle {
        let handle = new_session_handle();
        *handle.write().unwrap() = Some(SessionUser {
            id: "u-1".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Lee".to_string(),
            profile_complete: true,
            must_change_password: false,
            profile_picture: None,
        });
        handle
    }

    fn test_config(item_id: &str, interval_ms: u64) -> CommentSyncerConfig {
        let mut config = CommentSyncerConfig::new(
            ContentRef::new(ContentKind::Media, item_id),
            "http://localhost:0".to_string(),
            "test-token".to_string(),
        );
        config.refresh_interval_ms = interval_ms;
        config
    }

    /// 只计数、立即返回的后端（拦截类测试用）
    #[derive(Default)]
    struct CountingBackend {
        get_calls: AtomicUsize,
        add_calls: AtomicUsize,
    }

    #[async_trait]
    impl CommentBackend for CountingBackend {
        async fn get_comments(&self, _item: &ContentRef) -> SdkResult<Vec<Comment>> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn add_comment(
            &self,
            _item: &ContentRef,
            content: &str,
            _author_id: &str,
        ) -> SdkResult<Comment> {
            self.add_calls.fetch_add(1, Ordering::SeqCst);
            Ok(comment("server-1", content))
        }
    }

    /// 按脚本顺序返回拉取结果的后端，脚本耗尽后重复最后一次成功结果
    struct QueueBackend {
        script: StdMutex<VecDeque<Result<Vec<Comment>, String>>>,
        last: StdMutex<Vec<Comment>>,
        add_error: Option<String>,
    }

    impl QueueBackend {
        fn new(script: Vec<Result<Vec<Comment>, String>>) -> Self {
            Self {
                script: StdMutex::new(script.into_iter().collect()),
                last: StdMutex::new(Vec::new()),
                add_error: None,
            }
        }
    }

    #[async_trait]
    impl CommentBackend for QueueBackend {
        async fn get_comments(&self, _item: &ContentRef) -> SdkResult<Vec<Comment>> {
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(list)) => {
                    *self.last.lock().unwrap() = list.clone();
                    Ok(list)
                }
                Some(Err(message)) => Err(SdkError::Api { message }),
                None => Ok(self.last.lock().unwrap().clone()),
            }
        }

        async fn add_comment(
            &self,
            _item: &ContentRef,
            content: &str,
            _author_id: &str,
        ) -> SdkResult<Comment> {
            match &self.add_error {
                Some(message) => Err(SdkError::Api {
                    message: message.clone(),
                }),
                None => Ok(comment("server-1", content)),
            }
        }
    }

    /// 提交请求在 Notify 上停住的后端（乐观可见性测试用）
    struct ParkedAddBackend {
        gate: Arc<Notify>,
        add_calls: AtomicUsize,
    }

    #[async_trait]
    impl CommentBackend for ParkedAddBackend {
        async fn get_comments(&self, _item: &ContentRef) -> SdkResult<Vec<Comment>> {
            Ok(Vec::new())
        }

        async fn add_comment(
            &self,
            _item: &ContentRef,
            content: &str,
            _author_id: &str,
        ) -> SdkResult<Comment> {
            self.add_calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(comment("server-1", content))
        }
    }

    /// item-a 的拉取在 Notify 上停住，item-b 立即返回（纪元守卫测试用）
    struct SplitBackend {
        gate: Arc<Notify>,
        a_started: Arc<Notify>,
        a_calls: AtomicUsize,
    }

    #[async_trait]
    impl CommentBackend for SplitBackend {
        async fn get_comments(&self, item: &ContentRef) -> SdkResult<Vec<Comment>> {
            if item.id == "item-a" {
                self.a_calls.fetch_add(1, Ordering::SeqCst);
                self.a_started.notify_one();
                self.gate.notified().await;
                Ok(vec![
                    comment("a-1", "stale"),
                    comment("a-2", "stale"),
                    comment("a-3", "stale"),
                ])
            } else {
                Ok(vec![comment("b-1", "fresh")])
            }
        }

        async fn add_comment(
            &self,
            _item: &ContentRef,
            content: &str,
            _author_id: &str,
        ) -> SdkResult<Comment> {
            Ok(comment("server-1", content))
        }
    }

    #[tokio::test]
    async fn optimistic_append_visible_before_backend_resolves() {
        init_test_logger();
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(ParkedAddBackend {
            gate: gate.clone(),
            add_calls: AtomicUsize::new(0),
        });
        let syncer = Arc::new(CommentSyncer::with_backend(
            test_config("m-1", 3000),
            signed_in_session(),
            Arc::new(EmptyCommentListener),
            backend.clone(),
        ));

        let submitter = syncer.clone();
        let handle = tokio::spawn(async move { submitter.submit_comment("Hello").await });

        // 后端还没放行，影子评论就必须已经可见
        let mut visible = false;
        for _ in 0..200 {
            if syncer.comment_count().await == 1 {
                visible = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(visible, "影子评论应在网络往返完成前可见");

        let comments = syncer.comments().await;
        assert_eq!(comments[0].content, "Hello");
        assert_eq!(comments[0].author_display_name, "Grace Lee");

        gate.notify_one();
        let result = handle.await.unwrap();
        assert!(result.is_ok());
        assert_eq!(backend.add_calls.load(Ordering::SeqCst), 1);
        // 回显不追加第二份副本
        assert_eq!(syncer.comment_count().await, 1);
    }

    #[tokio::test]
    async fn failed_submit_rolls_back_shadow() {
        init_test_logger();
        let mut backend = QueueBackend::new(vec![]);
        backend.add_error = Some("提交失败".to_string());
        let syncer = CommentSyncer::with_backend(
            test_config("m-1", 3000),
            signed_in_session(),
            Arc::new(EmptyCommentListener),
            Arc::new(backend),
        );

        let result = syncer.submit_comment("Hello").await;
        assert!(matches!(result, Err(SdkError::Api { .. })));
        // 失败写入不留下任何本地痕迹
        assert_eq!(syncer.comment_count().await, 0);
    }

    #[tokio::test]
    async fn unauthenticated_submit_makes_no_network_call() {
        init_test_logger();
        let backend = Arc::new(CountingBackend::default());
        let syncer = CommentSyncer::with_backend(
            test_config("m-1", 3000),
            new_session_handle(),
            Arc::new(EmptyCommentListener),
            backend.clone(),
        );

        let result = syncer.submit_comment("Hello").await;
        assert!(matches!(result, Err(SdkError::Unauthenticated)));
        assert_eq!(backend.add_calls.load(Ordering::SeqCst), 0);
        assert_eq!(syncer.comment_count().await, 0);
    }

    #[tokio::test]
    async fn validation_rejects_blank_and_oversized_content() {
        init_test_logger();
        let backend = Arc::new(CountingBackend::default());
        let syncer = CommentSyncer::with_backend(
            test_config("m-1", 3000),
            signed_in_session(),
            Arc::new(EmptyCommentListener),
            backend.clone(),
        );

        assert!(matches!(
            syncer.submit_comment("   ").await,
            Err(SdkError::Validation(_))
        ));
        let oversized = "愛".repeat(MAX_COMMENT_LEN + 1);
        assert!(matches!(
            syncer.submit_comment(&oversized).await,
            Err(SdkError::Validation(_))
        ));
        assert_eq!(backend.add_calls.load(Ordering::SeqCst), 0);

        // 恰好到达上限的内容可以提交
        let at_limit = "a".repeat(MAX_COMMENT_LEN);
        assert!(syncer.submit_comment(&at_limit).await.is_ok());
    }

    #[tokio::test]
    async fn stale_response_after_switch_is_dropped() {
        init_test_logger();
        let gate = Arc::new(Notify::new());
        let a_started = Arc::new(Notify::new());
        let backend = Arc::new(SplitBackend {
            gate: gate.clone(),
            a_started: a_started.clone(),
            a_calls: AtomicUsize::new(0),
        });

        let mut config = test_config("item-a", 3000);
        config.auto_refresh = false;
        let syncer = Arc::new(CommentSyncer::with_backend(
            config,
            signed_in_session(),
            Arc::new(EmptyCommentListener),
            backend.clone(),
        ));

        // item-a 的显式拉取在后端停住
        let stale_fetcher = syncer.clone();
        let handle = tokio::spawn(async move { stale_fetcher.refresh().await });
        a_started.notified().await;

        // 拉取未返回期间切换到 item-b
        let fresh = syncer
            .switch_item(ContentRef::new(ContentKind::Media, "item-b"))
            .await
            .unwrap();
        assert_eq!(fresh.len(), 1);

        // 放行 item-a 的迟到响应，等它完整返回
        gate.notify_one();
        let _ = handle.await.unwrap();

        // item-b 的状态不能被 item-a 的结果污染
        let comments = syncer.comments().await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, "b-1");
    }

    #[tokio::test]
    async fn background_ticks_apply_monotonic_growth() {
        init_test_logger();
        let backend = Arc::new(QueueBackend::new(vec![
            // 显式拉取
            Ok(vec![comment("a", "hi")]),
            // 等长的静默结果被丢弃
            Ok(vec![comment("x", "hi")]),
            // 更长的静默结果落地
            Ok(vec![comment("a", "hi"), comment("b", "hi")]),
        ]));
        let syncer = CommentSyncer::with_backend(
            test_config("m-1", 20),
            signed_in_session(),
            Arc::new(EmptyCommentListener),
            backend,
        );

        syncer.refresh().await.unwrap();
        assert_eq!(syncer.comment_count().await, 1);
        syncer.start().await;
        assert!(syncer.is_polling());

        let mut grown = false;
        for _ in 0..200 {
            if syncer.comment_count().await == 2 {
                grown = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(grown, "静默轮询应把列表增长到 2 条");

        // 等长结果从未覆盖过第一条
        let comments = syncer.comments().await;
        assert_eq!(comments[0].id, "a");
        syncer.stop();
        assert!(!syncer.is_polling());
    }

    #[tokio::test]
    async fn silent_failure_leaves_state_and_loop_recovers() {
        init_test_logger();
        let backend = Arc::new(QueueBackend::new(vec![
            Ok(vec![comment("a", "hi")]),
            // 一次静默失败：状态不动，循环继续
            Err("网络抖动".to_string()),
            Ok(vec![comment("a", "hi"), comment("b", "hi")]),
        ]));
        let syncer = CommentSyncer::with_backend(
            test_config("m-1", 20),
            signed_in_session(),
            Arc::new(EmptyCommentListener),
            backend,
        );

        syncer.refresh().await.unwrap();
        syncer.start().await;

        let mut recovered = false;
        for _ in 0..200 {
            if syncer.comment_count().await == 2 {
                recovered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(recovered, "失败的下一拍应正常自愈");
    }

    #[tokio::test]
    async fn explicit_refresh_replaces_shorter_list() {
        init_test_logger();
        let backend = Arc::new(QueueBackend::new(vec![
            Ok(vec![comment("a", "hi"), comment("b", "hi"), comment("c", "hi")]),
            Ok(vec![comment("x", "hi")]),
        ]));
        let syncer = CommentSyncer::with_backend(
            test_config("m-1", 3000),
            signed_in_session(),
            Arc::new(EmptyCommentListener),
            backend,
        );

        syncer.refresh().await.unwrap();
        assert_eq!(syncer.comment_count().await, 3);

        // 显式拉取无视单调增长规则，无条件替换
        let replaced = syncer.refresh().await.unwrap();
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].id, "x");
    }

    /// 对接真实后端的端到端测试（需要本地服务，手动运行）
    #[tokio::test]
    #[ignore]
    async fn live_comment_sync() -> anyhow::Result<()> {
        init_test_logger();
        let login = crate::community::auth::login_async(
            "http://localhost:4000/api",
            "demo@gracelink.app".to_string(),
            "demo-password".to_string(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("登录失败: {}", e))?;

        let session = new_session_handle();
        *session.write().unwrap() = Some(login.user.clone());

        let config = CommentSyncerConfig::new(
            ContentRef::new(ContentKind::Devotional, "dev-1"),
            "http://localhost:4000/api".to_string(),
            login.token.clone(),
        );
        let syncer = CommentSyncer::new(config, session)?;
        let comments = syncer.refresh().await?;
        info!("拉取到 {} 条评论", comments.len());
        syncer.start().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        syncer.stop();
        Ok(())
    }
}
