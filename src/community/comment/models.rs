//! 评论同步器配置

use crate::community::types::ContentRef;

/// 默认的后台轮询间隔（毫秒）
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 3000;

/// 评论同步器配置
#[derive(Debug, Clone)]
pub struct CommentSyncerConfig {
    /// 当前打开的内容项
    pub item: ContentRef,
    /// API 基础 URL
    pub api_base_url: String,
    /// 认证 token
    pub token: String,
    /// 是否启用后台自动刷新
    pub auto_refresh: bool,
    /// 后台轮询间隔（毫秒），固定间隔，无抖动、无退避
    pub refresh_interval_ms: u64,
    /// 是否展示标题（展示层提示，SDK 原样透传给宿主）
    pub show_title: bool,
}

impl CommentSyncerConfig {
    /// 创建默认配置
    pub fn new(item: ContentRef, api_base_url: String, token: String) -> Self {
        Self {
            item,
            api_base_url,
            token,
            auto_refresh: true,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            show_title: true,
        }
    }
}
