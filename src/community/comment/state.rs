//! 本地评论合并状态
//!
//! 每个打开的内容项持有一份独立的 `CommentThread`，由同步器构造时传入，
//! 绝不使用模块级全局状态，多个同时打开的内容项互不干扰。
//!
//! 静默合并遵循单调增长规则：后台轮询只允许让列表变长，
//! 绝不允许用一个更短（或等长）的过期结果回退用户正在看的列表。

use crate::community::comment::types::Comment;
use crate::community::types::ContentRef;
use tracing::debug;

/// 单个内容项打开期间的评论合并状态
#[derive(Debug)]
pub struct CommentThread {
    /// 所属内容项
    item: ContentRef,
    /// 已提交（对外可见）的评论列表
    committed: Vec<Comment>,
    /// 上一次确认的列表长度，静默合并以它为基准
    last_known_len: usize,
}

impl CommentThread {
    /// 创建空状态
    pub fn new(item: ContentRef) -> Self {
        Self {
            item,
            committed: Vec::new(),
            last_known_len: 0,
        }
    }

    pub fn item(&self) -> &ContentRef {
        &self.item
    }

    pub fn comments(&self) -> &[Comment] {
        &self.committed
    }

    pub fn comment_count(&self) -> usize {
        self.committed.len()
    }

    /// 合并一次拉取结果，返回是否替换了已提交列表
    ///
    /// - 显式拉取（`silent == false`）：无条件替换，长度基准重置
    /// - 静默拉取：仅当新列表严格长于基准时替换，否则丢弃本次结果
    pub fn merge(&mut self, incoming: Vec<Comment>, silent: bool) -> bool {
        if !silent {
            self.last_known_len = incoming.len();
            self.committed = incoming;
            debug!(
                "[CommentState] 显式替换评论列表: item={}, 长度={}",
                self.item, self.last_known_len
            );
            return true;
        }

        if incoming.len() > self.last_known_len {
            debug!(
                "[CommentState] 静默合并生效: item={}, {} -> {}",
                self.item,
                self.last_known_len,
                incoming.len()
            );
            self.last_known_len = incoming.len();
            self.committed = incoming;
            true
        } else {
            debug!(
                "[CommentState] 静默结果被丢弃: item={}, 基准长度={}, 新长度={}",
                self.item,
                self.last_known_len,
                incoming.len()
            );
            false
        }
    }

    /// 乐观追加：用户提交后立即入列，长度基准同步抬高，
    /// 让下一次静默合并以追加后的长度为准
    pub fn optimistic_append(&mut self, comment: Comment) {
        self.committed.push(comment);
        self.last_known_len = self.committed.len();
    }

    /// 按 ID 移除评论（提交失败时回收影子评论），返回是否移除
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.committed.len();
        self.committed.retain(|c| c.id != id);
        let removed = self.committed.len() != before;
        if removed {
            self.last_known_len = self.committed.len();
        }
        removed
    }

    /// 切换到新内容项：清空列表、重置基准
    pub fn reset(&mut self, item: ContentRef) {
        self.item = item;
        self.committed.clear();
        self.last_known_len = 0;
    }
}
