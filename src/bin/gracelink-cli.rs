//! GraceLink CLI 客户端（测试版）
//!
//! 非交互式 CLI，用于测试和展示评论/点赞同步功能
//! 启动时通过命令行参数指定账号和内容项，自动登录后打开评论同步，
//! 持续输出同步事件；可选地提交一条评论或切换一次点赞

use anyhow::Result;
use clap::Parser;
use gracelink_sdk_core_rust::community::comment::listener::CommentListener;
use gracelink_sdk_core_rust::{login_async, CommunityClient, ContentKind, ContentRef};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

/// GraceLink CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "gracelink-cli")]
#[command(about = "GraceLink CLI 客户端 - 用于测试和展示评论/点赞同步", long_about = None)]
struct Args {
    /// 登录邮箱
    #[arg(short, long, default_value = "demo@gracelink.app")]
    email: String,

    /// 登录密码
    #[arg(short, long, default_value = "demo-password")]
    password: String,

    /// API 基础地址
    #[arg(long, default_value = "http://localhost:4000/api")]
    base_url: String,

    /// 内容类型（media | devotional | blog | post）
    #[arg(long, default_value = "devotional")]
    kind: String,

    /// 内容项 ID
    #[arg(long, default_value = "dev-1")]
    item_id: String,

    /// 启动后提交的评论内容（为空则不提交）
    #[arg(long, default_value = "")]
    comment: String,

    /// 是否切换一次点赞
    #[arg(long)]
    like: bool,

    /// 运行时长（秒），0 表示持续运行
    #[arg(short, long, default_value = "0")]
    duration: u64,

    /// 日志级别（默认: info,gracelink_sdk_core_rust=debug）
    #[arg(long, default_value = "info,gracelink_sdk_core_rust=debug")]
    log_level: String,
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str) {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // 创建日志文件（追加模式）
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("无法创建日志文件 debug.log");

    // 输出到 stdout（控制台），保留 ANSI 颜色代码用于终端显示
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    // 输出到文件，禁用 ANSI 颜色代码（文件不需要颜色）
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 日志已同时输出到控制台和文件: debug.log");
}

/// 评论同步监听器（输出所有同步事件）
struct CliCommentListener;

#[async_trait::async_trait]
impl CommentListener for CliCommentListener {
    async fn on_sync_start(&self, item_id: String) {
        info!("[CLI/Comment] 🔄 显式拉取开始: item={}", item_id);
    }

    async fn on_sync_finish(&self, item_id: String) {
        info!("[CLI/Comment] ✅ 显式拉取完成: item={}", item_id);
    }

    async fn on_sync_failed(&self, item_id: String, error: String) {
        error!("[CLI/Comment] ❌ 拉取失败: item={}, 错误: {}", item_id, error);
    }

    async fn on_comments_changed(&self, item_id: String, comments_json: String) {
        info!("[CLI/Comment] 💬 评论列表变更: item={}, {}", item_id, comments_json);
    }

    async fn on_comment_count_changed(&self, item_id: String, count: i64) {
        info!("[CLI/Comment] 🔢 评论数: item={}, count={}", item_id, count);
    }

    async fn on_submit_failed(&self, item_id: String, error: String) {
        error!(
            "[CLI/Comment] ❌ 评论提交失败（影子评论已回收）: item={}, 错误: {}",
            item_id, error
        );
    }
}

fn parse_kind(kind: &str) -> Result<ContentKind> {
    match kind {
        "media" => Ok(ContentKind::Media),
        "devotional" => Ok(ContentKind::Devotional),
        "blog" => Ok(ContentKind::BlogPost),
        "post" => Ok(ContentKind::CommunityPost),
        other => Err(anyhow::anyhow!("未知内容类型: {}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    init_logger(&args.log_level);

    info!("[CLI] 🚀 GraceLink CLI 客户端（测试模式）");
    info!("[CLI] 📧 邮箱: {}", args.email);
    info!("[CLI] 📖 内容项: {}/{}", args.kind, args.item_id);
    info!("[CLI] ⏱️  运行时长: {} 秒（0=持续运行）", args.duration);

    let kind = parse_kind(&args.kind)?;
    let item = ContentRef::new(kind, args.item_id.clone());

    // 登录
    info!("[CLI] 🔐 正在登录...");
    let login = login_async(&args.base_url, args.email.clone(), args.password.clone())
        .await
        .map_err(|e| anyhow::anyhow!("登录失败: {}", e))?;
    info!(
        "[CLI] ✅ 登录成功！用户: {} ({})",
        login.user.display_name(),
        login.user.id
    );

    // 创建客户端
    let mut client = CommunityClient::from_login(args.base_url.clone(), login)
        .map_err(|e| anyhow::anyhow!("创建客户端失败: {}", e))?;

    // 打开内容项并启动轮询
    info!("[CLI] 📖 打开内容项并启动评论同步...");
    let syncer = client
        .open_item(item.clone(), Arc::new(CliCommentListener))
        .await
        .map_err(|e| anyhow::anyhow!("打开内容项失败: {}", e))?;

    let comments = syncer.comments().await;
    info!("[CLI] 📋 当前评论（共 {} 条）:", comments.len());
    for comment in comments.iter().take(5) {
        info!(
            "[CLI]   - {} | {} | {}",
            comment.author_display_name,
            comment.timestamp,
            comment.content.chars().take(30).collect::<String>()
        );
    }

    // 可选：提交一条评论（乐观追加，立即可见）
    if !args.comment.is_empty() {
        info!("[CLI] ✏️ 提交评论: {}", args.comment);
        match syncer.submit_comment(&args.comment).await {
            Ok(comment) => info!("[CLI] ✅ 评论已入列: 本地ID={}", comment.id),
            Err(e) => error!("[CLI] ❌ 评论提交失败: {}", e),
        }
    }

    // 可选：切换一次点赞
    if args.like {
        info!("[CLI] 👍 切换点赞...");
        match client.toggle_like(&item).await {
            Ok(state) => info!(
                "[CLI] ✅ 点赞结果: likes={}, isLiked={}",
                state.likes, state.is_liked
            ),
            Err(e) => error!("[CLI] ❌ 点赞失败: {}", e),
        }
    }

    info!("[CLI] 📥 开始监听评论同步事件...");
    if args.duration > 0 {
        info!("[CLI] ⏰ {} 秒后自动退出", args.duration);
        sleep(Duration::from_secs(args.duration)).await;
        info!("[CLI] 👋 程序退出");
    } else {
        info!("[CLI] ⏰ 持续运行中，按 Ctrl+C 退出");
        // 持续运行直到被中断
        loop {
            sleep(Duration::from_secs(3600)).await;
        }
    }

    client.close_item();
    Ok(())
}
