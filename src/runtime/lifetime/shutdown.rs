use tokio::signal;
use tracing::{error, warn};

/// 等待 Ctrl+C，收到后返回以触发优雅关闭
pub async fn listen_for_shutdown() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        // 无法监听信号时不主动退出，交给服务器自身的信号处理
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
}
