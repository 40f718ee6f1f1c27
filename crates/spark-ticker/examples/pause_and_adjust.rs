//! 演示：以 250ms 节律打印节拍，一秒后暂停，再过一秒调整为 50ms（同时恢复），300ms 后退出。
//!
//! 运行：`RUST_LOG=spark_ticker=debug cargo run -p spark-ticker --example pause_and_adjust`

use std::time::Duration;

use spark_ticker::logging::init_tracing;
use spark_ticker::{Ticker, TickerError};
use tokio::time::Instant;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), TickerError> {
    if let Err(err) = init_tracing() {
        eprintln!("tracing subscriber already installed: {err}");
    }

    let mut ticker = Ticker::try_new(Duration::from_millis(250))?;
    let handle = ticker.handle();
    let origin = Instant::now();

    let printer = tokio::spawn(async move {
        while let Some(tick) = ticker.recv().await {
            println!("tick at +{:?}", tick.duration_since(origin));
        }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.stop().await;

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.adjust(Duration::from_millis(50)).await?;

    tokio::time::sleep(Duration::from_millis(300)).await;
    printer.abort();
    Ok(())
}
