use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(item_shop_watch_lib::run());

    // A pending stdin read would otherwise keep the runtime alive after Ctrl-C
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}
