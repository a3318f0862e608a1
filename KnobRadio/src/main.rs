use knobserver::ServerBuilder;
use knobweb::NowPlayingExt;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========== PHASE 1 : Infrastructure ==========

    let mut server = ServerBuilder::new_configured().build();
    server.init_logging().await;

    let info = server.info();
    let started = std::time::Instant::now();
    server
        .add_route("/api/server/info", move || {
            let mut info = info.clone();
            async move {
                info.uptime_secs = started.elapsed().as_secs();
                serde_json::json!(info)
            }
        })
        .await;

    // ========== PHASE 2 : Now-playing service ==========

    info!("Initializing now-playing aggregation...");
    let state = server.init_now_playing().await?;
    info!("Streaming from {}", state.public_stream_url);

    server.add_redirect("/", "/dashboard").await;

    // ========== PHASE 3 : HTTP server ==========

    info!("Starting HTTP server...");
    server.start().await;

    info!("KNOB Radio is ready!");
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
