#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = resolutions_server::config::Config::from_env()?;
    resolutions_server::web::start_web_server(config).await
}
