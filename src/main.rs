use schemarag::infrastructure::{AppConfig, AppContainer};
use schemarag::presentation::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;
    let container = AppContainer::new(&config).await?;

    // The server comes up even when the knowledge base cannot be built; search then
    // returns no examples until a rebuild succeeds.
    let knowledge_base = container.knowledge_base.clone();
    tokio::spawn(async move {
        match knowledge_base.initialize().await {
            Ok(report) => tracing::info!("SQL knowledge base ready: {:?}", report),
            Err(e) => tracing::error!("SQL knowledge base initialization failed: {}", e),
        }
    });

    tracing::info!("Starting server on port {}", config.server_port);

    HttpServer::new(
        container.datasource_handler.clone(),
        container.sql_example_handler.clone(),
        container.embedding_service.clone(),
        Some(config.server_port),
    )
    .run()
    .await
}
