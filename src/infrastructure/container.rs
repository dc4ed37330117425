use std::sync::Arc;

use crate::{
    application::{
        ports::{
            CredentialDecryptor, DatasourceResolver, EmbeddingProvider, MetadataExtractor,
            TextGenerator, VectorStore, datasource_resolver::PlaintextCredentials,
        },
        services::{
            ContextAssembler, EmbeddingService, LoadStateCache, RetrievalService,
            SchemaIndexerService, SqlKnowledgeBaseService, VectorStoreService,
        },
        use_cases::{
            AddSqlExampleUseCase, GenerateSqlUseCase, GetIndexStatusUseCase,
            IndexDatasourceUseCase, RebuildKnowledgeBaseUseCase, RemoveSqlExampleUseCase,
            RetrievalDefaults, RetrieveContextUseCase, SearchSqlExamplesUseCase,
        },
    },
    domain::repositories::{
        SchemaDescriptorRepository, SqlExampleRepository, TableRelationRepository,
    },
    infrastructure::{
        config::{AppConfig, VectorStoreBackend},
        database::{
            create_connection_pool,
            repositories::{
                PostgresDatasourceResolver, PostgresSchemaDescriptorRepository,
                PostgresSqlExampleRepository, PostgresTableRelationRepository,
            },
            run_migrations,
        },
        external_services::{
            ChatCompletionClient, CompositeMetadataExtractor, InferenceEmbeddingProvider,
        },
        vector_store::{InMemoryVectorStore, PgVectorStore},
    },
    presentation::http::handlers::{DatasourceHandler, SqlExampleHandler},
};

pub struct AppContainer {
    // Repositories
    pub descriptor_repository: Arc<dyn SchemaDescriptorRepository>,
    pub relation_repository: Arc<dyn TableRelationRepository>,
    pub sql_example_repository: Arc<dyn SqlExampleRepository>,
    pub datasource_resolver: Arc<dyn DatasourceResolver>,

    // External Services
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub metadata_extractor: Arc<dyn MetadataExtractor>,
    pub vector_store: Arc<dyn VectorStore>,
    pub text_generator: Option<Arc<dyn TextGenerator>>,

    // Application Services
    pub embedding_service: Arc<EmbeddingService>,
    pub vector_store_service: Arc<VectorStoreService>,
    pub schema_indexer: Arc<SchemaIndexerService>,
    pub knowledge_base: Arc<SqlKnowledgeBaseService>,
    pub retrieval_service: Arc<RetrievalService>,
    pub context_assembler: Arc<ContextAssembler>,

    // Use Cases
    pub index_datasource_use_case: Arc<IndexDatasourceUseCase>,
    pub get_index_status_use_case: Arc<GetIndexStatusUseCase>,
    pub retrieve_context_use_case: Arc<RetrieveContextUseCase>,
    pub generate_sql_use_case: Arc<GenerateSqlUseCase>,
    pub search_sql_examples_use_case: Arc<SearchSqlExamplesUseCase>,
    pub add_sql_example_use_case: Arc<AddSqlExampleUseCase>,
    pub remove_sql_example_use_case: Arc<RemoveSqlExampleUseCase>,
    pub rebuild_knowledge_base_use_case: Arc<RebuildKnowledgeBaseUseCase>,

    // HTTP Handlers
    pub datasource_handler: Arc<DatasourceHandler>,
    pub sql_example_handler: Arc<SqlExampleHandler>,
}

impl AppContainer {
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // Metadata database: datasources, schema mirror, relations, SQL catalog
        let db_pool = create_connection_pool(&config.database_url, config.database_pool_size)?;
        if let Err(e) = run_migrations(&db_pool) {
            tracing::error!("Failed to run database migrations: {}", e);
        }

        let descriptor_repository: Arc<dyn SchemaDescriptorRepository> =
            Arc::new(PostgresSchemaDescriptorRepository::new(db_pool.clone()));
        let relation_repository: Arc<dyn TableRelationRepository> =
            Arc::new(PostgresTableRelationRepository::new(db_pool.clone()));
        let sql_example_repository: Arc<dyn SqlExampleRepository> =
            Arc::new(PostgresSqlExampleRepository::new(db_pool.clone()));
        let decryptor: Arc<dyn CredentialDecryptor> = Arc::new(PlaintextCredentials);
        let datasource_resolver: Arc<dyn DatasourceResolver> =
            Arc::new(PostgresDatasourceResolver::new(db_pool.clone(), decryptor));

        // External services
        let embedding_provider: Arc<dyn EmbeddingProvider> =
            Arc::new(InferenceEmbeddingProvider::from_config(&config.embedding)?);
        let metadata_extractor: Arc<dyn MetadataExtractor> =
            Arc::new(CompositeMetadataExtractor::default());

        let vector_store: Arc<dyn VectorStore> = match config.vector_store_backend {
            VectorStoreBackend::PgVector => {
                let vector_pool = if config.vector_database_url == config.database_url {
                    db_pool.clone()
                } else {
                    create_connection_pool(&config.vector_database_url, config.database_pool_size)?
                };
                Arc::new(PgVectorStore::new(vector_pool))
            }
            VectorStoreBackend::Memory => {
                tracing::warn!("Using in-memory vector store; vectors are lost on restart");
                Arc::new(InMemoryVectorStore::new())
            }
        };

        let text_generator: Option<Arc<dyn TextGenerator>> =
            match ChatCompletionClient::from_config(&config.llm)? {
                Some(client) => Some(Arc::new(client)),
                None => {
                    tracing::info!("LLM_SERVICE_URL not set, SQL generation disabled");
                    None
                }
            };

        // Application services
        let embedding_service = Arc::new(
            EmbeddingService::new(embedding_provider.clone(), config.embedding.dimension)
                .with_concurrency(config.embedding.concurrency),
        );
        let vector_store_service = Arc::new(VectorStoreService::new(
            vector_store.clone(),
            Arc::new(LoadStateCache::new()),
            config.embedding.dimension,
            config.collections.index,
        ));

        let schema_indexer = Arc::new(SchemaIndexerService::new(
            datasource_resolver.clone(),
            metadata_extractor.clone(),
            descriptor_repository.clone(),
            relation_repository.clone(),
            embedding_service.clone(),
            vector_store_service.clone(),
            config.collections.schema.clone(),
        ));

        let knowledge_base = Arc::new(SqlKnowledgeBaseService::new(
            sql_example_repository.clone(),
            embedding_service.clone(),
            vector_store_service.clone(),
            config.collections.sql.clone(),
        ));

        let retrieval_service = Arc::new(
            RetrievalService::new(
                embedding_service.clone(),
                vector_store_service.clone(),
                descriptor_repository.clone(),
                config.collections.schema.clone(),
            )
            .with_overfetch(config.retrieval.overfetch),
        );

        let context_assembler = Arc::new(ContextAssembler::new(
            config.retrieval.default_language,
            config.retrieval.max_result_rows,
        ));

        // Use cases
        let index_datasource_use_case =
            Arc::new(IndexDatasourceUseCase::new(schema_indexer.clone()));
        let get_index_status_use_case = Arc::new(GetIndexStatusUseCase::new(schema_indexer.clone()));

        let retrieve_context_use_case = Arc::new(RetrieveContextUseCase::new(
            retrieval_service.clone(),
            knowledge_base.clone(),
            relation_repository.clone(),
            context_assembler.clone(),
            RetrievalDefaults {
                top_k: config.retrieval.top_k,
                min_score: config.retrieval.min_score,
                sql_example_top_k: config.retrieval.sql_example_top_k,
            },
        ));

        let generate_sql_use_case = Arc::new(GenerateSqlUseCase::new(
            retrieve_context_use_case.clone(),
            text_generator.clone(),
        ));

        let search_sql_examples_use_case = Arc::new(SearchSqlExamplesUseCase::new(
            knowledge_base.clone(),
            config.retrieval.sql_example_top_k,
        ));
        let add_sql_example_use_case = Arc::new(AddSqlExampleUseCase::new(
            sql_example_repository.clone(),
            knowledge_base.clone(),
        ));
        let remove_sql_example_use_case =
            Arc::new(RemoveSqlExampleUseCase::new(knowledge_base.clone()));
        let rebuild_knowledge_base_use_case =
            Arc::new(RebuildKnowledgeBaseUseCase::new(knowledge_base.clone()));

        // HTTP handlers
        let datasource_handler = Arc::new(DatasourceHandler::new(
            index_datasource_use_case.clone(),
            get_index_status_use_case.clone(),
            retrieve_context_use_case.clone(),
            generate_sql_use_case.clone(),
        ));

        let sql_example_handler = Arc::new(SqlExampleHandler::new(
            search_sql_examples_use_case.clone(),
            add_sql_example_use_case.clone(),
            remove_sql_example_use_case.clone(),
            rebuild_knowledge_base_use_case.clone(),
        ));

        Ok(Self {
            descriptor_repository,
            relation_repository,
            sql_example_repository,
            datasource_resolver,
            embedding_provider,
            metadata_extractor,
            vector_store,
            text_generator,
            embedding_service,
            vector_store_service,
            schema_indexer,
            knowledge_base,
            retrieval_service,
            context_assembler,
            index_datasource_use_case,
            get_index_status_use_case,
            retrieve_context_use_case,
            generate_sql_use_case,
            search_sql_examples_use_case,
            add_sql_example_use_case,
            remove_sql_example_use_case,
            rebuild_knowledge_base_use_case,
            datasource_handler,
            sql_example_handler,
        })
    }
}
