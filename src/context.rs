//! Shared workflow context
//!
//! Built once at startup: loads the corpus, embeds it into the vector index and
//! wires the workflow components. Afterwards it is read-only and can be shared
//! across concurrent runs.

use std::sync::Arc;

use scribe_agentic::{create_llm_client, SharedLlmClient};
use scribe_semantic::{CachedEmbedder, OpenAIEmbedder, SharedEmbedder, VectorIndex};
use tracing::info;

use crate::config::ScribeConfig;
use crate::corpus::{load_initiatives, load_work_items, Corpus, EpicColumns, TicketColumns};
use crate::error::ContextError;
use crate::extractor::TaskExtractor;
use crate::judge::RelevanceJudge;
use crate::resolver::InitiativeResolver;
use crate::retrieval::multi_query::DEFAULT_VARIANT_COUNT;
use crate::retrieval::{
    MultiQueryStrategy, NearestNeighbourStrategy, RelevanceRetriever, RetrievalStrategy,
    DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K,
};
use crate::search::{KnowledgeFetcher, SharedWebSearch, TavilyClient};
use crate::synthesizer::ProposalSynthesizer;

/// Documents per embedding request while building the index
pub const DEFAULT_EMBED_BATCH: usize = 64;

/// Everything a workflow run needs
pub struct ScribeContext {
    corpus: Arc<Corpus>,
    retriever: RelevanceRetriever,
    resolver: InitiativeResolver,
    judge: RelevanceJudge,
    extractor: TaskExtractor,
    fetcher: KnowledgeFetcher,
    synthesizer: ProposalSynthesizer,
    model_name: String,
}

impl ScribeContext {
    pub fn builder() -> ScribeContextBuilder {
        ScribeContextBuilder::default()
    }

    /// Read [`ScribeConfig`] from the environment, then build as [`Self::from_config`]
    pub async fn from_env() -> Result<Self, ContextError> {
        let config = ScribeConfig::from_env()?;
        Self::from_config(&config).await
    }

    /// Load the CSV corpus and connect the configured providers
    pub async fn from_config(config: &ScribeConfig) -> Result<Self, ContextError> {
        let items = load_work_items(&config.tickets_csv, &TicketColumns::default())?;
        let initiatives = load_initiatives(&config.epics_csv, &EpicColumns::default())?;

        let llm = create_llm_client(config.openai_api_key.clone(), config.chat_model.as_deref())
            .map_err(ContextError::Client)?;

        let embedder: SharedEmbedder = Arc::new(CachedEmbedder::new(Arc::new(
            OpenAIEmbedder::for_model(config.openai_api_key.clone(), &config.embedding_model),
        )));

        let search = TavilyClient::new(config.tavily_api_key.clone())
            .with_max_results(config.search_results);

        Self::builder()
            .corpus(Corpus::new(items, initiatives))
            .llm(llm)
            .embedder(embedder)
            .web_search(Arc::new(search))
            .top_k(config.top_k)
            .min_similarity(config.min_similarity)
            .query_variants(config.query_variants)
            .build()
            .await
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn retriever(&self) -> &RelevanceRetriever {
        &self.retriever
    }

    pub fn resolver(&self) -> &InitiativeResolver {
        &self.resolver
    }

    pub fn judge(&self) -> &RelevanceJudge {
        &self.judge
    }

    pub fn extractor(&self) -> &TaskExtractor {
        &self.extractor
    }

    pub fn fetcher(&self) -> &KnowledgeFetcher {
        &self.fetcher
    }

    pub fn synthesizer(&self) -> &ProposalSynthesizer {
        &self.synthesizer
    }

    /// Chat model serving the judge, paraphraser and synthesizer
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Builder for [`ScribeContext`]
///
/// Corpus, LLM client and embedder are required. Without an explicit web
/// search, Tavily is configured from `TAVILY_API_KEY`.
pub struct ScribeContextBuilder {
    corpus: Option<Corpus>,
    llm: Option<SharedLlmClient>,
    embedder: Option<SharedEmbedder>,
    web_search: Option<SharedWebSearch>,
    top_k: usize,
    min_similarity: f32,
    query_variants: usize,
    embed_batch: usize,
}

impl Default for ScribeContextBuilder {
    fn default() -> Self {
        Self {
            corpus: None,
            llm: None,
            embedder: None,
            web_search: None,
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            query_variants: DEFAULT_VARIANT_COUNT,
            embed_batch: DEFAULT_EMBED_BATCH,
        }
    }
}

impl ScribeContextBuilder {
    pub fn corpus(mut self, corpus: Corpus) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn llm(mut self, llm: SharedLlmClient) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn embedder(mut self, embedder: SharedEmbedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn web_search(mut self, web_search: SharedWebSearch) -> Self {
        self.web_search = Some(web_search);
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn query_variants(mut self, query_variants: usize) -> Self {
        self.query_variants = query_variants;
        self
    }

    pub fn embed_batch(mut self, embed_batch: usize) -> Self {
        self.embed_batch = embed_batch;
        self
    }

    /// Embed the corpus and assemble the components
    pub async fn build(self) -> Result<ScribeContext, ContextError> {
        let corpus = Arc::new(self.corpus.ok_or(ContextError::MissingComponent("corpus"))?);
        let llm = self.llm.ok_or(ContextError::MissingComponent("llm client"))?;
        let embedder = self
            .embedder
            .ok_or(ContextError::MissingComponent("embedder"))?;
        let web_search = self
            .web_search
            .unwrap_or_else(|| Arc::new(TavilyClient::from_env()));

        let index = Arc::new(
            VectorIndex::build(embedder.as_ref(), &corpus.bodies(), self.embed_batch).await?,
        );

        let nearest = NearestNeighbourStrategy::new(embedder, index)
            .with_k(self.top_k)
            .with_min_similarity(self.min_similarity);
        let multi_query = MultiQueryStrategy::new(llm.clone(), nearest.clone())
            .with_variant_count(self.query_variants);
        let strategies: Vec<Arc<dyn RetrievalStrategy>> =
            vec![Arc::new(nearest), Arc::new(multi_query)];

        info!(
            tickets = corpus.len(),
            epics = corpus.initiatives().len(),
            model = llm.model_name(),
            "Scribe context ready"
        );

        Ok(ScribeContext {
            retriever: RelevanceRetriever::new(corpus.clone(), strategies).with_top_k(self.top_k),
            resolver: InitiativeResolver::new(corpus.clone()),
            judge: RelevanceJudge::new(llm.clone()),
            extractor: TaskExtractor::new(corpus.clone()),
            fetcher: KnowledgeFetcher::new(web_search),
            synthesizer: ProposalSynthesizer::new(llm.clone()),
            model_name: llm.model_name().to_string(),
            corpus,
        })
    }
}
