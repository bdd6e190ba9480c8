use std::collections::HashSet;
use std::path::Path;
use std::sync::RwLock;

use tantivy::{
    Index, IndexReader, IndexSettings, IndexWriter, TantivyDocument,
    collector::{Count, MultiCollector, TopDocs},
    directory::MmapDirectory,
    query::{PhrasePrefixQuery, Query, QueryParser, TermQuery},
    schema::{Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value},
};
use tracing::{info, warn};
use uuid::Uuid;

/// Full-text index over published post titles and tag slugs.
/// Kept coherent with the post-info cache; disk-persisted so restarts do not
/// pay a full rebuild.
pub struct PostSearchIndex {
    index: Index,
    reader: IndexReader,
    writer: RwLock<IndexWriter>,
    // Schema fields
    post_id_field: Field,
    title_field: Field,
    tags_field: Field,
}

impl PostSearchIndex {
    fn build_schema() -> (Schema, Field, Field, Field) {
        let mut schema_builder = Schema::builder();

        // Post ID stored as string for retrieval
        let post_id_field = schema_builder.add_text_field("post_id", STRING | STORED);

        // Title field, tokenized for full-text search
        let text_field_indexing = TextFieldIndexing::default()
            .set_tokenizer("default")
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let text_options = TextOptions::default()
            .set_indexing_options(text_field_indexing)
            .set_stored();
        let title_field = schema_builder.add_text_field("title", text_options);

        // Tag slugs as exact terms
        let tags_field = schema_builder.add_text_field("tags", STRING | STORED);

        let schema = schema_builder.build();
        (schema, post_id_field, title_field, tags_field)
    }

    /// In-memory index, used by tests.
    pub fn new_in_memory() -> anyhow::Result<Self> {
        let (schema, post_id_field, title_field, tags_field) = Self::build_schema();

        let index = Index::create_in_ram(schema);
        let writer = index.writer(50_000_000)?;
        let reader = index.reader()?;

        Ok(Self {
            index,
            reader,
            writer: RwLock::new(writer),
            post_id_field,
            title_field,
            tags_field,
        })
    }

    /// Open or create a disk-persisted index; a corrupted index directory is
    /// cleared and recreated rather than failing startup.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let (schema, post_id_field, title_field, tags_field) = Self::build_schema();

        if !path.exists() {
            std::fs::create_dir_all(path)?;
            info!(path = %path.display(), "Created search index directory");
        }

        let index = match MmapDirectory::open(path) {
            Ok(dir) => match Index::open(dir) {
                Ok(idx) => {
                    info!(path = %path.display(), "Opened existing search index");
                    idx
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to open index, creating new one");
                    Self::clear_directory(path)?;
                    let dir = MmapDirectory::open(path)?;
                    Index::create(dir, schema.clone(), IndexSettings::default())?
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to open directory, creating new index");
                Self::clear_directory(path)?;
                let dir = MmapDirectory::open(path)?;
                Index::create(dir, schema.clone(), IndexSettings::default())?
            }
        };

        let writer = index.writer(50_000_000)?;
        let reader = index.reader()?;

        Ok(Self {
            index,
            reader,
            writer: RwLock::new(writer),
            post_id_field,
            title_field,
            tags_field,
        })
    }

    fn clear_directory(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() {
                    std::fs::remove_file(&path)?;
                }
            }
        }
        Ok(())
    }

    pub fn get_indexed_post_ids(&self) -> anyhow::Result<HashSet<Uuid>> {
        let searcher = self.reader.searcher();
        let mut post_ids = HashSet::new();

        for segment_reader in searcher.segment_readers() {
            let store_reader = segment_reader.get_store_reader(1)?;
            for doc_id in segment_reader.doc_ids_alive() {
                if let Ok(doc) = store_reader.get::<TantivyDocument>(doc_id)
                    && let Some(post_id_value) = doc.get_first(self.post_id_field)
                    && let Some(post_id_str) = post_id_value.as_str()
                    && let Ok(uuid) = Uuid::parse_str(post_id_str)
                {
                    post_ids.insert(uuid);
                }
            }
        }

        Ok(post_ids)
    }

    /// Returns (missing_from_index, extra_in_index) against the expected set.
    pub fn check_coherence(
        &self,
        expected_post_ids: &HashSet<Uuid>,
    ) -> anyhow::Result<(Vec<Uuid>, Vec<Uuid>)> {
        let indexed_ids = self.get_indexed_post_ids()?;

        let missing: Vec<Uuid> = expected_post_ids
            .difference(&indexed_ids)
            .copied()
            .collect();

        let extra: Vec<Uuid> = indexed_ids.difference(expected_post_ids).copied().collect();

        Ok((missing, extra))
    }

    /// Index a single post. Call commit() after batch operations.
    pub fn index_post(
        &self,
        post_id: Uuid,
        title: &str,
        tag_slugs: &[String],
    ) -> anyhow::Result<()> {
        let mut doc = TantivyDocument::new();
        doc.add_text(self.post_id_field, post_id.to_string());
        doc.add_text(self.title_field, title);

        // Each slug as a separate field value for exact term matching
        for tag_slug in tag_slugs {
            doc.add_text(self.tags_field, tag_slug.to_lowercase());
        }

        let writer = self
            .writer
            .write()
            .map_err(|e| anyhow::anyhow!("Writer lock poisoned: {}", e))?;
        writer.add_document(doc)?;

        Ok(())
    }

    pub fn remove_post(&self, post_id: Uuid) -> anyhow::Result<()> {
        let term = tantivy::Term::from_field_text(self.post_id_field, &post_id.to_string());
        let writer = self
            .writer
            .write()
            .map_err(|e| anyhow::anyhow!("Writer lock poisoned: {}", e))?;
        writer.delete_term(term);
        Ok(())
    }

    /// Commit pending changes and reload the reader.
    pub fn commit(&self) -> anyhow::Result<()> {
        let mut writer = self
            .writer
            .write()
            .map_err(|e| anyhow::anyhow!("Writer lock poisoned: {}", e))?;
        writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    fn build_title_query(&self, query_str: &str) -> anyhow::Result<Box<dyn Query>> {
        // Single bare term: prefix match, so partially typed titles hit.
        let trimmed = query_str.trim();
        if trimmed.split_whitespace().count() == 1 {
            let normalized: String = trimmed
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if !normalized.is_empty() {
                let term = tantivy::Term::from_field_text(self.title_field, &normalized);
                return Ok(Box::new(PhrasePrefixQuery::new(vec![term])));
            }
        }

        let query_parser = QueryParser::for_index(&self.index, vec![self.title_field]);
        Ok(query_parser.parse_query(query_str)?)
    }

    fn collect_post_ids(
        &self,
        query: &dyn Query,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<(Vec<Uuid>, usize)> {
        let searcher = self.reader.searcher();
        let fetch_limit = limit.saturating_add(offset);
        let mut collectors = MultiCollector::new();
        let top_docs_handle = collectors.add_collector(TopDocs::with_limit(fetch_limit.max(1)).order_by_score());
        let count_handle = collectors.add_collector(Count);
        let mut multi_fruit = searcher.search(query, &collectors)?;

        let total_matches = count_handle.extract(&mut multi_fruit);
        let top_docs = top_docs_handle.extract(&mut multi_fruit);

        let mut results = Vec::with_capacity(limit.min(top_docs.len()));
        for (_score, doc_address) in top_docs.into_iter().skip(offset).take(limit) {
            let retrieved_doc: TantivyDocument = searcher.doc(doc_address)?;
            if let Some(post_id_value) = retrieved_doc.get_first(self.post_id_field)
                && let Some(post_id_str) = post_id_value.as_str()
                && let Ok(uuid) = Uuid::parse_str(post_id_str)
            {
                results.push(uuid);
            }
        }

        Ok((results, total_matches))
    }

    /// Title search with pagination. Returns (post_ids, total_matches).
    pub fn search_by_title_paged(
        &self,
        query_str: &str,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<(Vec<Uuid>, usize)> {
        let query = self.build_title_query(query_str)?;
        self.collect_post_ids(&*query, offset, limit)
    }

    /// Exact tag-slug search with pagination. Returns (post_ids, total_matches).
    pub fn search_by_tag_paged(
        &self,
        tag_slug: &str,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<(Vec<Uuid>, usize)> {
        let term = tantivy::Term::from_field_text(self.tags_field, &tag_slug.to_lowercase());
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        self.collect_post_ids(&query, offset, limit)
    }

    /// Clear and re-index everything.
    pub fn rebuild_index<'a, I>(&self, posts: I) -> anyhow::Result<usize>
    where
        I: Iterator<Item = (Uuid, &'a str, Vec<String>)>,
    {
        {
            let mut writer = self
                .writer
                .write()
                .map_err(|e| anyhow::anyhow!("Writer lock poisoned: {}", e))?;
            writer.delete_all_documents()?;
            writer.commit()?;
        }

        let mut count = 0;
        for (post_id, title, tag_slugs) in posts {
            self.index_post(post_id, title, &tag_slugs)?;
            count += 1;
        }

        self.commit()?;
        info!(posts_indexed = count, "Search index rebuilt");

        Ok(count)
    }

    /// Incrementally add missing posts and drop extra ones. Cheaper than a
    /// full rebuild when only a few posts differ.
    pub fn sync_with_posts<'a, I>(&self, posts: I) -> anyhow::Result<(usize, usize)>
    where
        I: Iterator<Item = (Uuid, &'a str, Vec<String>)>,
    {
        let posts_vec: Vec<_> = posts.collect();
        let expected_ids: HashSet<Uuid> = posts_vec.iter().map(|(id, _, _)| *id).collect();

        let (missing, extra) = self.check_coherence(&expected_ids)?;

        for post_id in &extra {
            self.remove_post(*post_id)?;
        }

        let missing_set: HashSet<Uuid> = missing.iter().copied().collect();
        for (post_id, title, tag_slugs) in &posts_vec {
            if missing_set.contains(post_id) {
                self.index_post(*post_id, title, tag_slugs)?;
            }
        }

        if !missing.is_empty() || !extra.is_empty() {
            self.commit()?;
            info!(
                added = missing.len(),
                removed = extra.len(),
                "Search index synchronized"
            );
        }

        Ok((missing.len(), extra.len()))
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_index() -> PostSearchIndex {
        let index = PostSearchIndex::new_in_memory().unwrap();
        index
            .index_post(
                Uuid::new_v4(),
                "Writing async Rust services",
                &["rust".to_string(), "async".to_string()],
            )
            .unwrap();
        index
            .index_post(
                Uuid::new_v4(),
                "Gardening notes for spring",
                &["gardening".to_string()],
            )
            .unwrap();
        index.commit().unwrap();
        index
    }

    #[test]
    fn title_search_finds_matching_posts() {
        let index = seeded_index();
        let (ids, total) = index.search_by_title_paged("async", 0, 10).unwrap();
        assert_eq!(total, 1);
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn single_term_query_is_prefix_matched() {
        let index = seeded_index();
        let (ids, _) = index.search_by_title_paged("garden", 0, 10).unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn tag_search_matches_exact_slug_only() {
        let index = seeded_index();
        let (ids, _) = index.search_by_tag_paged("rust", 0, 10).unwrap();
        assert_eq!(ids.len(), 1);
        let (ids, _) = index.search_by_tag_paged("rus", 0, 10).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn sync_removes_stale_documents() {
        let index = seeded_index();
        let keep_id = Uuid::new_v4();
        let (added, removed) = index
            .sync_with_posts(vec![(keep_id, "Fresh post", vec!["rust".to_string()])].into_iter())
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(removed, 2);
        assert_eq!(index.num_docs(), 1);
    }
}
