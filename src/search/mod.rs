//! Tantivy-based search index module.
//!
//! One index covers tasks, projects and users; every document carries a
//! `kind` discriminator so results can be split per entity type. The index
//! stores only ids and scores; handlers hydrate full rows from the database.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{Project, Task, User};

/// Document kind discriminators.
pub const KIND_TASK: &str = "task";
pub const KIND_PROJECT: &str = "project";
pub const KIND_USER: &str = "user";

/// Field boost values: names first, free text second, tags/location last.
const BOOST_TITLE: f32 = 10.0;
const BOOST_BODY: f32 = 6.0;
const BOOST_EXTRA: f32 = 3.0;

/// Search result referencing an entity by kind and id.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub kind: String,
    pub entity_id: String,
    pub score: f32,
}

/// Search index schema fields.
struct SearchFields {
    kind: Field,
    entity_id: Field,
    title: Field,
    body: Field,
    extra: Field,
}

/// Tantivy search index over tasks, projects and users.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        // Define schema. Ids use the raw tokenizer so delete-by-term works.
        let mut schema_builder = Schema::builder();
        let kind = schema_builder.add_text_field("kind", STRING | STORED);
        let entity_id = schema_builder.add_text_field("entity_id", STRING | STORED);
        let title = schema_builder.add_text_field("title", TEXT | STORED);
        let body = schema_builder.add_text_field("body", TEXT);
        let extra = schema_builder.add_text_field("extra", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            kind,
            entity_id,
            title,
            body,
            extra,
        };

        // Try to open existing index or create new one
        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from the database contents.
    pub async fn rebuild(
        &self,
        tasks: &[Task],
        projects: &[Project],
        users: &[User],
    ) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;

        for task in tasks {
            writer.add_document(self.task_document(task))?;
        }
        for project in projects {
            writer.add_document(self.project_document(project))?;
        }
        for user in users {
            writer.add_document(self.user_document(user))?;
        }

        writer.commit()?;
        self.reader.reload()?;

        tracing::info!(
            "Search index rebuilt with {} tasks, {} projects, {} users",
            tasks.len(),
            projects.len(),
            users.len()
        );
        Ok(())
    }

    /// Index or re-index a single task.
    pub async fn index_task(&self, task: &Task) -> Result<(), AppError> {
        self.replace(&task.id, self.task_document(task)).await
    }

    /// Index or re-index a single project.
    pub async fn index_project(&self, project: &Project) -> Result<(), AppError> {
        self.replace(&project.id, self.project_document(project)).await
    }

    /// Index or re-index a single user.
    pub async fn index_user(&self, user: &User) -> Result<(), AppError> {
        self.replace(&user.id, self.user_document(user)).await
    }

    /// Remove an entity from the index.
    pub async fn remove(&self, entity_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        let term = tantivy::Term::from_field_text(self.fields.entity_id, entity_id);
        writer.delete_term(term);
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    async fn replace(&self, entity_id: &str, doc: TantivyDocument) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        let term = tantivy::Term::from_field_text(self.fields.entity_id, entity_id);
        writer.delete_term(term);
        writer.add_document(doc)?;
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Search across all kinds, returning hits ranked by relevance.
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<SearchHit>, AppError> {
        if query_str.trim().is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let query_parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.title, self.fields.body, self.fields.extra],
        );

        let base_query = query_parser
            .parse_query(query_str)
            .map_err(|e| AppError::Search(format!("Invalid search query: {}", e)))?;

        // Field-specific boosted queries combined with OR semantics
        let field_queries = [
            (self.fields.title, BOOST_TITLE),
            (self.fields.body, BOOST_BODY),
            (self.fields.extra, BOOST_EXTRA),
        ];

        let mut subqueries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();
        for (field, boost) in field_queries {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            if let Ok(field_query) = field_parser.parse_query(query_str) {
                let boosted = BoostQuery::new(field_query, boost);
                subqueries.push((Occur::Should, Box::new(boosted)));
            }
        }

        let combined_query = if subqueries.is_empty() {
            base_query
        } else {
            Box::new(BooleanQuery::new(subqueries))
        };

        let top_docs = searcher
            .search(&combined_query, &TopDocs::with_limit(limit))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results: Vec<SearchHit> = top_docs
            .into_iter()
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let kind = doc.get_first(self.fields.kind)?.as_str()?.to_string();
                let entity_id = doc.get_first(self.fields.entity_id)?.as_str()?.to_string();
                Some(SearchHit {
                    kind,
                    entity_id,
                    score,
                })
            })
            .collect();

        Ok(results)
    }

    fn task_document(&self, task: &Task) -> TantivyDocument {
        doc!(
            self.fields.kind => KIND_TASK,
            self.fields.entity_id => task.id.clone(),
            self.fields.title => task.title.clone(),
            self.fields.body => task.description.clone().unwrap_or_default(),
            self.fields.extra => task.tags.join(" ")
        )
    }

    fn project_document(&self, project: &Project) -> TantivyDocument {
        doc!(
            self.fields.kind => KIND_PROJECT,
            self.fields.entity_id => project.id.clone(),
            self.fields.title => project.name.clone(),
            self.fields.body => project.description.clone().unwrap_or_default(),
            self.fields.extra => project.location.clone().unwrap_or_default()
        )
    }

    fn user_document(&self, user: &User) -> TantivyDocument {
        doc!(
            self.fields.kind => KIND_USER,
            self.fields.entity_id => user.id.clone(),
            self.fields.title => user.display_name.clone(),
            self.fields.body => String::new(),
            self.fields.extra => String::new()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};
    use tempfile::TempDir;

    fn create_test_task(id: &str, title: &str, description: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            tags: Vec::new(),
            start_date: None,
            due_date: None,
            points: None,
            project_id: "p1".to_string(),
            author_id: "u1".to_string(),
            assignee_ids: Vec::new(),
            attachments: Vec::new(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_index_creation() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let tasks = vec![
            create_test_task("1", "Pour foundation slab", "Concrete pour for block A"),
            create_test_task("2", "Electrical rough-in", "First-floor wiring"),
        ];

        index.rebuild(&tasks, &[], &[]).await.unwrap();

        let results = index.search("foundation", 10).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].entity_id, "1");
        assert_eq!(results[0].kind, KIND_TASK);
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let results = index.search("", 10).unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_remove_entity() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let tasks = vec![create_test_task("1", "Pour foundation slab", "Concrete")];
        index.rebuild(&tasks, &[], &[]).await.unwrap();

        index.remove("1").await.unwrap();
        let results = index.search("foundation", 10).unwrap();
        assert!(results.is_empty());
    }
}
