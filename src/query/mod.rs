//! Query expressions for news documents.
//!
//! Expressions are built here and handed to the store as opaque strings. The
//! category predicate is always membership (`$category in category`), so a
//! document tagged `["headline", "sports"]` shows up in both feeds.

pub mod params;
pub mod reference;

pub use params::{QueryOptions, QueryParams};
pub use reference::ReferenceField;

pub const DEFAULT_DOCUMENT_TYPE: &str = "news";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Category(String),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub fields: Vec<String>,
    pub references: Vec<ReferenceField>,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fields: [
                "_id",
                "title",
                "content",
                "publishTime",
                "publishtime",
                "category",
                "poster",
            ]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            references: vec![ReferenceField::author()],
        }
    }
}

impl Projection {
    pub fn render(&self) -> String {
        let parts: Vec<String> = self
            .fields
            .iter()
            .cloned()
            .chain(self.references.iter().map(ReferenceField::render))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    document_type: String,
    filter: Filter,
    projection: Projection,
}

impl DocumentQuery {
    pub fn new(document_type: &str, filter: Filter) -> Self {
        Self {
            document_type: document_type.to_string(),
            filter,
            projection: Projection::default(),
        }
    }

    pub fn by_category(document_type: &str, category: &str) -> Self {
        Self::new(document_type, Filter::Category(category.to_string()))
    }

    pub fn by_id(document_type: &str, id: &str) -> Self {
        Self::new(document_type, Filter::Id(id.to_string()))
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn expression(&self) -> String {
        // Quoted through JSON so the type name can never break out of the literal.
        let type_literal =
            serde_json::to_string(&self.document_type).unwrap_or_else(|_| "\"\"".into());

        let (predicate, slice) = match self.filter {
            Filter::All => (String::new(), ""),
            Filter::Category(_) => (" && $category in category".to_string(), ""),
            Filter::Id(_) => (" && _id == $id".to_string(), "[0...1]"),
        };

        format!(
            "*[_type == {}{}]{}{}",
            type_literal,
            predicate,
            slice,
            self.projection.render()
        )
    }

    pub fn params(&self) -> QueryParams {
        match self.filter {
            Filter::All => QueryParams::new(),
            Filter::Category(ref tag) => QueryParams::new().with("category", tag.as_str()),
            Filter::Id(ref id) => QueryParams::new().with("id", id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_query_uses_membership() {
        let query = DocumentQuery::by_category("news", "sports");
        assert_eq!(
            query.expression(),
            "*[_type == \"news\" && $category in category]\
             {_id, title, content, publishTime, publishtime, category, poster, \"author\": author->{name, email}}"
        );
        assert!(!query.expression().contains("category["));
        assert_eq!(
            query.params().get("category"),
            Some(&serde_json::json!("sports"))
        );
    }

    #[test]
    fn test_id_query_takes_one() {
        let query = DocumentQuery::by_id("news", "abc-123");
        let expr = query.expression();
        assert!(expr.starts_with("*[_type == \"news\" && _id == $id][0...1]{"));
        assert_eq!(query.params().get("id"), Some(&serde_json::json!("abc-123")));
    }

    #[test]
    fn test_expression_params_validate() {
        for query in [
            DocumentQuery::by_category("news", "headline"),
            DocumentQuery::by_id("news", "x"),
            DocumentQuery::new("news", Filter::All),
        ] {
            assert!(params::validate(&query.expression(), &query.params()).is_ok());
        }
    }

    #[test]
    fn test_document_type_is_quoted() {
        let query = DocumentQuery::new("ne\"ws", Filter::All);
        assert!(query.expression().starts_with("*[_type == \"ne\\\"ws\"]"));
    }

    #[test]
    fn test_custom_projection() {
        let query = DocumentQuery::new("post", Filter::All).with_projection(Projection {
            fields: vec!["title".into()],
            references: vec![],
        });
        assert_eq!(query.expression(), "*[_type == \"post\"]{title}");
    }
}
