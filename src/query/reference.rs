/// A reference field that the projection expands inline.
///
/// Renders as `"alias": path->{field, ...}`, so the row carries the target
/// document's fields instead of a bare `_ref`. A dangling reference comes back
/// as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceField {
    pub alias: String,
    pub path: String,
    pub fields: Vec<String>,
}

impl ReferenceField {
    pub fn new(alias: &str, path: &str, fields: &[&str]) -> Self {
        Self {
            alias: alias.to_string(),
            path: path.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// The news author: `"author": author->{name, email}`.
    pub fn author() -> Self {
        Self::new("author", "author", &["name", "email"])
    }

    pub fn render(&self) -> String {
        format!(
            "\"{}\": {}->{{{}}}",
            self.alias,
            self.path,
            self.fields.join(", ")
        )
    }
}
