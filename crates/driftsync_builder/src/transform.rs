//! The per-document transform seam.

use driftsync_core::Document;

/// A pure per-document mapping applied between extract and load.
///
/// Invoked once per source document, with no side effects and no
/// dependency between invocations; an external engine may apply it to
/// documents in parallel. Implementations must leave the addressing-key
/// value unchanged, since the key drives the subsequent upsert.
pub trait Transform: Send + Sync {
    /// Maps one source document into target shape.
    fn transform(&self, document: Document) -> Document;
}

/// The default transform: passes documents through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn transform(&self, document: Document) -> Document {
        document
    }
}

impl<F> Transform for F
where
    F: Fn(Document) -> Document + Send + Sync,
{
    fn transform(&self, document: Document) -> Document {
        self(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_passes_through() {
        let doc: Document = [("id", json!(1)), ("x", json!("y"))].into_iter().collect();
        assert_eq!(Identity.transform(doc.clone()), doc);
    }

    #[test]
    fn closures_are_transforms() {
        let uppercase_title = |mut doc: Document| {
            if let Some(serde_json::Value::String(title)) = doc.get("title").cloned() {
                doc.insert("title", json!(title.to_uppercase()));
            }
            doc
        };

        let doc: Document = [("id", json!(1)), ("title", json!("draft"))]
            .into_iter()
            .collect();
        let shaped = uppercase_title.transform(doc);
        assert_eq!(shaped.get("title"), Some(&json!("DRAFT")));
    }
}
