//! REST path templates per resource.

use std::borrow::Cow;

/// Paths for one resource collection, following REST conventions:
/// list/create at the collection path, detail/update/delete at
/// `{collection}/{id}`, free-text search at `{collection}/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    collection: Cow<'static, str>,
}

impl Endpoints {
    /// User endpoints.
    pub const USERS: Endpoints = Endpoints::from_static("/users");
    /// Post endpoints.
    pub const POSTS: Endpoints = Endpoints::from_static("/posts");

    /// Endpoints rooted at a fixed collection path.
    pub const fn from_static(collection: &'static str) -> Self {
        Self {
            collection: Cow::Borrowed(collection),
        }
    }

    /// Endpoints rooted at any collection path.
    pub fn new(collection: impl Into<String>) -> Self {
        let collection = collection.into();
        let collection = format!("/{}", collection.trim_matches('/'));
        Self {
            collection: Cow::Owned(collection),
        }
    }

    /// GET (list) and POST (create).
    pub fn list(&self) -> &str {
        &self.collection
    }

    /// GET (detail), PUT (update) and DELETE.
    pub fn detail(&self, id: &str) -> String {
        format!("{}/{}", self.collection, id)
    }

    /// GET with `q=<text>`.
    pub fn search(&self) -> String {
        format!("{}/search", self.collection)
    }
}

/// Substitute `{name}` placeholders in a path template.
///
/// Placeholders without a matching parameter are left as they are.
pub fn build_endpoint(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |path, (key, value)| {
            path.replace(&format!("{{{key}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_paths() {
        let e = Endpoints::USERS;
        assert_eq!(e.list(), "/users");
        assert_eq!(e.detail("42"), "/users/42");
        assert_eq!(e.search(), "/users/search");
    }

    #[test]
    fn custom_collection_is_normalized() {
        let e = Endpoints::new("projects/");
        assert_eq!(e.list(), "/projects");
        assert_eq!(e.detail("p1"), "/projects/p1");
    }

    #[test]
    fn build_endpoint_substitutes() {
        assert_eq!(
            build_endpoint("/posts/{postId}/comments", &[("postId", "7")]),
            "/posts/7/comments"
        );
        assert_eq!(
            build_endpoint("/a/{x}/b/{y}", &[("y", "2")]),
            "/a/{x}/b/2"
        );
    }
}
