//! Field identifier to column identifier normalization.

use heck::ToSnakeCase;

/// Convert a field identifier into its column identifier.
///
/// Capitalized-word-concatenated names become lower-case and underscore
/// separated (`UserName` -> `user_name`). Already-normalized names are left
/// unchanged, so applying this twice gives the same result as applying it once.
///
/// The derive macro runs the same conversion at compile time.
pub fn normalize(name: &str) -> String {
    name.to_snake_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case() {
        assert_eq!(normalize("UserName"), "user_name");
        assert_eq!(normalize("Email"), "email");
        assert_eq!(normalize("CreatedAt"), "created_at");
    }

    #[test]
    fn camel_case() {
        assert_eq!(normalize("userName"), "user_name");
    }

    #[test]
    fn acronyms() {
        assert_eq!(normalize("ID"), "id");
        assert_eq!(normalize("UserID"), "user_id");
        assert_eq!(normalize("HTTPStatus"), "http_status");
    }

    #[test]
    fn idempotent() {
        for name in ["UserName", "user_name", "SiteID", "age"] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once);
        }
    }
}
