//! Validation for `#[record(column = "...")]` overrides.

use syn::LitStr;

/// Accept `[A-Za-z_][A-Za-z0-9_]*`; the override is spliced into SQL unquoted.
pub(crate) fn column_name(lit: &LitStr) -> syn::Result<String> {
    let value = lit.value();
    let column = value.trim();

    let mut chars = column.chars();
    let leads = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if leads && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Ok(column.to_string());
    }

    let reason = if column.is_empty() {
        "must not be empty"
    } else {
        "must be a plain SQL identifier ([A-Za-z_][A-Za-z0-9_]*)"
    };
    Err(syn::Error::new(lit.span(), format!("record column {reason}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn check(s: &str) -> syn::Result<String> {
        let lit: LitStr = parse_quote!(#s);
        column_name(&lit)
    }

    #[test]
    fn accepts_plain_identifiers() {
        assert_eq!(check("user_name").unwrap(), "user_name");
        assert_eq!(check("_private").unwrap(), "_private");
        assert_eq!(check("col2").unwrap(), "col2");
        assert_eq!(check("  email  ").unwrap(), "email");
    }

    #[test]
    fn rejects_non_identifiers() {
        for bad in ["", "   ", "2col", "user name", "name; DROP TABLE users", "a-b"] {
            assert!(check(bad).is_err(), "{bad:?}");
        }
    }
}
