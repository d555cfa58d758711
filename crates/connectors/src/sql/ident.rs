use crate::sql::error::DbError;

/// Accepts `name` or `schema.name`, where each part matches
/// `[A-Za-z_][A-Za-z0-9_]*`. Names are interpolated into SQL text, so
/// nothing else is allowed through.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut parts = name.split('.');
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, None) => valid_part(name),
        (Some(schema), Some(name), None) => valid_part(schema) && valid_part(name),
        _ => false,
    }
}

pub fn checked_identifier(name: &str) -> Result<&str, DbError> {
    if is_valid_identifier(name) {
        Ok(name)
    } else {
        Err(DbError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_qualified_names() {
        assert!(is_valid_identifier("client"));
        assert!(is_valid_identifier("public.client_copy"));
        assert!(is_valid_identifier("_t1"));
    }

    #[test]
    fn rejects_anything_else() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1client"));
        assert!(!is_valid_identifier("client; DROP TABLE x"));
        assert!(!is_valid_identifier("a.b.c"));
        assert!(!is_valid_identifier("\"Client\""));
        assert!(!is_valid_identifier("public."));
    }
}
