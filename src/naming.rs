//! Identifier conventions
//!
//! Schema identifiers are snake_case. Generated Go code uses PascalCase for
//! exported type/field names and camelCase for local variables; file names and
//! route paths go back to the delimited form.

const DELIMITER: char = '_';

/// Convert a snake_case identifier to a PascalCase type name
///
/// Every segment is capitalized and the rest of it lowercased, so
/// `USER_accounts` becomes `UserAccounts`.
pub fn to_type_name(identifier: &str) -> String {
    identifier
        .split(DELIMITER)
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    let first_upper = first.to_uppercase().to_string();
                    first_upper + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect()
}

/// Convert a snake_case identifier to a camelCase variable name
pub fn to_variable_name(identifier: &str) -> String {
    let type_name = to_type_name(identifier);
    let mut chars = type_name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().to_string() + chars.as_str(),
    }
}

/// Convert a PascalCase or camelCase name back to snake_case
///
/// Not a true inverse of [`to_type_name`]: runs of capitals are split letter by
/// letter (`HTTPCode` gives `h_t_t_p_code`) and existing delimiters are kept.
pub fn to_delimited(identifier: &str) -> String {
    let mut result = String::with_capacity(identifier.len() + 4);
    for (i, c) in identifier.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            result.push(DELIMITER);
        }
        result.push(c);
    }
    result.to_lowercase()
}
