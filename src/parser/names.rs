/// Convert an identifier to PascalCase.
///
/// Handles both snake_case table names and camelCase variable names:
/// - `"user_profiles"` -> `"UserProfiles"`
/// - `"userProfiles"` -> `"UserProfiles"`
/// - `"order-items"` -> `"OrderItems"`
pub fn to_pascal_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for segment in ident.split(['_', '-', ' ', '.']) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Convert a camelCase property name to snake_case.
///
/// Acronym runs stay together: `"authorID"` -> `"author_id"`,
/// `"HTTPStatus"` -> `"http_status"`.
pub fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (idx, &ch) in chars.iter().enumerate() {
        if ch == '-' || ch == ' ' {
            if !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if ch.is_uppercase() {
            let prev = idx.checked_sub(1).map(|i| chars[i]);
            let next = chars.get(idx + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Replace the extension of a file name, appending one when absent.
pub fn with_extension(file_name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    let stem = match file_name.rfind('.') {
        Some(dot) if dot > 0 && !file_name[dot..].contains(['/', '\\']) => &file_name[..dot],
        _ => file_name,
    };
    format!("{stem}.{extension}")
}
