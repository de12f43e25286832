//! Name normalisation used when comparing keywords, tests, variables and tags.

/// Lowercases and removes spaces and underscores: `Keyword_Name 1` -> `keywordname1`.
pub fn normalize_robot_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Normalises a variable name, dropping the sigil, braces and assignment sign:
/// `${My Var} =` -> `myvar`. `${_}` normalises to an empty name.
pub fn normalize_robot_var_name(name: &str) -> String {
    normalize_robot_name(strip_variable_syntax(name))
}

/// `${name}=` -> `name`; values without variable syntax are returned trimmed.
pub fn strip_variable_syntax(name: &str) -> &str {
    let trimmed = name.trim().trim_end_matches('=').trim_end();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some('$' | '@' | '&' | '%'), Some('{')) if trimmed.ends_with('}') => {
            &trimmed[2..trimmed.len() - 1]
        }
        _ => trimmed,
    }
}

/// Sigil of a variable declaration, `$` when none is present.
pub fn variable_sigil(name: &str) -> char {
    match name.trim().chars().next() {
        Some(c @ ('@' | '&')) => c,
        _ => '$',
    }
}

/// Capitalises the first letter of each space separated word and lowercases the rest.
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes `${...}` placeholders from an embedded-arguments keyword name.
pub fn remove_embedded_arguments(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut depth = 0usize;
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if depth == 0 && matches!(c, '$' | '@' | '&') && chars.peek() == Some(&'{') {
            chars.next();
            depth = 1;
            continue;
        }
        if depth > 0 {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            continue;
        }
        result.push(c);
    }
    result
}
