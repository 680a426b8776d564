// `$name` substitution for chart titles

use anyhow::{bail, Result};
use std::collections::HashMap;

/// Replace every `$identifier` in `input` with its bound value.
///
/// A `$` not followed by an identifier is kept as-is. Unbound names are errors.
pub fn expand_variables(input: &str, variables: &HashMap<&str, String>) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        output.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = identifier_len(after);

        if name_len == 0 {
            output.push('$');
        } else {
            let name = &after[..name_len];
            match variables.get(name) {
                Some(value) => output.push_str(value),
                None => bail!("Title variable '${}' is not defined", name),
            }
        }
        rest = &after[name_len..];
    }
    output.push_str(rest);

    Ok(output)
}

// Identifiers start with a letter or `_`, then letters, digits or `_`.
fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
