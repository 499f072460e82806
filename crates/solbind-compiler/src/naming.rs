//! Identifier derivation
//!
//! Overloaded functions, events and errors share a base name in the ABI but
//! need distinct names in generated code. The helpers here derive those
//! names from canonical signatures, and clean up arbitrary ABI names into
//! identifiers and package names.

/// Default bound on an overload name before falling back to the selector form
pub const DEFAULT_MAX_OVERLOAD_NAME_LEN: usize = 50;

/// Derive the disambiguated name of one overload
///
/// `selector_hex` is the 8 hex characters of the selector (or of the first
/// four bytes of an event topic), without a `0x` prefix. A parameterless
/// overload is always `<base>_NoArgs`.
pub fn overload_name(base: &str, signature: &str, selector_hex: &str, max_len: usize) -> String {
    let fallback = || format!("{}__{}", base, selector_hex);

    let Some(params) = signature_params(signature) else {
        return fallback();
    };

    if params.is_empty() {
        return format!("{}_NoArgs", base);
    }

    let tokens: Vec<String> = params.iter().map(|p| normalize_type_for_naming(p.trim())).collect();
    let candidate = format!("{}_{}", base, tokens.join("_"));

    if candidate.len() > max_len {
        fallback()
    } else {
        candidate
    }
}

/// Split the parameter list out of `name(t1,t2,...)`, respecting tuple nesting
///
/// Returns `None` when the signature has no well-formed parameter list.
pub fn signature_params(signature: &str) -> Option<Vec<&str>> {
    let open = signature.find('(')?;
    let inner = signature.strip_suffix(')')?.get(open + 1..)?;
    if inner.is_empty() {
        return Some(Vec::new());
    }

    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                params.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    params.push(&inner[start..]);

    if params.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(params)
}

/// Turn one canonical parameter type into a CamelCase name fragment
pub fn normalize_type_for_naming(ty: &str) -> String {
    if let Some(elem) = ty.strip_suffix("[]") {
        return format!("{}Array", normalize_type_for_naming(elem));
    }
    if ty.ends_with(']') {
        if let Some(open) = ty.rfind('[') {
            return format!("{}FixedArray", normalize_type_for_naming(&ty[..open]));
        }
    }
    if ty.starts_with('(') {
        return "Tuple".to_string();
    }

    match ty {
        "address" => "Address".to_string(),
        "bool" => "Bool".to_string(),
        "string" => "String".to_string(),
        "bytes" => "Bytes".to_string(),
        _ => {
            for (prefix, label) in [("uint", "Uint"), ("int", "Int"), ("bytes", "Bytes")] {
                if let Some(width) = ty.strip_prefix(prefix) {
                    return format!("{}{}", label, width);
                }
            }
            export_identifier(&sanitize_identifier(ty))
        }
    }
}

/// Replace anything that is not a valid identifier character with `_`
///
/// A leading digit is kept behind a `Field_` prefix.
pub fn sanitize_identifier(name: &str) -> String {
    if name.is_empty() {
        return "Field".to_string();
    }

    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Field_{}", cleaned)
    } else {
        cleaned
    }
}

/// Make an identifier public-facing: drop one leading underscore and
/// uppercase the first character
pub fn export_identifier(name: &str) -> String {
    let name = name.strip_prefix('_').unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Field".to_string(),
    }
}

/// Derive a lowercase package name from a contract name
///
/// Only ASCII letters and digits survive; an empty result or one starting
/// with a digit gets a `contract` prefix.
pub fn sanitize_package_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if cleaned.is_empty() || cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("contract{}", cleaned)
    } else {
        cleaned
    }
}
