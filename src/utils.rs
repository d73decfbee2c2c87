// src/utils.rs

/// Strip the query string from a job link so it can be used as the dedup key
pub fn normalize_job_path(path: &str) -> &str {
    match path.split_once('?') {
        Some((base, _)) => base,
        None => path,
    }
}

/// Collapse the blank-line artifacts left by nested markup, then trim
pub fn collapse_blank_lines(text: &str) -> String {
    text.replace("\n\n", " ").trim().to_string()
}

/// Split a comma separated setting into trimmed, non-empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join the site domain and a job path without doubling the slash
pub fn job_url(domain: &str, path: &str) -> String {
    format!("{}{}", domain.trim_end_matches('/'), path)
}
