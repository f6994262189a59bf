use crate::config::DetailLevel;

/// Render a commit message as exactly one report line.
pub fn format_message(message: &str, detail: DetailLevel) -> String {
    match detail {
        DetailLevel::Title => first_line(message).to_string(),
        DetailLevel::Full => flatten_message(message),
    }
}

pub fn first_line(message: &str) -> &str {
    message
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
}

pub fn flatten_message(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Repository names may be nested (`team/api`); keep the report file flat.
pub fn report_file_name(repository: &str) -> String {
    let stem: String = repository
        .trim_matches(|c| c == '/' || c == '\\')
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{stem}.txt")
}
