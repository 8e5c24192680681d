use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{AbbreviationMap, NormalizedDocument};

/// Glossary heading, then everything up to a closing back-matter section
/// (references, acknowledgements, funding, ...) or the end of the text.
/// The period before the closing keyword is optional.
static GLOSSARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)\p{P}?\b(?:abbreviations?|glossary)\b\s*[:\s]\s*(.*?)(?:\.?\s*\b(?:references|acknowledge?ments?|funding|authors?\b|conflicts?\s+of|ethic|corresponding)|\z)",
    )
    .unwrap()
});

static SEMICOLON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r";\s*").unwrap());

/// `KEY, expansion` or `KEY: expansion` within one semicolon segment.
static PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*([A-Za-z0-9\p{Greek}\-]+)\s*[:,]\s*(.+)$").unwrap()
});

/// Build the abbreviation map of a document.
///
/// The glossary is located in the collapsed text. When it splits into
/// several `;`-separated entries those are parsed as `KEY, expansion`;
/// otherwise the glossary is re-read from the preserved text. If it holds
/// more than one abbreviation run, its non-empty lines are paired as
/// abbreviation / expansion; a glossary written on a single line is paired
/// run by run instead. Only one of the two parsers runs for a document.
pub fn resolve_abbreviations(doc: &NormalizedDocument) -> AbbreviationMap {
    let Some(block) = find_glossary(&doc.collapsed_text) else {
        return AbbreviationMap::new();
    };

    let segments: Vec<&str> = SEMICOLON_RE.split(block).collect();
    if segments.len() > 1 {
        debug!("glossary: {} semicolon-delimited segments", segments.len());
        return parse_semicolon_segments(&segments);
    }

    let Some(raw_block) = find_glossary(&doc.raw_preserved_text) else {
        return AbbreviationMap::new();
    };
    let runs = split_abbreviation_runs(raw_block);
    if runs.len() <= 1 {
        return AbbreviationMap::new();
    }
    let lines: Vec<&str> = raw_block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() > 1 {
        debug!("glossary: {} line-delimited entries", lines.len());
        pair_lines(&lines)
    } else {
        debug!("glossary: {} whitespace-delimited runs", runs.len());
        pair_runs(&runs)
    }
}

fn find_glossary(text: &str) -> Option<&str> {
    GLOSSARY_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_semicolon_segments(segments: &[&str]) -> AbbreviationMap {
    let mut map = AbbreviationMap::new();
    for segment in segments {
        let Some(caps) = PAIR_RE.captures(segment) else {
            continue;
        };
        let key = caps[1].trim();
        let value = clean_expansion(&caps[2]);
        if !key.is_empty() && !value.is_empty() {
            map.insert(key.to_string(), value);
        }
    }
    map
}

/// Split a glossary into runs: each abbreviation that is directly followed
/// by a lowercase word starts a new entry and forms a run of its own; the
/// words up to the next such abbreviation form the expansion run.
fn split_abbreviation_runs(block: &str) -> Vec<String> {
    let tokens: Vec<&str> = block.split_whitespace().collect();
    let mut runs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let starts_entry = is_abbreviation_token(token)
            && tokens.get(i + 1).is_some_and(|next| starts_lowercase(next));
        if starts_entry {
            flush_run(&mut current, &mut runs);
            runs.push(token.trim_end_matches([',', ':']).to_string());
        } else {
            current.push(*token);
        }
    }
    flush_run(&mut current, &mut runs);
    runs
}

fn flush_run(current: &mut Vec<&str>, runs: &mut Vec<String>) {
    let run = current.join(" ");
    let run = run.trim();
    if !run.is_empty() {
        runs.push(run.to_string());
    }
    current.clear();
}

/// Lines alternate abbreviation and expansion; an odd last line is dropped.
fn pair_lines(lines: &[&str]) -> AbbreviationMap {
    let mut map = AbbreviationMap::new();
    for pair in lines.chunks_exact(2) {
        let key = pair[0].trim_end_matches([',', ':']).trim_end();
        let value = clean_expansion(pair[1]);
        if !key.is_empty() && !value.is_empty() {
            map.insert(key.to_string(), value);
        }
    }
    map
}

fn pair_runs(runs: &[String]) -> AbbreviationMap {
    let mut map = AbbreviationMap::new();
    for pair in runs.chunks_exact(2) {
        let value = clean_expansion(&pair[1]);
        if !value.is_empty() {
            map.insert(pair[0].clone(), value);
        }
    }
    map
}

/// An all-caps/alphanumeric token such as `ALT`, `CCl4`, `IL-1β` or `5-HT`,
/// optionally followed by a separator comma or colon.
fn is_abbreviation_token(token: &str) -> bool {
    let token = token.trim_end_matches([',', ':']);
    let Some(first) = token.chars().next() else {
        return false;
    };
    if !(first.is_uppercase() || first.is_ascii_digit()) {
        return false;
    }
    if !token.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '/') {
        return false;
    }
    token
        .chars()
        .filter(|c| c.is_uppercase() || c.is_ascii_digit())
        .count()
        >= 2
}

fn starts_lowercase(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_lowercase)
}

/// Lowercase an expansion and drop trailing sentence punctuation.
fn clean_expansion(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim_end()
        .to_lowercase()
}
