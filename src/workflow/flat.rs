use std::collections::BTreeMap;

/// Flattened pipeline configuration: dotted key path → raw value text.
pub type FlatConfig = BTreeMap<String, String>;

/// Parse the output of `nextflow config -flat`.
///
/// Each meaningful line has the form `key.path = value`; anything without
/// the ` = ` separator (banners, blank lines) is skipped. Values are kept raw,
/// quotes included.
pub fn parse_flat_config(output: &str) -> FlatConfig {
    let mut config = FlatConfig::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some((key, value)) = line.split_once(" = ") {
            config.insert(key.trim().to_string(), value.to_string());
        }
    }
    config
}

/// Strip surrounding whitespace and single/double quotes from a raw value.
pub fn unquote(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '\'' || c == '"' || c.is_whitespace())
}
