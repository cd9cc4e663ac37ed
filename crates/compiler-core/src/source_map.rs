use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A Source Map v3 document for one generated render function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Zero-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mapping {
    generated: LineColumn,
    original: LineColumn,
    name: Option<usize>,
}

/// Collects mappings while code is generated. There is a single source,
/// the template itself.
#[derive(Debug, Clone)]
pub struct SourceMapGenerator {
    source: String,
    source_content: String,
    names: IndexSet<String>,
    mappings: Vec<Mapping>,
}

impl SourceMapGenerator {
    pub fn new(source: impl Into<String>, source_content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_content: source_content.into(),
            names: IndexSet::new(),
            mappings: Vec::new(),
        }
    }

    /// Mappings must be added in generated order.
    pub fn add_mapping(
        &mut self,
        generated: LineColumn,
        original: LineColumn,
        name: Option<&str>,
    ) {
        let name = name.map(|name| self.names.insert_full(name.to_string()).0);
        let mapping = Mapping {
            generated,
            original,
            name,
        };
        if self.mappings.last() != Some(&mapping) {
            self.mappings.push(mapping);
        }
    }

    pub fn to_source_map(&self, file: Option<String>) -> SourceMap {
        SourceMap {
            version: 3,
            file,
            sources: vec![self.source.clone()],
            sources_content: vec![self.source_content.clone()],
            names: self.names.iter().cloned().collect(),
            mappings: self.encode_mappings(),
        }
    }

    fn encode_mappings(&self) -> String {
        let mut out = String::new();
        let mut generated_line = 0;
        let mut previous_generated_column = 0i64;
        let mut previous_original_line = 0i64;
        let mut previous_original_column = 0i64;
        let mut previous_name = 0i64;
        let mut first_in_line = true;

        for mapping in &self.mappings {
            while generated_line < mapping.generated.line {
                out.push(';');
                generated_line += 1;
                previous_generated_column = 0;
                first_in_line = true;
            }
            if !first_in_line {
                out.push(',');
            }
            first_in_line = false;

            let column = mapping.generated.column as i64;
            encode_vlq(&mut out, column - previous_generated_column);
            previous_generated_column = column;
            // source index, always the template
            encode_vlq(&mut out, 0);
            let line = mapping.original.line as i64;
            encode_vlq(&mut out, line - previous_original_line);
            previous_original_line = line;
            let column = mapping.original.column as i64;
            encode_vlq(&mut out, column - previous_original_column);
            previous_original_column = column;
            if let Some(name) = mapping.name {
                let name = name as i64;
                encode_vlq(&mut out, name - previous_name);
                previous_name = name;
            }
        }
        out
    }
}

/// Appends the Base64 VLQ form of `value`.
pub fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (vlq & 0b11111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b100000;
        }
        out.push(BASE64_CHARS[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "A")]
    #[case(1, "C")]
    #[case(-1, "D")]
    #[case(16, "gB")]
    #[case(123, "2H")]
    fn vlq(#[case] value: i64, #[case] expected: &str) {
        let mut out = String::new();
        encode_vlq(&mut out, value);
        assert_eq!(out, expected);
    }

    #[test]
    fn relative_segments() {
        let at = |line, column| LineColumn { line, column };
        let mut generator = SourceMapGenerator::new("foo.vue", "<div/>");
        generator.add_mapping(at(0, 0), at(0, 0), None);
        generator.add_mapping(at(0, 5), at(0, 3), None);
        generator.add_mapping(at(1, 2), at(1, 0), None);
        let map = generator.to_source_map(None);
        assert_eq!(map.mappings, "AAAA,KAAG;EACH");
        assert_eq!(map.sources, ["foo.vue"]);
    }

    #[test]
    fn names_are_indexed_once() {
        let at = |line, column| LineColumn { line, column };
        let mut generator = SourceMapGenerator::new("foo.vue", "{{ a }}{{ a }}");
        generator.add_mapping(at(0, 0), at(0, 3), Some("a"));
        generator.add_mapping(at(0, 9), at(0, 10), Some("a"));
        let map = generator.to_source_map(None);
        assert_eq!(map.names, ["a"]);
        assert_eq!(map.mappings, "AAAGA,SAAOA");
        let json = map.to_json().unwrap();
        assert!(json.contains(r#""sourcesContent":["{{ a }}{{ a }}"]"#));
        assert!(!json.contains("\"file\""));
    }
}
