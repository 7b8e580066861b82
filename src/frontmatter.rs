//! YAML frontmatter parsing and editing
//!
//! A frontmatter block starts on the first line of a file with `---` and ends at
//! the next line consisting of `---`. Parsing never fails: malformed YAML yields
//! an empty mapping so that it reads as "no goal configured".

use serde_yaml::{Mapping, Value};

use crate::constants as C;
use crate::error::Result;

/// Parsed frontmatter block of a note
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    /// Raw YAML text between the fences
    pub raw: String,
    /// Parsed key/value mapping (empty when the YAML is invalid)
    pub data: Mapping,
    /// Byte offset in the source where the body starts
    pub body_start: usize,
}

impl Frontmatter {
    /// Parse the frontmatter block at the start of `content`, if any
    pub fn parse(content: &str) -> Option<Self> {
        let (raw_start, raw_end, body_start) = locate(content)?;
        let raw = &content[raw_start..raw_end];
        if raw.len() > C::MAX_FRONTMATTER_SIZE {
            return None;
        }

        let data = match serde_yaml::from_str::<Value>(raw) {
            Ok(Value::Mapping(map)) => map,
            Ok(_) => Mapping::new(),
            Err(e) => {
                tracing::debug!("ignoring malformed frontmatter: {}", e);
                Mapping::new()
            }
        };

        Some(Frontmatter {
            raw: raw.to_string(),
            data,
            body_start,
        })
    }

    /// Look up a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(Value::String(key.to_string()))
    }

    /// Read a non-negative count (number or numeric string) under `key`
    pub fn count(&self, key: &str) -> Option<u64> {
        match self.get(key)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
    }

    /// Whether `key` is present and set to a falsy value (`false`, `"false"`, `0`, `""`)
    pub fn is_disabled(&self, key: &str) -> bool {
        match self.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => !b,
            Some(Value::String(s)) => s.is_empty() || s.trim().eq_ignore_ascii_case("false"),
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(_) => false,
        }
    }
}

/// Find (yaml start, yaml end, body start) byte offsets
fn locate(content: &str) -> Option<(usize, usize, usize)> {
    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end() != C::FRONTMATTER_FENCE {
        return None;
    }

    let raw_start = first_line_end + 1;
    let mut offset = raw_start;
    for line in content[raw_start..].split_inclusive('\n') {
        if line.trim_end() == C::FRONTMATTER_FENCE {
            return Some((raw_start, offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

/// Rewrite the frontmatter of `content` through `edit`
///
/// The block is created when missing and dropped when the edit leaves it empty.
pub fn update<F>(content: &str, edit: F) -> Result<String>
where
    F: FnOnce(&mut Mapping),
{
    let (mut map, body) = match locate(content) {
        Some((raw_start, raw_end, body_start)) => {
            let raw = &content[raw_start..raw_end];
            let map = if raw.trim().is_empty() {
                Mapping::new()
            } else {
                match serde_yaml::from_str::<Value>(raw)? {
                    Value::Mapping(map) => map,
                    Value::Null => Mapping::new(),
                    _ => Mapping::new(),
                }
            };
            (map, &content[body_start..])
        }
        None => (Mapping::new(), content),
    };

    edit(&mut map);

    if map.is_empty() {
        return Ok(body.trim_start_matches(|c| c == '\n' || c == '\r').to_string());
    }

    let yaml = serde_yaml::to_string(&Value::Mapping(map))?;
    Ok(format!("---\n{}\n---\n{}", yaml.trim_end(), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_counts(content: &str, counts: &[(&str, u64)]) -> Result<String> {
        update(content, |map| {
            for (key, value) in counts {
                map.insert(Value::String(key.to_string()), Value::Number((*value).into()));
            }
        })
    }

    fn body(content: &str) -> &str {
        match locate(content) {
            Some((_, _, body_start)) => &content[body_start..],
            None => content,
        }
    }

    fn remove_keys(content: &str, keys: &[&str]) -> Result<String> {
        update(content, |map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }

    #[test]
    fn test_parse_frontmatter() {
        let content = "---\ngoal: 5000\ndaily_goal: \"500\"\n---\nBody text";
        let fm = Frontmatter::parse(content).unwrap();
        assert_eq!(fm.count("goal"), Some(5000));
        assert_eq!(fm.count("daily_goal"), Some(500));
        assert_eq!(fm.count("missing"), None);
        assert_eq!(&content[fm.body_start..], "Body text");
    }

    #[test]
    fn test_no_frontmatter() {
        assert!(Frontmatter::parse("# Title\n\nText").is_none());
        assert!(Frontmatter::parse("").is_none());
        assert_eq!(body("# Title"), "# Title");
    }

    #[test]
    fn test_unclosed_frontmatter_is_body() {
        let content = "---\ngoal: 10\nno closing fence";
        assert!(Frontmatter::parse(content).is_none());
        assert_eq!(body(content), content);
    }

    #[test]
    fn test_malformed_yaml_reads_as_empty() {
        let fm = Frontmatter::parse("---\ngoal: [unclosed\n---\nBody").unwrap();
        assert!(fm.data.is_empty());
        assert_eq!(fm.count("goal"), None);
    }

    #[test]
    fn test_crlf_frontmatter() {
        let content = "---\r\ngoal: 12\r\n---\r\nBody";
        let fm = Frontmatter::parse(content).unwrap();
        assert_eq!(fm.count("goal"), Some(12));
        assert_eq!(body(content), "Body");
    }

    #[test]
    fn test_is_disabled() {
        let fm = Frontmatter::parse(
            "---\na: false\nb: \"false\"\nc: 0\nd: true\ne: ~\nf: \"\"\n---\n",
        )
        .unwrap();
        assert!(fm.is_disabled("a"));
        assert!(fm.is_disabled("b"));
        assert!(fm.is_disabled("c"));
        assert!(!fm.is_disabled("d"));
        assert!(!fm.is_disabled("e"));
        assert!(fm.is_disabled("f"));
        assert!(!fm.is_disabled("missing"));
    }

    #[test]
    fn test_set_counts_creates_block() {
        let updated = set_counts("Body text\n", &[("goal", 1000)]).unwrap();
        assert_eq!(updated, "---\ngoal: 1000\n---\nBody text\n");
        let fm = Frontmatter::parse(&updated).unwrap();
        assert_eq!(fm.count("goal"), Some(1000));
    }

    #[test]
    fn test_set_counts_keeps_other_keys() {
        let updated = set_counts("---\ntitle: Draft\ngoal: 1\n---\nBody", &[("goal", 20)]).unwrap();
        let fm = Frontmatter::parse(&updated).unwrap();
        assert_eq!(fm.count("goal"), Some(20));
        assert_eq!(fm.get("title"), Some(&Value::String("Draft".to_string())));
        assert_eq!(body(&updated), "Body");
    }

    #[test]
    fn test_remove_keys_drops_empty_block() {
        let updated = remove_keys("---\ngoal: 5\ndaily_goal: 1\n---\nBody", &["goal", "daily_goal"]).unwrap();
        assert_eq!(updated, "Body");
    }

    #[test]
    fn test_remove_keys_invalid_yaml_errors() {
        assert!(remove_keys("---\ngoal: [x\n---\nBody", &["goal"]).is_err());
    }
}
