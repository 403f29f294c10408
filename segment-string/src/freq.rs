use std::fs::File;
#[cfg(feature = "gzip-json")]
use std::io::Read;
use std::io::{BufRead, BufReader};
use std::iter::FromIterator;
use std::path::Path;
use std::str::FromStr;

use smartstring::alias::String;

use crate::error::{Error, Result};

/// Word frequencies in rank order
///
/// Entries keep the order they were supplied in. That order is significant: the zipf cost policy
/// derives each word's cost from its position, so callers should supply words from most to least
/// frequent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<(String, f64)>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from `(word, frequency)` pairs, keeping their order
    ///
    /// Note: the `String` type used in this API is defined in the `smartstring` crate. Any `&str`
    /// or `String` can be converted into it by calling `into()` on it.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Append `word` as the lowest-ranked entry
    pub fn push(&mut self, word: impl Into<String>, frequency: f64) {
        self.entries.push((word.into(), frequency));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(word, frequency)` pairs in rank order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + ExactSizeIterator {
        self.entries.iter().map(|(word, freq)| (word.as_str(), *freq))
    }

    /// Length of the longest word, counted in characters
    pub fn max_word_len(&self) -> usize {
        self.entries
            .iter()
            .map(|(word, _)| word.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Read a `word<TAB>frequency` file, one entry per line
    pub fn from_tsv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("loading frequency table from {:?}", path);
        Self::from_tsv_reader(BufReader::new(File::open(path)?))
    }

    /// Read `word<TAB>frequency` lines from `reader`
    ///
    /// Blank lines are skipped. Line numbers in `Error::Parse` start at 1.
    pub fn from_tsv_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut table = Self::new();
        let mut ln = std::string::String::new();
        let mut i = 0;
        while reader.read_line(&mut ln)? > 0 {
            i += 1;
            let line = ln.trim_end_matches(&['\r', '\n'][..]);
            if line.trim().is_empty() {
                ln.clear();
                continue;
            }

            let split = line.find('\t').ok_or_else(|| Error::Parse {
                line: i,
                msg: "no tab found".into(),
            })?;

            let freq = f64::from_str(line[split + 1..].trim()).map_err(|e| Error::Parse {
                line: i,
                msg: format!("{}: {:?}", e, &line[split + 1..]),
            })?;

            table.push(&line[..split], freq);
            ln.clear();
        }

        Ok(table)
    }

    /// Read a gzip-compressed JSON object mapping words to frequencies
    #[cfg(feature = "gzip-json")]
    pub fn from_gzip_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("loading frequency table from {:?}", path);
        Self::from_gzip_json_reader(BufReader::new(File::open(path)?))
    }

    /// Decompress `reader` and decode the JSON object inside it
    ///
    /// Keys keep their document order, which becomes the rank order of the table.
    #[cfg(feature = "gzip-json")]
    pub fn from_gzip_json_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_json_reader(flate2::read::GzDecoder::new(reader))
    }

    /// Read an uncompressed JSON object mapping words to frequencies
    #[cfg(feature = "gzip-json")]
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("loading frequency table from {:?}", path);
        Self::from_json_reader(File::open(path)?)
    }

    /// Decode an uncompressed JSON object mapping words to frequencies
    ///
    /// A key that appears more than once keeps the position of its first occurrence and the
    /// frequency of its last one.
    #[cfg(feature = "gzip-json")]
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        BufReader::new(reader).read_to_end(&mut buf)?;
        Ok(serde_json::from_slice(&buf)?)
    }
}

impl FromIterator<(String, f64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'a> FromIterator<(&'a str, f64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        Self::from_pairs(iter.into_iter().map(|(word, freq)| (word.into(), freq)))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FrequencyTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(TableVisitor)
    }
}

/// Visits map entries one at a time so the table keeps document order
#[cfg(feature = "serde")]
struct TableVisitor;

#[cfg(feature = "serde")]
impl<'de> serde::de::Visitor<'de> for TableVisitor {
    type Value = FrequencyTable;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a map of words to frequencies")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut table = FrequencyTable {
            entries: Vec::with_capacity(map.size_hint().unwrap_or(0)),
        };
        let mut seen: crate::HashMap<std::string::String, usize> = crate::HashMap::default();
        while let Some((word, freq)) = map.next_entry::<std::string::String, f64>()? {
            match seen.get(&word) {
                Some(&i) => table.entries[i].1 = freq,
                None => {
                    seen.insert(word.clone(), table.entries.len());
                    table.push(word, freq);
                }
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv() {
        let input = "the\t23135851162\nof\t13151942776\n\nMan\t 42 \r\n";
        let table = FrequencyTable::from_tsv_reader(input.as_bytes()).unwrap();
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![("the", 23135851162.0), ("of", 13151942776.0), ("Man", 42.0)]
        );
        assert_eq!(table.max_word_len(), 3);
    }

    #[test]
    fn tsv_errors() {
        match FrequencyTable::from_tsv_reader("the\t1\nof 2\n".as_bytes()) {
            Err(Error::Parse { line: 2, .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        match FrequencyTable::from_tsv_reader("the\tmany\n".as_bytes()) {
            Err(Error::Parse { line: 1, msg }) => assert!(msg.contains("many")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn max_word_len_counts_chars() {
        let table = vec![("café", 1.0), ("ab", 2.0)]
            .into_iter()
            .collect::<FrequencyTable>();
        assert_eq!(table.max_word_len(), 4);
        assert_eq!(FrequencyTable::new().max_word_len(), 0);
    }

    #[cfg(feature = "gzip-json")]
    #[test]
    fn gzip_json_keeps_document_order() {
        use std::io::Write;

        use flate2::write::GzEncoder;
        use flate2::Compression;

        let json = r#"{"zebra": 3, "apple": 2.5, "mango": 1}"#;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let table = FrequencyTable::from_gzip_json_reader(&compressed[..]).unwrap();
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![("zebra", 3.0), ("apple", 2.5), ("mango", 1.0)]
        );
    }

    #[cfg(feature = "gzip-json")]
    #[test]
    fn json_duplicate_keys() {
        let json = r#"{"the": 5, "of": 3, "the": 9}"#;
        let table = FrequencyTable::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![("the", 9.0), ("of", 3.0)]
        );
    }

    #[cfg(feature = "gzip-json")]
    #[test]
    fn json_rejects_non_numeric() {
        let err = FrequencyTable::from_json_reader(r#"{"a": "b"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
