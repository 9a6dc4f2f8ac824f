//! Subway art catalog: which artworks sit along each transit line.
//!
//! The catalog is a JSON object keyed by line id, each value an ordered list
//! of entries. Some entries are the artworks the animation itself refers to,
//! those get flagged as references when listed.

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::transit::Line;

pub const ERROR_HTML: &str = r#"<p class="catalog-error">Art catalog could not be loaded.</p>"#;
pub const ERROR_TEXT: &str = "Art catalog could not be loaded.";
pub const REFERENCE_BADGE: &str = "Referenced in piece";

const SOL_LEWITT_STATION: &str = "59 St-Columbus Circle";
const SOL_LEWITT_ARTIST: &str = "Sol LeWitt";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read the art catalog")]
    Io(#[from] std::io::Error),
    #[error("art catalog is not valid JSON")]
    Parse(#[from] serde_json::Error),
}

/// One artwork. Fields that are missing or not displayable stay `None` and
/// render empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub station: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "isReference")]
    pub is_reference: bool,
}

/// Text of a scalar JSON value, numbers and booleans included
fn display_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |n| n != 0.),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

impl From<&Value> for CatalogEntry {
    fn from(value: &Value) -> Self {
        CatalogEntry {
            station: display_field(value.get("station")),
            artist: display_field(value.get("artist")),
            title: display_field(value.get("title")),
            url: display_field(value.get("url")),
            is_reference: truthy(value.get("isReference")),
        }
    }
}

impl CatalogEntry {
    /// Plain text form, `station artist, title`
    pub fn label(&self) -> String {
        format!(
            "{} {}, {}",
            self.station.as_deref().unwrap_or_default(),
            self.artist.as_deref().unwrap_or_default(),
            self.title.as_deref().unwrap_or_default()
        )
    }
}

/// The Dan Flavin installation at Grand Central, always listed first on the 4/5/6
pub fn dan_flavin_reference() -> CatalogEntry {
    CatalogEntry {
        station: Some("Grand Central-42 St".to_owned()),
        artist: Some("Dan Flavin".to_owned()),
        title: None,
        url: Some("https://www.instagram.com/p/C7mjDhXM1fZ/?hl=en".to_owned()),
        is_reference: true,
    }
}

/// Whether `entry`, listed under `line`, is one of the works the piece refers to
pub fn is_reference(entry: &CatalogEntry, line: Line) -> bool {
    entry.is_reference
        || (line == Line::L123
            && entry.station.as_deref() == Some(SOL_LEWITT_STATION)
            && entry.artist.as_deref() == Some(SOL_LEWITT_ARTIST))
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    lines: BTreeMap<String, Vec<CatalogEntry>>,
}

/// Anything that is valid JSON makes a catalog: a line that is not a list
/// lists nothing, a non-object document has no lines.
impl From<Value> for Catalog {
    fn from(value: Value) -> Self {
        let lines = match value {
            Value::Object(map) => map
                .iter()
                .map(|(line, entries)| {
                    let entries = match entries {
                        Value::Array(entries) => {
                            entries.iter().map(CatalogEntry::from).collect()
                        }
                        _ => Vec::new(),
                    };
                    (line.clone(), entries)
                })
                .collect(),
            _ => BTreeMap::new(),
        };
        Catalog { lines }
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Catalog::from)
    }
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Entries listed for `line` in display order. Unknown lines list nothing
    /// but their fixed references.
    pub fn entries(&self, line: Line) -> Vec<Cow<'_, CatalogEntry>> {
        let stored = self
            .lines
            .get(line.id())
            .map(|entries| entries.iter().map(Cow::Borrowed))
            .into_iter()
            .flatten();

        match line {
            Line::L456 => std::iter::once(Cow::Owned(dan_flavin_reference()))
                .chain(stored)
                .collect(),
            _ => stored.collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Escapes text for use in HTML element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_entry(entry: &CatalogEntry, line: Line) -> String {
    let reference = is_reference(entry, line);
    let class = if reference {
        "art-item art-item-reference"
    } else {
        "art-item"
    };
    let badge = if reference {
        format!(r#" <span class="reference-badge">{REFERENCE_BADGE}</span>"#)
    } else {
        String::new()
    };

    let field = |f: &Option<String>| escape_html(f.as_deref().unwrap_or_default());
    let body = format!(
        r#"<span class="art-station">{}</span> <span class="art-artist">{}</span>, <span class="art-title">{}</span>{}"#,
        field(&entry.station),
        field(&entry.artist),
        field(&entry.title),
        badge
    );

    match entry.url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => format!(
            r#"<a class="{class}" href="{}" target="_blank" rel="noopener noreferrer">{body}</a>"#,
            escape_html(url)
        ),
        None => format!(r#"<span class="{class}">{body}</span>"#),
    }
}

/// HTML markup of the list shown for `line`
pub fn render_list(line: Line, catalog: &Catalog) -> String {
    catalog
        .entries(line)
        .iter()
        .map(|entry| render_entry(entry, line))
        .collect()
}

/// The list for `line`, or the error paragraph when the catalog failed to load
pub fn render_or_error(line: Line, catalog: &Result<Catalog, CatalogError>) -> String {
    match catalog {
        Ok(catalog) => render_list(line, catalog),
        Err(_) => ERROR_HTML.to_owned(),
    }
}

/// Plain text version of [`render_or_error`], one entry per line
pub fn render_text(line: Line, catalog: &Result<Catalog, CatalogError>) -> String {
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(_) => return ERROR_TEXT.to_owned(),
    };
    catalog
        .entries(line)
        .iter()
        .map(|entry| {
            if is_reference(entry, line) {
                format!("{} [{REFERENCE_BADGE}]", entry.label())
            } else {
                entry.label()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const SAMPLE: &str = r#"{
        "123": [
            {"station": "59 St-Columbus Circle", "artist": "Sol LeWitt", "title": "Whirls and Twirls (MTA)"},
            {"station": "Times Sq-42 St", "artist": "Roy Lichtenstein", "title": "Times Square Mural",
             "url": "https://example.org/mural"}
        ],
        "nqr": [
            {"station": "28 St", "artist": "Ellen Harvey"}
        ]
    }"#;

    #[test]
    fn empty_catalog_still_lists_the_456_reference() {
        let catalog = Catalog::from_json("{}").unwrap();
        let entries = catalog.entries(Line::L456);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].artist.as_deref(), Some("Dan Flavin"));

        let html = render_list(Line::L456, &catalog);
        assert_eq!(html.matches("class=\"art-item art-item-reference\"").count(), 1);
        assert!(html.contains(r#"<span class="reference-badge">Referenced in piece</span>"#));
        assert!(html.starts_with(
            r#"<a class="art-item art-item-reference" href="https://www.instagram.com/p/C7mjDhXM1fZ/?hl=en" target="_blank" rel="noopener noreferrer">"#
        ));
        assert!(html.contains(r#"<span class="art-title"></span>"#));
    }

    #[test]
    fn reference_is_prepended_to_existing_456_entries() {
        let catalog =
            Catalog::from_json(r#"{"456": [{"station": "Astor Pl", "artist": "Milton Glaser"}]}"#)
                .unwrap();
        let entries = catalog.entries(Line::L456);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_reference);
        assert_eq!(entries[1].station.as_deref(), Some("Astor Pl"));
    }

    #[test]
    fn sol_lewitt_is_a_reference_on_the_123_only() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let entries = catalog.entries(Line::L123);
        assert!(is_reference(&entries[0], Line::L123));
        assert!(!is_reference(&entries[1], Line::L123));
        assert!(!is_reference(&entries[0], Line::Nqr));

        let mut lowercase = entries[0].clone().into_owned();
        lowercase.artist = Some("sol lewitt".to_owned());
        assert!(!is_reference(&lowercase, Line::L123));
    }

    #[test]
    fn renders_anchor_only_with_url() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let html = render_list(Line::L123, &catalog);
        assert!(html.starts_with(r#"<span class="art-item art-item-reference"><span class="art-station">59 St-Columbus Circle</span> <span class="art-artist">Sol LeWitt</span>, <span class="art-title">Whirls and Twirls (MTA)</span> <span class="reference-badge">Referenced in piece</span></span>"#));
        assert!(html.ends_with(r#"<a class="art-item" href="https://example.org/mural" target="_blank" rel="noopener noreferrer"><span class="art-station">Times Sq-42 St</span> <span class="art-artist">Roy Lichtenstein</span>, <span class="art-title">Times Square Mural</span></a>"#));
    }

    #[test]
    fn missing_fields_render_empty() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(
            render_list(Line::Nqr, &catalog),
            r#"<span class="art-item"><span class="art-station">28 St</span> <span class="art-artist">Ellen Harvey</span>, <span class="art-title"></span></span>"#
        );
        assert_eq!(catalog.entries(Line::Nqr)[0].label(), "28 St Ellen Harvey, ");
    }

    #[test]
    fn missing_line_lists_nothing() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert!(catalog.entries(Line::L456).len() == 1);
        assert_eq!(render_list(Line::L123, &Catalog::default()), "");
        assert_eq!(catalog.len(), 3);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("A & B", "A &amp; B")]
    #[case("<b>", "&lt;b&gt;")]
    #[case(r#"say "hi""#, "say &quot;hi&quot;")]
    #[case("it's", "it&#39;s")]
    fn escapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_html(input), expected);
    }

    #[test]
    fn text_is_escaped_in_markup() {
        let catalog = Catalog::from_json(
            r#"{"nqr": [{"station": "<script>", "artist": "A&B", "title": "x"}]}"#,
        )
        .unwrap();
        let html = render_list(Line::Nqr, &catalog);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A&amp;B"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn broken_json_renders_the_error() {
        let res = Catalog::from_json("{\"123\": [");
        assert!(matches!(res, Err(CatalogError::Parse(_))));
        assert_eq!(render_or_error(Line::L123, &res), ERROR_HTML);
    }

    #[test]
    fn text_panel_marks_references() {
        let catalog = Catalog::from_json(SAMPLE);
        assert_eq!(
            render_text(Line::L123, &catalog),
            "59 St-Columbus Circle Sol LeWitt, Whirls and Twirls (MTA) [Referenced in piece]\n\
             Times Sq-42 St Roy Lichtenstein, Times Square Mural"
        );
        assert_eq!(
            render_text(Line::L456, &Catalog::from_json("{}")),
            "Grand Central-42 St Dan Flavin,  [Referenced in piece]"
        );
        assert_eq!(render_text(Line::Nqr, &Catalog::from_json("{\"nqr\": ")), ERROR_TEXT);
    }

    #[test]
    fn odd_values_do_not_reject_the_catalog() {
        let catalog = Catalog::from_json(
            r#"{
                "123": [{"station": "Times Sq", "artist": "X", "title": 1987, "url": null}],
                "456": [{"station": "Astor Pl", "artist": ["not", "text"], "isReference": 0}, 7],
                "nqr": null
            }"#,
        )
        .unwrap();

        let l123 = catalog.entries(Line::L123);
        assert_eq!(l123[0].title.as_deref(), Some("1987"));
        assert_eq!(l123[0].url, None);

        let l456 = catalog.entries(Line::L456);
        assert_eq!(l456.len(), 3);
        assert_eq!(l456[1].station.as_deref(), Some("Astor Pl"));
        assert_eq!(l456[1].artist, None);
        assert!(!is_reference(&l456[1], Line::L456));
        assert_eq!(*l456[2], CatalogEntry::default());

        assert!(catalog.entries(Line::Nqr).is_empty());
        assert!(render_or_error(Line::L123, &Ok(catalog)).contains("<span class=\"art-title\">1987</span>"));
    }

    #[rstest]
    #[case("[]")]
    #[case("null")]
    #[case("\"catalog\"")]
    fn non_object_documents_have_no_lines(#[case] json: &str) {
        let catalog = Catalog::from_json(json).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.entries(Line::L456).len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let res = Catalog::load("/definitely/not/here/mta-art-lines.json");
        assert!(matches!(res, Err(CatalogError::Io(_))));
        assert_eq!(
            render_or_error(Line::L456, &res),
            r#"<p class="catalog-error">Art catalog could not be loaded.</p>"#
        );
    }
}
