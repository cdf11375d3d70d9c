//! Worksheet layout and classification
//!
//! Layout convention (1-based rows, column B = 2):
//! - B1: collection type, `doc` or `edge`
//! - B2: "from" collection (edge sheets)
//! - B3: "to" collection (edge sheets)
//! - row 5: property names
//! - row 6 onward: one document per row
//!
//! Sheets whose name starts with `.` are hidden and never loaded.

use calamine::{Data, Range};

use super::document::map_row;
use super::error::LoadError;
use crate::api::{CollectionKind, Document, EdgeDefinition};

/// Cell positions of the header region
mod layout {
    pub const TYPE_ROW: usize = 1;
    pub const FROM_ROW: usize = 2;
    pub const TO_ROW: usize = 3;
    pub const META_COL: usize = 2;
    pub const HEADER_ROW: usize = 5;
    pub const DATA_START_ROW: usize = 6;
}

pub const HIDDEN_PREFIX: char = '.';
pub const DOC_TAG: &str = "doc";
pub const EDGE_TAG: &str = "edge";

static EMPTY: Data = Data::Empty;

/// A worksheet as a dense grid anchored at cell A1
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    rows: Vec<Vec<Data>>,
}

/// What a worksheet declares about its collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: String,
    pub kind: CollectionKind,
    /// Edge sheets only: single-element list of the source collection
    pub from: Vec<String>,
    /// Edge sheets only: single-element list of the target collection
    pub to: Vec<String>,
}

impl CollectionSpec {
    pub fn edge_definition(&self) -> Option<EdgeDefinition> {
        match self.kind {
            CollectionKind::Edge => Some(EdgeDefinition {
                collection: self.name.clone(),
                from: self.from.clone(),
                to: self.to.clone(),
            }),
            CollectionKind::Document => None,
        }
    }
}

impl Worksheet {
    /// Build from rows that start at A1
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build from a calamine range, padding so that row 1 / column A line up
    /// even when the used range starts further down or right
    pub fn from_range(name: impl Into<String>, range: &Range<Data>) -> Self {
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<Data>> = vec![Vec::new(); start_row as usize];

        for row in range.rows() {
            let mut padded = vec![Data::Empty; start_col as usize];
            padded.extend_from_slice(row);
            rows.push(padded);
        }

        Self::new(name, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with(HIDDEN_PREFIX)
    }

    /// Cell at a 1-based row and column; out of range is empty
    pub fn cell(&self, row: usize, col: usize) -> &Data {
        if row == 0 || col == 0 {
            return &EMPTY;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY)
    }

    fn meta_text(&self, row: usize) -> String {
        cell_text(self.cell(row, layout::META_COL))
    }

    /// Property names from the header row
    pub fn property_names(&self) -> Vec<String> {
        self.rows
            .get(layout::HEADER_ROW - 1)
            .map(|row| row.iter().map(cell_text).collect())
            .unwrap_or_default()
    }

    /// Data rows in sheet order, skipping rows with no content
    pub fn data_rows(&self) -> impl Iterator<Item = &[Data]> {
        self.rows
            .iter()
            .skip(layout::DATA_START_ROW - 1)
            .map(Vec::as_slice)
            .filter(|row| row.iter().any(|c| !is_blank(c)))
    }

    /// Map every data row to a document using the header row
    pub fn documents(&self) -> Vec<Document> {
        let names = self.property_names();
        self.data_rows().map(|row| map_row(&names, row)).collect()
    }

    /// Read the header region into a [`CollectionSpec`]
    pub fn classify(&self) -> Result<CollectionSpec, LoadError> {
        let tag = self.meta_text(layout::TYPE_ROW);
        let kind = match tag.as_str() {
            DOC_TAG => CollectionKind::Document,
            EDGE_TAG => CollectionKind::Edge,
            _ => {
                return Err(LoadError::InvalidCollectionType {
                    sheet: self.name.clone(),
                    tag,
                });
            }
        };

        let (from, to) = match kind {
            CollectionKind::Edge => (
                vec![self.meta_text(layout::FROM_ROW)],
                vec![self.meta_text(layout::TO_ROW)],
            ),
            CollectionKind::Document => (Vec::new(), Vec::new()),
        };

        Ok(CollectionSpec {
            name: self.name.clone(),
            kind,
            from,
            to,
        })
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    /// Sheet with the standard header region followed by `header` and `rows`
    pub(crate) fn sheet(
        name: &str,
        tag: &str,
        endpoints: Option<(&str, &str)>,
        header: &[&str],
        rows: Vec<Vec<Data>>,
    ) -> Worksheet {
        let (from, to) = endpoints.unwrap_or(("", ""));
        let mut grid = vec![
            vec![s("type"), s(tag)],
            vec![s("from"), s(from)],
            vec![s("to"), s(to)],
            vec![],
            header.iter().map(|h| s(h)).collect(),
        ];
        grid.extend(rows);
        Worksheet::new(name, grid)
    }

    #[test]
    fn test_classify_doc() {
        let ws = sheet("Person", "doc", None, &["_key"], vec![]);
        let spec = ws.classify().unwrap();
        assert_eq!(spec.name, "Person");
        assert_eq!(spec.kind, CollectionKind::Document);
        assert!(spec.from.is_empty());
        assert!(spec.to.is_empty());
        assert_eq!(spec.edge_definition(), None);
    }

    #[test]
    fn test_classify_edge() {
        let ws = sheet("Knows", "edge", Some(("Person", "Company")), &["_key"], vec![]);
        let spec = ws.classify().unwrap();
        assert_eq!(spec.kind, CollectionKind::Edge);
        assert_eq!(spec.from, vec!["Person"]);
        assert_eq!(spec.to, vec!["Company"]);
        assert_eq!(
            spec.edge_definition(),
            Some(EdgeDefinition {
                collection: "Knows".to_string(),
                from: vec!["Person".to_string()],
                to: vec!["Company".to_string()],
            })
        );
    }

    #[test]
    fn test_classify_rejects_unknown_tag() {
        let ws = sheet("Things", "list", None, &["_key"], vec![]);
        match ws.classify() {
            Err(LoadError::InvalidCollectionType { sheet, tag }) => {
                assert_eq!(sheet, "Things");
                assert_eq!(tag, "list");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let empty = Worksheet::new("Empty", vec![]);
        assert!(matches!(
            empty.classify(),
            Err(LoadError::InvalidCollectionType { .. })
        ));
    }

    #[test]
    fn test_hidden_sheet() {
        assert!(Worksheet::new(".config", vec![]).is_hidden());
        assert!(!Worksheet::new("config.", vec![]).is_hidden());
    }

    #[test]
    fn test_data_rows_skip_blank_rows() {
        let ws = sheet(
            "Person",
            "doc",
            None,
            &["_key", "name"],
            vec![
                vec![s("a"), s("Alice")],
                vec![Data::Empty, s("  ")],
                vec![],
                vec![s("b"), s("Bob")],
            ],
        );
        let docs = ws.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["name"], "Alice");
        assert_eq!(docs[1]["_key"], "b");
    }

    #[test]
    fn test_from_range_aligns_offset_ranges() {
        // Used range starting at B1 rather than A1
        let mut range = Range::new((0, 1), (5, 2));
        range.set_value((0, 1), s("doc"));
        range.set_value((4, 1), s("_key"));
        range.set_value((4, 2), s("name"));
        range.set_value((5, 1), s("k1"));
        range.set_value((5, 2), s("Alice"));

        let ws = Worksheet::from_range("Person", &range);
        assert_eq!(ws.cell(1, 2), &s("doc"));
        assert_eq!(ws.classify().unwrap().kind, CollectionKind::Document);
        assert_eq!(ws.property_names(), vec!["", "_key", "name"]);

        let docs = ws.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["_key"], "k1");
        assert_eq!(docs[0]["name"], "Alice");
    }

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let ws = Worksheet::new("X", vec![vec![s("a")]]);
        assert_eq!(ws.cell(1, 1), &s("a"));
        assert_eq!(ws.cell(9, 9), &Data::Empty);
        assert_eq!(ws.cell(0, 1), &Data::Empty);
    }
}
