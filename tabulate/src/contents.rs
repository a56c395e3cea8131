use std::collections::BTreeMap;

use crate::AttributeGroup;

/// One column of the output, with the columns nested under it.
///
/// `rows[i]` is the cell for path `i`. A slot is taken as soon as `rows.len() > i`,
/// even when it holds `None`; taken slots are never written again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredTable {
    header: String,
    rows: Vec<Option<String>>,
    children: Vec<StructuredTable>,
}

impl StructuredTable {
    /// A column for `group` (and its children, recursively) whose first value sits at `row`.
    pub fn new(group: &AttributeGroup, row: usize) -> Self {
        let mut table = Self {
            header: group.header.clone(),
            rows: Vec::with_capacity(row + 1),
            children: group.children.iter().map(|c| Self::new(c, row)).collect(),
        };
        table.fill(row, Some(group.value.clone()));
        table
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn rows(&self) -> &[Option<String>] {
        &self.rows
    }

    pub fn children(&self) -> &[StructuredTable] {
        &self.children
    }

    /// Number of flat columns, this one included.
    pub fn width(&self) -> usize {
        1 + self.children.iter().map(Self::width).sum::<usize>()
    }

    fn is_free(&self, row: usize) -> bool {
        self.rows.len() <= row
    }

    fn fill(&mut self, row: usize, value: Option<String>) {
        self.rows.resize(row, None);
        self.rows.push(value);
    }

    fn fill_blank(&mut self, row: usize) {
        if self.is_free(row) {
            self.fill(row, None);
        }
        for child in &mut self.children {
            child.fill_blank(row);
        }
    }

    fn push_headers(&self, out: &mut Vec<String>) {
        out.push(self.header.clone());
        for child in &self.children {
            child.push_headers(out);
        }
    }

    fn push_cells(&self, row: usize, out: &mut Vec<Option<String>>) {
        out.push(self.rows.get(row).cloned().flatten());
        for child in &self.children {
            child.push_cells(row, out);
        }
    }
}

/// Merge `groups` into `tables` at `row`. A group lands in the first column with the same
/// header whose slot is still free, and its children are merged the same way into that
/// column's children. Otherwise a new column is appended.
fn merge_groups(tables: &mut Vec<StructuredTable>, groups: &[AttributeGroup], row: usize) {
    for group in groups {
        let existing = tables
            .iter_mut()
            .find(|t| t.header == group.header && t.is_free(row));
        match existing {
            Some(table) => {
                table.fill(row, Some(group.value.clone()));
                merge_groups(&mut table.children, &group.children, row);
            }
            None => {
                log::trace!("new column {:?} at row {row}", group.header);
                tables.push(StructuredTable::new(group, row));
            }
        }
    }
}

/// The columns of every layer, in layer order.
///
/// Columns are only ever appended, so groups of different nodes can end up interleaved
/// (e.g. a characteristic of one node type between two columns of another).
#[derive(Debug, Clone, Default)]
pub struct TableContents {
    layers: BTreeMap<usize, Vec<StructuredTable>>,
}

impl TableContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the groups of a node into `layer` at `row`; `None` marks a gap, which
    /// blanks every column of the layer that has nothing at `row` yet.
    pub fn merge_node(&mut self, layer: usize, groups: Option<&[AttributeGroup]>, row: usize) {
        let tables = self.layers.entry(layer).or_default();
        match groups {
            Some(groups) => merge_groups(tables, groups, row),
            None => {
                for table in tables.iter_mut() {
                    table.fill_blank(row);
                }
            }
        }
    }

    pub fn layer(&self, layer: usize) -> &[StructuredTable] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of flat columns.
    pub fn ncols(&self) -> usize {
        self.tables().map(StructuredTable::width).sum()
    }

    /// Flat headers: layers left to right, each column followed by its children.
    pub fn headers(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.ncols());
        for table in self.tables() {
            table.push_headers(&mut out);
        }
        out
    }

    /// Flat cells of `row`, aligned with [`Self::headers`]; slots never filled are `None`.
    pub fn row(&self, row: usize) -> Vec<Option<String>> {
        let mut out = Vec::with_capacity(self.ncols());
        for table in self.tables() {
            table.push_cells(row, &mut out);
        }
        out
    }

    fn tables(&self) -> impl Iterator<Item = &StructuredTable> + '_ {
        self.layers.values().flatten()
    }
}
