//! Grid column layout
//!
//! Column definitions for the drugs grid and the two sizing actions offered by
//! the toolbar. Widths are in character cells.

use crate::domain::GridRow;

/// Narrowest a visible column may become
pub const MIN_COLUMN_WIDTH: usize = 4;

/// Column of the drugs grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Ptkey,
    Name,
    Dose,
    Time,
    Notes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub field: Field,
    pub header: &'static str,
    pub hidden: bool,
    pub width: usize,
}

/// Ordered column definitions with their current widths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<ColumnDef>,
    viewport: usize,
}

impl ColumnLayout {
    pub fn new(default_width: usize, viewport: usize) -> Self {
        let column = |field, header, hidden| ColumnDef {
            field,
            header,
            hidden,
            width: default_width.max(MIN_COLUMN_WIDTH),
        };

        Self {
            columns: vec![
                column(Field::Id, "id", false),
                column(Field::Ptkey, "ptkey", true),
                column(Field::Name, "name", false),
                column(Field::Dose, "dose", false),
                column(Field::Time, "time", false),
                column(Field::Notes, "notes", false),
            ],
            viewport,
        }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Columns that are drawn
    pub fn visible(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.hidden)
    }

    pub fn width_of(&self, field: Field) -> Option<usize> {
        self.columns.iter().find(|c| c.field == field).map(|c| c.width)
    }

    /// Sum of visible widths
    pub fn total_width(&self) -> usize {
        self.visible().map(|c| c.width).sum()
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    /// Text shown for `field` in `row`
    pub fn cell_text(row: &GridRow, field: Field) -> String {
        let fields = row.fields();
        match field {
            Field::Id => row.key().id().map(|id| id.to_string()).unwrap_or_default(),
            Field::Ptkey => row.ptkey().map(|k| k.to_string()).unwrap_or_default(),
            Field::Name => fields.name.clone(),
            Field::Dose => fields.dose.map(|d| d.to_string()).unwrap_or_default(),
            Field::Time => fields.time.clone(),
            Field::Notes => fields.notes.clone(),
        }
    }

    /// Size every visible column to its widest cell or header
    pub fn auto_size(&mut self, rows: &[GridRow]) {
        for column in self.columns.iter_mut().filter(|c| !c.hidden) {
            let widest = rows
                .iter()
                .map(|row| Self::cell_text(row, column.field).chars().count())
                .max()
                .unwrap_or(0);
            column.width = widest
                .max(column.header.chars().count())
                .max(MIN_COLUMN_WIDTH);
        }
    }

    /// Scale visible columns so together they fill the viewport
    ///
    /// Widths keep their proportions; rounding leftovers go to the last
    /// visible column. When the viewport cannot hold every column at the
    /// minimum width, each column gets the minimum.
    pub fn size_to_fit(&mut self) {
        let visible: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.hidden)
            .map(|(i, _)| i)
            .collect();
        let Some(&last) = visible.last() else {
            return;
        };

        let floor = MIN_COLUMN_WIDTH * visible.len();
        if self.viewport <= floor {
            for &i in &visible {
                self.columns[i].width = MIN_COLUMN_WIDTH;
            }
            return;
        }

        let current: usize = visible.iter().map(|&i| self.columns[i].width).sum();
        let spare = self.viewport - floor;
        let mut assigned = 0;
        for &i in &visible {
            let share = if current == 0 {
                spare / visible.len()
            } else {
                spare * self.columns[i].width / current
            };
            self.columns[i].width = MIN_COLUMN_WIDTH + share;
            assigned += self.columns[i].width;
        }
        self.columns[last].width += self.viewport - assigned;
    }

    /// Header line for text output
    pub fn render_header(&self) -> String {
        self.visible()
            .map(|c| pad(c.header, c.width))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    }

    /// One row as a text line
    pub fn render_row(&self, row: &GridRow) -> String {
        self.visible()
            .map(|c| pad(&Self::cell_text(row, c.field), c.width))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    }
}

fn pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DrugFields, DrugRecord, PatientKey, RecordId};

    fn row(id: i64, name: &str, notes: &str) -> GridRow {
        GridRow::Persisted(DrugRecord::new(
            RecordId::new(id).unwrap(),
            PatientKey::new("P1").unwrap(),
            DrugFields::named(name).with_notes(notes),
        ))
    }

    #[test]
    fn test_ptkey_hidden() {
        let layout = ColumnLayout::new(10, 80);
        let headers: Vec<_> = layout.visible().map(|c| c.header).collect();
        assert_eq!(headers, vec!["id", "name", "dose", "time", "notes"]);
    }

    #[test]
    fn test_auto_size_uses_widest_cell() {
        let mut layout = ColumnLayout::new(10, 80);
        layout.auto_size(&[row(1, "L-Asparginase", ""), row(2, "Insulin", "x")]);
        assert_eq!(layout.width_of(Field::Name), Some(13));
        assert_eq!(layout.width_of(Field::Notes), Some(5));
        assert_eq!(layout.width_of(Field::Id), Some(MIN_COLUMN_WIDTH));
        // hidden columns keep their width
        assert_eq!(layout.width_of(Field::Ptkey), Some(10));
    }

    #[test]
    fn test_size_to_fit_fills_viewport() {
        let mut layout = ColumnLayout::new(10, 123);
        layout.auto_size(&[row(1, "Prednisolon", "after breakfast")]);
        layout.size_to_fit();
        assert_eq!(layout.total_width(), 123);
        assert!(layout.visible().all(|c| c.width >= MIN_COLUMN_WIDTH));
        assert!(layout.width_of(Field::Notes) > layout.width_of(Field::Id));
    }

    #[test]
    fn test_size_to_fit_narrow_viewport() {
        let mut layout = ColumnLayout::new(10, 8);
        layout.size_to_fit();
        assert!(layout.visible().all(|c| c.width == MIN_COLUMN_WIDTH));
    }

    #[test]
    fn test_draft_cells_are_empty() {
        let layout = ColumnLayout::new(6, 80);
        let line = layout.render_row(&GridRow::empty_draft());
        assert!(line.trim().is_empty());
        assert!(layout.render_header().starts_with("id"));
    }
}
