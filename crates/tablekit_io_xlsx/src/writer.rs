//! Table-sheet writer kernel that maps typed element collections onto
//! structured worksheet tables.

use std::collections::BTreeMap;

use rust_xlsxwriter::{Format, Note, Table, TableColumn, Workbook, Worksheet};

use crate::conf::C_NOTE_AUTHOR;
use crate::spec::{
    ColumnId, EnumCellOutcome, EnumCellValue, EnumValueKind, ErrorColumnValue, ErrorTableSheet,
    SpecCellAnnotation, SpecTableColumn, SpecTableSheetBuildOptions, SpecTableSheetReport,
};
use crate::util::{
    cast_col_num, cast_row_num, convert_duration_to_serial, derive_table_name,
    derive_unique_label, estimate_cell_width, plan_cell_render, sanitize_sheet_name,
};

/// Definition of one structured table over elements of `T`: an ordered column
/// registry plus the worksheet display name.
///
/// Columns accumulate monotonically; there is no removal operation. The
/// definition is read-only during [`TableSheet::build_table_sheet`].
pub struct TableSheet<T> {
    sheet_name: String,
    columns: Vec<SpecTableColumn<T>>,
    dict_label_positions: BTreeMap<String, usize>,
    n_id_next: u64,
}

impl<T> TableSheet<T> {
    /// Create an empty table definition with a worksheet display name.
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns: Vec::new(),
            dict_label_positions: BTreeMap::new(),
            n_id_next: 0,
        }
    }

    /// Worksheet display name before sanitization.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Registered columns in registration order.
    pub fn columns(&self) -> &[SpecTableColumn<T>] {
        &self.columns
    }

    /// Register a column and return its identity.
    ///
    /// The label defaults to the kind's display name when absent; a
    /// case-insensitive collision with an existing label resolves by
    /// suffixing `_1`, `_2`, ... in registration order. The format defaults
    /// per the kind's policy when absent.
    pub fn add_column<F>(
        &mut self,
        kind: EnumValueKind,
        getter: F,
        label: Option<&str>,
        format: Option<&str>,
    ) -> ColumnId
    where
        F: Fn(&T) -> Result<EnumCellValue, ErrorColumnValue> + Send + Sync + 'static,
    {
        let c_candidate = match label {
            Some(val) if !val.is_empty() => val.to_string(),
            _ => kind.display_name().to_string(),
        };
        let c_label = derive_unique_label(&c_candidate, &self.dict_label_positions);
        self.dict_label_positions
            .insert(c_label.to_lowercase(), self.columns.len());

        let id = ColumnId(self.n_id_next);
        self.n_id_next += 1;

        let column = SpecTableColumn::create(id, kind, Box::new(getter), Some(&c_label), format);
        self.columns.push(column);
        id
    }

    /// Register a column with an infallible getter.
    pub fn add_value_column<F>(
        &mut self,
        kind: EnumValueKind,
        getter: F,
        label: Option<&str>,
        format: Option<&str>,
    ) -> ColumnId
    where
        F: Fn(&T) -> EnumCellValue + Send + Sync + 'static,
    {
        self.add_column(kind, move |item| Ok(getter(item)), label, format)
    }

    /// Build a worksheet containing one structured table from `source`.
    ///
    /// Writes the header row at `options.n_row_start` (1-based), one body row
    /// per source element, registers the filled rectangle as a table object
    /// named after the sheet name with spaces replaced by underscores, then
    /// runs the best-effort column autofit pass. Per-cell getter failures are
    /// isolated: the cell degrades to empty, optionally with a diagnostic
    /// note, and the build continues.
    pub fn build_table_sheet<'a, I>(
        &'a self,
        workbook: &mut Workbook,
        source: I,
        options: &SpecTableSheetBuildOptions,
    ) -> Result<SpecTableSheetReport, ErrorTableSheet>
    where
        I: IntoIterator<Item = &'a T>,
    {
        if options.n_row_start < 1 {
            return Err(ErrorTableSheet::InvalidStartRow(options.n_row_start));
        }
        if self.columns.is_empty() {
            return Err(ErrorTableSheet::NoColumns);
        }

        let mut report = SpecTableSheetReport::default();

        let c_sheet_name = sanitize_sheet_name(&self.sheet_name, "_");
        if c_sheet_name != self.sheet_name {
            report.warn(format!(
                "Sheet name sanitized: {:?} -> {:?}",
                self.sheet_name, c_sheet_name
            ));
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&c_sheet_name)?;

        let n_row_header = (options.n_row_start - 1) as usize;
        let n_cols = self.columns.len();
        let mut l_width_by_col = vec![0usize; n_cols];

        self.write_header_row(worksheet, n_row_header, &mut l_width_by_col)?;

        let n_rows_written = self.write_table_body(
            worksheet,
            n_row_header + 1,
            source,
            &mut l_width_by_col,
            &mut report,
        )?;

        // An xlsx table owns at least one data row; an empty source keeps a
        // single blank placeholder row under the header.
        let n_row_table_last = n_row_header + usize::max(n_rows_written, 1);
        let c_table_name = derive_table_name(&c_sheet_name);

        let l_table_columns: Vec<TableColumn> = self
            .columns
            .iter()
            .map(|column| TableColumn::new().set_header(column.label()))
            .collect();
        let table = Table::new()
            .set_name(&c_table_name)
            .set_columns(&l_table_columns);
        worksheet.add_table(
            cast_row_num(n_row_header)?,
            0,
            cast_row_num(n_row_table_last)?,
            cast_col_num(n_cols - 1)?,
            &table,
        )?;

        if options.policy_autofit.if_enabled {
            apply_column_autofit(worksheet, &l_width_by_col, options);
        }

        report.sheet_name = c_sheet_name;
        report.table_name = c_table_name;
        report.n_row_header = options.n_row_start;
        report.n_row_table_last = cast_row_num(n_row_table_last)? + 1;
        report.n_cols = cast_col_num(n_cols - 1)? + 1;
        report.n_rows_written = n_rows_written;
        Ok(report)
    }

    fn write_header_row(
        &self,
        worksheet: &mut Worksheet,
        n_row_header: usize,
        l_width_by_col: &mut [usize],
    ) -> Result<(), ErrorTableSheet> {
        let row_num = cast_row_num(n_row_header)?;
        for (n_idx_col, column) in self.columns.iter().enumerate() {
            let col_num = cast_col_num(n_idx_col)?;
            worksheet.write_string(row_num, col_num, column.label())?;
            if !column.format().is_empty() {
                let fmt = Format::new().set_num_format(column.format());
                worksheet.set_column_format(col_num, &fmt)?;
            }
            l_width_by_col[n_idx_col] =
                estimate_cell_width(&EnumCellValue::Text(column.label().to_string()));
        }
        Ok(())
    }

    fn write_table_body<'a, I>(
        &'a self,
        worksheet: &mut Worksheet,
        n_row_body_first: usize,
        source: I,
        l_width_by_col: &mut [usize],
        report: &mut SpecTableSheetReport,
    ) -> Result<usize, ErrorTableSheet>
    where
        I: IntoIterator<Item = &'a T>,
    {
        let mut n_rows_written = 0usize;
        for item in source {
            let row_num = cast_row_num(n_row_body_first + n_rows_written)?;
            for (n_idx_col, column) in self.columns.iter().enumerate() {
                let col_num = cast_col_num(n_idx_col)?;
                let outcome = EnumCellOutcome::from(column.invoke(item));
                let (value, annotation) = plan_cell_render(outcome, column.kind());

                l_width_by_col[n_idx_col] =
                    usize::max(l_width_by_col[n_idx_col], estimate_cell_width(&value));
                write_cell_value(worksheet, row_num, col_num, &value)?;

                if let Some(c_text) = annotation {
                    let note = Note::new(c_text.as_str())
                        .add_author_prefix(false)
                        .set_author(C_NOTE_AUTHOR);
                    worksheet.insert_note(row_num, col_num, &note)?;
                    report.annotations.push(SpecCellAnnotation {
                        n_row: row_num + 1,
                        n_col: col_num + 1,
                        text: c_text,
                    });
                }
            }
            n_rows_written += 1;
        }
        Ok(n_rows_written)
    }
}

fn write_cell_value(
    worksheet: &mut Worksheet,
    row_num: u32,
    col_num: u16,
    value: &EnumCellValue,
) -> Result<(), ErrorTableSheet> {
    match value {
        EnumCellValue::None => {
            worksheet.write_string(row_num, col_num, "")?;
        }
        EnumCellValue::Text(val) => {
            worksheet.write_string(row_num, col_num, val)?;
        }
        EnumCellValue::Integer(val) => {
            worksheet.write_number(row_num, col_num, *val as f64)?;
        }
        EnumCellValue::Decimal(val) => {
            worksheet.write_number(row_num, col_num, *val)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean(row_num, col_num, *val)?;
        }
        EnumCellValue::DateTime(val) => {
            worksheet.write_datetime(row_num, col_num, val)?;
        }
        EnumCellValue::Duration(val) => {
            worksheet.write_number(row_num, col_num, convert_duration_to_serial(*val))?;
        }
        EnumCellValue::Enumeration { ordinal, .. } => {
            worksheet.write_number(row_num, col_num, *ordinal as f64)?;
        }
    }
    Ok(())
}

/// Best-effort width pass; per-column failures are ignored.
fn apply_column_autofit(
    worksheet: &mut Worksheet,
    l_width_by_col: &[usize],
    options: &SpecTableSheetBuildOptions,
) {
    let n_min = usize::max(1, options.policy_autofit.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, options.policy_autofit.width_cell_max));
    let n_pad = options.policy_autofit.width_cell_padding;

    for (n_idx_col, n_width_recorded) in l_width_by_col.iter().enumerate() {
        let n_width_final = usize::min(n_max, usize::max(n_min, n_width_recorded + n_pad));
        let Ok(col_num) = cast_col_num(n_idx_col) else {
            continue;
        };
        let _ = worksheet.set_column_width(col_num, n_width_final as f64);
    }
}
