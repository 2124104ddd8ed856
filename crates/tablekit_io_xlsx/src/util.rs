//! Stateless helper utilities used by the table-sheet writer kernel.

use std::collections::BTreeMap;

use crate::conf::{
    FMT_DATE_TIME, FMT_DURATION, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellOutcome, EnumCellValue, EnumValueKind, ErrorTableSheet};

////////////////////////////////////////////////////////////////////////////////
// #region LabelNormalization

/// Resolve a unique header label against already-registered labels.
///
/// `dict_label_positions` is keyed by lowercased label. A case-insensitive
/// collision resolves by suffixing `_1`, `_2`, ... in registration order.
pub fn derive_unique_label(
    candidate: &str,
    dict_label_positions: &BTreeMap<String, usize>,
) -> String {
    if !dict_label_positions.contains_key(&candidate.to_lowercase()) {
        return candidate.to_string();
    }

    let mut n_iteration = 0usize;
    loop {
        n_iteration += 1;
        let c_label = format!("{candidate}_{n_iteration}");
        if !dict_label_positions.contains_key(&c_label.to_lowercase()) {
            return c_label;
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to a valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Derive the table object name from the worksheet display name.
pub fn derive_table_name(sheet_name: &str) -> String {
    sheet_name.replace(' ', "_")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellRenderPlanning

/// Map one getter outcome to the cell value plus an optional diagnostic note.
///
/// Centralizes the degrade-to-empty policy: extraction failures and
/// unexpected failures annotate the empty cell, invocation-wrapper failures
/// stay silent. The declared `kind` is consulted in exactly one place, to
/// render enumeration members by symbolic name.
pub fn plan_cell_render(
    outcome: EnumCellOutcome,
    kind: EnumValueKind,
) -> (EnumCellValue, Option<String>) {
    let (value, annotation) = match outcome {
        EnumCellOutcome::Value(value) => (value, None),
        EnumCellOutcome::ExtractionFailed { property, message } => (
            EnumCellValue::None,
            Some(format!("Error: {message}\nProperty: {property}")),
        ),
        EnumCellOutcome::InvocationFailed(_) => (EnumCellValue::None, None),
        EnumCellOutcome::Unexpected(detail) => {
            (EnumCellValue::None, Some(format!("Error: {detail}")))
        }
    };

    let value = match (kind, value) {
        (EnumValueKind::Enumeration, EnumCellValue::Enumeration { name, .. }) => {
            EnumCellValue::Text(name)
        }
        (_, EnumCellValue::Enumeration { ordinal, .. }) => EnumCellValue::Integer(ordinal),
        (_, value) => value,
    };

    (value, annotation)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert an elapsed duration to an Excel serial value (fraction of a day),
/// so elapsed-time formats like `[hh]:mm:ss` display it.
pub fn convert_duration_to_serial(value: std::time::Duration) -> f64 {
    value.as_secs_f64() / 86_400.0
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Estimate displayed width units for one cell value.
///
/// Used by the best-effort autofit pass. Date-time and duration estimates
/// follow their format pattern lengths.
pub fn estimate_cell_width(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::Text(val) => estimate_unicode_string_width(val),
        EnumCellValue::Integer(val) => val.to_string().len(),
        EnumCellValue::Decimal(val) => format!("{val:.4}").len(),
        EnumCellValue::Boolean(_) => 5,
        EnumCellValue::DateTime(_) => FMT_DATE_TIME.len(),
        EnumCellValue::Duration(_) => FMT_DURATION.len(),
        EnumCellValue::Enumeration { name, .. } => estimate_unicode_string_width(name),
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasting

/// Cast a zero-based row index into the engine's row number type.
pub fn cast_row_num(value: usize) -> Result<u32, ErrorTableSheet> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(ErrorTableSheet::RowIndexOverflow(value));
    }
    u32::try_from(value).map_err(|_| ErrorTableSheet::RowIndexOverflow(value))
}

/// Cast a zero-based column index into the engine's column number type.
pub fn cast_col_num(value: usize) -> Result<u16, ErrorTableSheet> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(ErrorTableSheet::ColumnIndexOverflow(value));
    }
    u16::try_from(value).map_err(|_| ErrorTableSheet::ColumnIndexOverflow(value))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(labels: &[&str]) -> BTreeMap<String, usize> {
        labels
            .iter()
            .enumerate()
            .map(|(n_idx, c_label)| (c_label.to_lowercase(), n_idx))
            .collect()
    }

    #[test]
    fn test_derive_unique_label_keeps_free_candidate() {
        assert_eq!(derive_unique_label("Name", &index_of(&[])), "Name");
        assert_eq!(derive_unique_label("Name", &index_of(&["Score"])), "Name");
    }

    #[test]
    fn test_derive_unique_label_suffixes_in_registration_order() {
        assert_eq!(derive_unique_label("Name", &index_of(&["Name"])), "Name_1");
        assert_eq!(
            derive_unique_label("Name", &index_of(&["Name", "Name_1"])),
            "Name_2"
        );
    }

    #[test]
    fn test_derive_unique_label_is_case_insensitive() {
        assert_eq!(derive_unique_label("name", &index_of(&["Name"])), "name_1");
        assert_eq!(
            derive_unique_label("NAME", &index_of(&["Name", "name_1"])),
            "NAME_2"
        );
    }

    #[test]
    fn test_sanitize_sheet_name_replaces_illegal_chars() {
        assert_eq!(sanitize_sheet_name("run: a/b?", "_"), "run_ a_b_");
        assert_eq!(sanitize_sheet_name("  padded  ", "_"), "padded");
        assert_eq!(sanitize_sheet_name("", "_"), "Sheet");
    }

    #[test]
    fn test_sanitize_sheet_name_caps_length() {
        let c_name = sanitize_sheet_name(&"x".repeat(64), "_");
        assert_eq!(c_name.len(), N_LEN_EXCEL_SHEET_NAME_MAX);
    }

    #[test]
    fn test_derive_table_name_replaces_spaces() {
        assert_eq!(derive_table_name("Build Results"), "Build_Results");
        assert_eq!(derive_table_name("Plain"), "Plain");
    }

    #[test]
    fn test_plan_cell_render_extraction_failure_notes_the_property() {
        let (value, annotation) = plan_cell_render(
            EnumCellOutcome::ExtractionFailed {
                property: "score".to_string(),
                message: "sensor offline".to_string(),
            },
            EnumValueKind::Decimal,
        );
        assert_eq!(value, EnumCellValue::None);
        let c_note = annotation.expect("extraction failure must annotate");
        assert!(c_note.contains("sensor offline"));
        assert!(c_note.contains("Property: score"));
    }

    #[test]
    fn test_plan_cell_render_invocation_failure_is_silent() {
        let (value, annotation) = plan_cell_render(
            EnumCellOutcome::InvocationFailed("boxed panic".to_string()),
            EnumValueKind::Text,
        );
        assert_eq!(value, EnumCellValue::None);
        assert_eq!(annotation, None);
    }

    #[test]
    fn test_plan_cell_render_unexpected_failure_notes_the_detail() {
        let (value, annotation) = plan_cell_render(
            EnumCellOutcome::Unexpected("io broke".to_string()),
            EnumValueKind::Text,
        );
        assert_eq!(value, EnumCellValue::None);
        assert_eq!(annotation, Some("Error: io broke".to_string()));
    }

    #[test]
    fn test_plan_cell_render_enum_column_uses_symbolic_name() {
        let (value, annotation) = plan_cell_render(
            EnumCellOutcome::Value(EnumCellValue::Enumeration {
                name: "Running".to_string(),
                ordinal: 1,
            }),
            EnumValueKind::Enumeration,
        );
        assert_eq!(value, EnumCellValue::Text("Running".to_string()));
        assert_eq!(annotation, None);
    }

    #[test]
    fn test_plan_cell_render_enum_value_in_non_enum_column_uses_ordinal() {
        let (value, _) = plan_cell_render(
            EnumCellOutcome::Value(EnumCellValue::Enumeration {
                name: "Running".to_string(),
                ordinal: 1,
            }),
            EnumValueKind::Integer,
        );
        assert_eq!(value, EnumCellValue::Integer(1));
    }

    #[test]
    fn test_convert_duration_to_serial_yields_day_fraction() {
        use std::time::Duration;

        assert_eq!(convert_duration_to_serial(Duration::ZERO), 0.0);
        assert_eq!(convert_duration_to_serial(Duration::from_secs(5_400)), 0.0625);
        assert_eq!(
            convert_duration_to_serial(Duration::from_secs(86_400)),
            1.0
        );
        assert_eq!(
            convert_duration_to_serial(Duration::from_millis(250)),
            250.0 / 1_000.0 / 86_400.0
        );
    }

    #[test]
    fn test_estimate_cell_width_by_value_kind() {
        assert_eq!(estimate_cell_width(&EnumCellValue::None), 0);
        assert_eq!(
            estimate_cell_width(&EnumCellValue::Text("abcd".to_string())),
            4
        );
        assert_eq!(estimate_cell_width(&EnumCellValue::Integer(-1234)), 5);
        assert_eq!(estimate_cell_width(&EnumCellValue::Decimal(1.5)), 6);
        assert_eq!(estimate_cell_width(&EnumCellValue::Boolean(true)), 5);
    }

    #[test]
    fn test_cast_col_num_rejects_indices_beyond_excel_limit() {
        assert!(cast_col_num(0).is_ok());
        assert!(cast_col_num(N_NCOLS_EXCEL_MAX - 1).is_ok());
        assert!(matches!(
            cast_col_num(N_NCOLS_EXCEL_MAX),
            Err(ErrorTableSheet::ColumnIndexOverflow(_))
        ));
    }

    #[test]
    fn test_cast_row_num_rejects_indices_beyond_excel_limit() {
        assert!(cast_row_num(N_NROWS_EXCEL_MAX - 1).is_ok());
        assert!(matches!(
            cast_row_num(N_NROWS_EXCEL_MAX),
            Err(ErrorTableSheet::RowIndexOverflow(_))
        ));
    }
}
