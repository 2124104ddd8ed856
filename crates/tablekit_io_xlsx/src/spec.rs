//! Shared table-sheet specification models.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::{FMT_DATE_TIME, FMT_DURATION};

////////////////////////////////////////////////////////////////////////////////
// #region ValueSpecification

/// Declared value kind of one table column.
///
/// Stands in for the source property's type; consulted for the default label,
/// the default display format and (for [`EnumValueKind::Enumeration`]) the
/// symbolic-name rendering of cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumValueKind {
    /// Free-form text column.
    Text,
    /// Whole-number column.
    Integer,
    /// Floating-point column.
    Decimal,
    /// Boolean column.
    Boolean,
    /// Calendar date-time column.
    DateTime,
    /// Elapsed-duration column.
    Duration,
    /// Symbolic enumeration column.
    Enumeration,
}

impl EnumValueKind {
    /// Display name used as the default column label.
    pub fn display_name(&self) -> &'static str {
        match self {
            EnumValueKind::Text => "Text",
            EnumValueKind::Integer => "Integer",
            EnumValueKind::Decimal => "Decimal",
            EnumValueKind::Boolean => "Boolean",
            EnumValueKind::DateTime => "DateTime",
            EnumValueKind::Duration => "Duration",
            EnumValueKind::Enumeration => "Enumeration",
        }
    }

    /// Default display format applied when the caller supplied none.
    pub fn default_format(&self) -> &'static str {
        match self {
            EnumValueKind::DateTime => FMT_DATE_TIME,
            EnumValueKind::Duration => FMT_DURATION,
            _ => "",
        }
    }
}

/// Value produced by a column getter for one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/absent value; rendered as empty string.
    None,
    /// Text value.
    Text(String),
    /// Whole-number value. Written as an xlsx number cell, which is an IEEE
    /// double; magnitudes above 2^53 lose precision.
    Integer(i64),
    /// Floating-point value.
    Decimal(f64),
    /// Boolean value.
    Boolean(bool),
    /// Calendar date-time value.
    DateTime(NaiveDateTime),
    /// Elapsed-duration value; serialized as a fraction of a day.
    Duration(Duration),
    /// Enumeration member with its symbolic name and raw ordinal.
    Enumeration {
        /// Symbolic member name.
        name: String,
        /// Underlying ordinal value.
        ordinal: i64,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnSpecification

/// Opaque column identity, unique within one table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(pub(crate) u64);

/// Boxed value getter from a source element to a cell value.
pub type FnColumnGetter<T> =
    Box<dyn Fn(&T) -> Result<EnumCellValue, ErrorColumnValue> + Send + Sync>;

/// Descriptor of one structured-table column: metadata plus getter.
pub struct SpecTableColumn<T> {
    id: ColumnId,
    kind: EnumValueKind,
    label: String,
    format: String,
    getter: FnColumnGetter<T>,
}

impl<T> SpecTableColumn<T> {
    /// Create a descriptor, defaulting label and format from `kind` when the
    /// caller supplied none (empty counts as none).
    pub fn create(
        id: ColumnId,
        kind: EnumValueKind,
        getter: FnColumnGetter<T>,
        label: Option<&str>,
        format: Option<&str>,
    ) -> Self {
        let c_label = match label {
            Some(val) if !val.is_empty() => val.to_string(),
            _ => kind.display_name().to_string(),
        };
        let c_format = match format {
            Some(val) if !val.is_empty() => val.to_string(),
            _ => kind.default_format().to_string(),
        };
        Self {
            id,
            kind,
            label: c_label,
            format: c_format,
            getter,
        }
    }

    /// Column identity.
    pub fn id(&self) -> ColumnId {
        self.id
    }

    /// Declared value kind.
    pub fn kind(&self) -> EnumValueKind {
        self.kind
    }

    /// Header label (unique within one table definition).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Display format pattern; empty means engine default.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Invoke the getter for one source element.
    pub fn invoke(&self, item: &T) -> Result<EnumCellValue, ErrorColumnValue> {
        (self.getter)(item)
    }
}

impl<T> fmt::Debug for SpecTableColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecTableColumn")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OutcomeSpecification

/// Explicit per-cell getter outcome consumed by the render planner.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellOutcome {
    /// Getter produced a value.
    Value(EnumCellValue),
    /// Getter raised a value-extraction failure for a named property.
    ExtractionFailed {
        /// Property identity that caused the failure.
        property: String,
        /// Failure message.
        message: String,
    },
    /// Getter raised a generic invocation-wrapper failure.
    InvocationFailed(String),
    /// Getter raised any other failure.
    Unexpected(String),
}

impl From<Result<EnumCellValue, ErrorColumnValue>> for EnumCellOutcome {
    fn from(result: Result<EnumCellValue, ErrorColumnValue>) -> Self {
        match result {
            Ok(value) => EnumCellOutcome::Value(value),
            Err(ErrorColumnValue::Extraction { property, message }) => {
                EnumCellOutcome::ExtractionFailed { property, message }
            }
            Err(ErrorColumnValue::Invocation(detail)) => EnumCellOutcome::InvocationFailed(detail),
            Err(ErrorColumnValue::Unexpected(detail)) => EnumCellOutcome::Unexpected(detail),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OptionsSpecification

/// Best-effort column autofit policy for one build call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitColumnsPolicy {
    /// Run the autofit pass after the table is registered.
    pub if_enabled: bool,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitColumnsPolicy {
    fn default() -> Self {
        Self {
            if_enabled: true,
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Per-build call options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableSheetBuildOptions {
    /// Header row index, 1-based. Must be >= 1.
    pub n_row_start: u32,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitColumnsPolicy,
}

impl Default for SpecTableSheetBuildOptions {
    fn default() -> Self {
        Self {
            n_row_start: 1,
            policy_autofit: SpecAutofitColumnsPolicy::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One diagnostic note written into a cell (1-based coordinates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCellAnnotation {
    /// Row index, 1-based.
    pub n_row: u32,
    /// Column index, 1-based.
    pub n_col: u16,
    /// Note text.
    pub text: String,
}

/// Per-build call report.
///
/// The worksheet and table stay owned by the `Workbook`; this report carries
/// their names and the written geometry so callers can resolve handles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecTableSheetReport {
    /// Actual worksheet name after sanitization.
    pub sheet_name: String,
    /// Registered table object name.
    pub table_name: String,
    /// Header row index, 1-based.
    pub n_row_header: u32,
    /// Last row of the registered table range, 1-based.
    pub n_row_table_last: u32,
    /// Number of table columns.
    pub n_cols: u16,
    /// Number of body rows written from the source sequence.
    pub n_rows_written: usize,
    /// Diagnostic notes written during the body phase.
    pub annotations: Vec<SpecCellAnnotation>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecTableSheetReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ErrorSpecification

/// Failure raised by a column getter for one source element.
///
/// [`ErrorColumnValue::Extraction`] is the domain-specific path: it names the
/// offending property and surfaces as a diagnostic cell note. The other two
/// variants degrade to an empty cell, with and without a note respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorColumnValue {
    /// Getter could not produce a value for a named property.
    #[error("{message}\nProperty: {property}")]
    Extraction {
        /// Property identity that caused the failure.
        property: String,
        /// Failure message.
        message: String,
    },
    /// Generic invocation-wrapper failure.
    #[error("column getter invocation failed: {0}")]
    Invocation(String),
    /// Any other getter failure.
    #[error("unexpected column getter failure: {0}")]
    Unexpected(String),
}

impl ErrorColumnValue {
    /// Build an extraction failure for a named property.
    pub fn extraction(property: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorColumnValue::Extraction {
            property: property.into(),
            message: message.into(),
        }
    }
}

/// Fatal build failure surfaced to the caller.
#[derive(Debug, Error)]
pub enum ErrorTableSheet {
    /// Header row index below the 1-based minimum.
    #[error("start row must be >= 1 (got {0})")]
    InvalidStartRow(u32),
    /// Build attempted with no registered columns.
    #[error("table definition has no registered columns")]
    NoColumns,
    /// Row index beyond the Excel worksheet limit.
    #[error("row index out of Excel range: {0}")]
    RowIndexOverflow(usize),
    /// Column index beyond the Excel worksheet limit.
    #[error("column index out of Excel range: {0}")]
    ColumnIndexOverflow(usize),
    /// Propagated engine failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{FMT_DATE_TIME, FMT_DURATION};

    #[test]
    fn test_default_format_follows_declared_kind() {
        assert_eq!(EnumValueKind::DateTime.default_format(), FMT_DATE_TIME);
        assert_eq!(EnumValueKind::Duration.default_format(), FMT_DURATION);
        assert_eq!(EnumValueKind::Text.default_format(), "");
        assert_eq!(EnumValueKind::Integer.default_format(), "");
        assert_eq!(EnumValueKind::Enumeration.default_format(), "");
    }

    #[test]
    fn test_create_defaults_label_and_format_from_kind() {
        let column: SpecTableColumn<()> = SpecTableColumn::create(
            ColumnId(0),
            EnumValueKind::DateTime,
            Box::new(|_| Ok(EnumCellValue::None)),
            None,
            None,
        );
        assert_eq!(column.label(), "DateTime");
        assert_eq!(column.format(), FMT_DATE_TIME);
    }

    #[test]
    fn test_create_keeps_explicit_label_and_format() {
        let column: SpecTableColumn<()> = SpecTableColumn::create(
            ColumnId(0),
            EnumValueKind::Duration,
            Box::new(|_| Ok(EnumCellValue::None)),
            Some("Elapsed"),
            Some("h:mm"),
        );
        assert_eq!(column.label(), "Elapsed");
        assert_eq!(column.format(), "h:mm");
    }

    #[test]
    fn test_create_treats_empty_label_and_format_as_absent() {
        let column: SpecTableColumn<()> = SpecTableColumn::create(
            ColumnId(0),
            EnumValueKind::Duration,
            Box::new(|_| Ok(EnumCellValue::None)),
            Some(""),
            Some(""),
        );
        assert_eq!(column.label(), "Duration");
        assert_eq!(column.format(), FMT_DURATION);
    }

    #[test]
    fn test_cell_outcome_from_getter_result() {
        assert_eq!(
            EnumCellOutcome::from(Ok(EnumCellValue::Integer(3))),
            EnumCellOutcome::Value(EnumCellValue::Integer(3))
        );
        assert_eq!(
            EnumCellOutcome::from(Err(ErrorColumnValue::extraction("score", "sensor offline"))),
            EnumCellOutcome::ExtractionFailed {
                property: "score".to_string(),
                message: "sensor offline".to_string(),
            }
        );
        assert_eq!(
            EnumCellOutcome::from(Err(ErrorColumnValue::Invocation("boxed panic".to_string()))),
            EnumCellOutcome::InvocationFailed("boxed panic".to_string())
        );
        assert_eq!(
            EnumCellOutcome::from(Err(ErrorColumnValue::Unexpected("io broke".to_string()))),
            EnumCellOutcome::Unexpected("io broke".to_string())
        );
    }

    #[test]
    fn test_extraction_error_display_names_the_property() {
        let err = ErrorColumnValue::extraction("started_at", "clock not set");
        assert_eq!(err.to_string(), "clock not set\nProperty: started_at");
    }
}
