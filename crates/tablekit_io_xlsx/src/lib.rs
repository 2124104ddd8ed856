//! `tablekit_io_xlsx`:
//! Typed table-sheet writer kernel over `rust_xlsxwriter`.
//!
//! Maps a collection of elements of a generic type onto a formatted,
//! structured table inside a workbook:
//! - `conf`   : constants and format pattern presets
//! - `spec`   : specs/models/options/errors
//! - `util`   : pure helper functions
//! - `writer` : table-sheet writer kernel
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_NOTE_AUTHOR, FMT_DATE, FMT_DATE_TIME, FMT_DURATION, FMT_NUMBER,
    FMT_NUMBER_TWO_DECIMAL_PLACES, FMT_PERCENT, FMT_TEXT, FMT_TIME, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use spec::{
    ColumnId, EnumCellOutcome, EnumCellValue, EnumValueKind, ErrorColumnValue, ErrorTableSheet,
    FnColumnGetter, SpecAutofitColumnsPolicy, SpecCellAnnotation, SpecTableColumn,
    SpecTableSheetBuildOptions, SpecTableSheetReport,
};
pub use util::{
    convert_duration_to_serial, derive_table_name, derive_unique_label, estimate_cell_width,
    plan_cell_render, sanitize_sheet_name,
};
pub use writer::TableSheet;
