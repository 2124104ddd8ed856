//! Table-sheet constants and format pattern presets.

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Author name attached to diagnostic cell notes.
pub const C_NOTE_AUTHOR: &str = "tablekit";

/// The standard Text format in Excel.
pub const FMT_TEXT: &str = "@";
/// The standard Percent format in Excel.
pub const FMT_PERCENT: &str = "0.00%";
/// The standard (US) Long Date format in Excel.
pub const FMT_DATE_TIME: &str = "m/d/yyyy h:mm:ss.ms";
/// The standard Time format in Excel.
pub const FMT_TIME: &str = "h:mm:ss.ms";
/// The standard (US) Short Date format in Excel.
pub const FMT_DATE: &str = "m/d/yyyy";
/// A custom format for representing elapsed-duration values.
pub const FMT_DURATION: &str = "[hh]:mm:ss.ms";
/// The standard Number format in Excel.
pub const FMT_NUMBER: &str = "0";
/// The standard Number variant format that displays two decimal places.
pub const FMT_NUMBER_TWO_DECIMAL_PLACES: &str = "0.00";
