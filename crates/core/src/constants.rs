//! Shared constants for the ingestion pipeline.

/// Header cell that marks the header row of a funnel report.
pub const PRODUCT_NAME_HEADER: &str = "название товара";

/// Metadata label fragments matched by substring in the leading rows.
pub const METADATA_DATE_LABEL: &str = "дата формирования";
pub const METADATA_PERIOD_LABEL: &str = "отчетный период";
pub const METADATA_CATEGORY_LABEL: &str = "категория 3 уровня";

/// First-column markers of aggregate summary rows that are skipped.
pub const AGGREGATE_ROW_MARKERS: [&str; 2] = ["среднее значение", "итого"];

/// Cell values that always transform to NULL regardless of instruction.
pub const SENTINEL_VALUES: [&str; 2] = ["-", "нет данных"];

/// Number of leading rows scanned for metadata label/value pairs.
pub const METADATA_SCAN_ROWS: usize = 5;

/// Number of leading rows scanned for the header row.
pub const HEADER_SCAN_ROWS: usize = 10;

/// Two-digit years at or above this value resolve to 19xx, below to 20xx.
///
/// Historical heuristic carried over from the exporting tool; the cutoff
/// has no stated business justification and is kept here so it can be
/// confirmed or adjusted in one place.
pub const TWO_DIGIT_YEAR_CUTOFF: u32 = 50;

/// Bounds of a small-range (16-bit) storage column.
pub const SMALL_FIELD_MIN: i32 = -32768;
pub const SMALL_FIELD_MAX: i32 = 32767;

/// Values within the top 10% of a small-range field's max produce a warning.
pub const SMALL_FIELD_WARN_RATIO: f64 = 0.9;

/// Fixed progress checkpoints reported per file, in percent.
pub const PROGRESS_CHECKPOINTS: [u8; 5] = [0, 30, 60, 90, 100];
