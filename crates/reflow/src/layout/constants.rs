//! Threshold constants for layout reconstruction.
//!
//! Every tuned knob of the pipeline lives here so tests and sibling modules
//! share one inventory. Raising or lowering a value changes behavior as
//! documented on each constant.

/// Y-bucket granularity for line assembly. Larger widens line grouping;
/// smaller fragments lines.
pub const LINE_Y_BUCKET_SIZE: f32 = 2.0;

/// Fragments whose y exceeds `page_height ×` this factor are extraction
/// noise and are dropped before bucketing.
pub const NOISE_Y_FACTOR: f32 = 2.5;

/// Average glyph aspect ratio used to estimate a run's advance width from
/// its character count when the backend reports no width.
pub const CHAR_WIDTH_FACTOR: f32 = 0.52;

/// Relative-y band at each page edge considered header/footer territory.
pub const PAGE_EDGE_MARGIN: f32 = 0.08;

/// Wider edge band used for the running-label-pattern coverage test and
/// alternating-parity headers.
pub const PAGE_BROAD_EDGE_MARGIN: f32 = 0.2;

/// A repeated edge text must appear on at least this many pages to be a
/// running label.
pub const MIN_REPEATED_EDGE_TEXT_PAGES: usize = 4;

/// ...and cover at least this fraction of the document's pages.
pub const MIN_REPEATED_EDGE_TEXT_PAGE_COVERAGE: f32 = 0.6;

/// Fraction of a text's occurrences that must sit in the edge band for the
/// occurrence-ratio route to running-label status.
pub const RUNNING_LABEL_EDGE_OCCURRENCE_RATIO: f32 = 0.85;

/// Edge-page coverage required when qualifying via the uppercase
/// running-label pattern instead of the occurrence ratio.
pub const RUNNING_LABEL_PATTERN_EDGE_COVERAGE: f32 = 0.8;

/// Looser page coverage for "Author et al."-style running labels.
pub const AUTHOR_LABEL_PAGE_COVERAGE: f32 = 0.45;

/// Labels longer than this are also stripped as prefixes/suffixes from
/// other lines (shorter labels would shred ordinary prose).
pub const MIN_AFFIX_LABEL_LEN: usize = 12;

/// Upper bound on repeated affix stripping per line.
pub const MAX_AFFIX_STRIP_ITERATIONS: usize = 3;

/// A page-number arithmetic sequence needs at least this many pages...
pub const MIN_PAGE_NUMBER_SEQUENCE_PAGES: usize = 3;

/// ...and at least this fraction of the document's pages.
pub const MIN_PAGE_NUMBER_SEQUENCE_COVERAGE: f32 = 0.5;

/// Title candidates need `font ≥ body + delta` or `font ≥ body × ratio`.
pub const TITLE_FONT_DELTA: f32 = 5.0;
pub const TITLE_FONT_RATIO: f32 = 1.5;

/// Relaxed title thresholds for negative-coordinate first pages.
pub const TITLE_FONT_DELTA_NEGATIVE_Y: f32 = 2.0;
pub const TITLE_FONT_RATIO_NEGATIVE_Y: f32 = 1.2;

/// A first page is a "negative-coordinate page" when more than this
/// fraction of its lines carry negative y.
pub const NEGATIVE_Y_LINE_RATIO: f32 = 0.6;

/// Numbered-heading shape constraints.
pub const HEADING_MIN_LEN: usize = 6;
pub const HEADING_MAX_LEN: usize = 90;
pub const HEADING_MAX_WORDS: usize = 16;
pub const HEADING_MAX_TOP_LEVEL_NUMBER: u32 = 20;
pub const HEADING_MAX_DIGIT_RATIO: f32 = 0.2;

/// Column-gap floor in user-space units; a narrower page qualifies at
/// `COLUMN_MIN_GAP_FRACTION × page_width` instead.
pub const COLUMN_MIN_GAP: f32 = 120.0;
pub const COLUMN_MIN_GAP_FRACTION: f32 = 0.18;

/// Minimum number of gap-exhibiting rows for a two-column verdict (scales
/// up to 12% of rows on dense pages).
pub const COLUMN_MIN_GAP_ROWS: usize = 3;
pub const COLUMN_MIN_GAP_ROW_RATIO: f32 = 0.12;

/// The left column's rightmost extent must stay below this fraction of the
/// page width, and the right column must begin past the other one.
pub const COLUMN_LEFT_MAX_RIGHT: f32 = 0.55;
pub const COLUMN_RIGHT_MIN_LEFT: f32 = 0.33;

/// Both sides of a column split must vertically span at least this
/// fraction of the page's content extent (rejects table-induced gaps).
pub const COLUMN_MIN_VERTICAL_SPAN: f32 = 0.3;

/// Footnote range detection.
pub const FOOTNOTE_START_MAX_VY: f32 = 0.38;
pub const FOOTNOTE_BLOCK_MAX_VY: f32 = 0.42;
pub const FOOTNOTE_SYMBOL_FONT_RATIO: f32 = 0.82;
pub const FOOTNOTE_NUMERIC_FONT_RATIO: f32 = 0.65;
pub const FOOTNOTE_TEXT_FONT_RATIO: f32 = 0.98;
pub const FOOTNOTE_MIN_TEXT_LEN: usize = 8;
pub const FOOTNOTE_MAX_GAP: f32 = 20.0;

/// Unmarked (prose-start) footnote detection.
pub const UNMARKED_FOOTNOTE_MAX_VY: f32 = 0.2;
pub const UNMARKED_FOOTNOTE_FONT_RATIO: f32 = 0.93;
pub const UNMARKED_FOOTNOTE_MIN_WORDS: usize = 8;
pub const UNMARKED_FOOTNOTE_MIN_LOWERCASE_WORDS: usize = 4;
pub const UNMARKED_FOOTNOTE_MIN_LEAD_GAP: f32 = 12.0;

/// Wrapped-footnote continuation merging.
pub const FOOTNOTE_WRAP_X_DRIFT: f32 = 0.08;
pub const FOOTNOTE_WRAP_FONT_DELTA: f32 = 0.8;

/// Paragraph merging gates.
pub const PARAGRAPH_FULL_WIDTH_SLACK: f32 = 0.15;
pub const PARAGRAPH_FONT_DELTA: f32 = 0.8;
pub const PARAGRAPH_X_DRIFT: f32 = 0.08;

/// Superscript footnote-marker detection inside body lines.
pub const SUPERSCRIPT_FONT_RATIO: f32 = 0.84;
pub const SUPERSCRIPT_MAX_WIDTH_FACTOR: f32 = 0.95;
pub const SUPERSCRIPT_NEIGHBOR_DISTANCE_EM: f32 = 8.0;

/// Dense inline figure labels are only scrubbed when a page carries at
/// least this many of them.
pub const MIN_DENSE_FIGURE_LABELS: usize = 20;
pub const FIGURE_LABEL_FONT_RATIO: f32 = 0.72;

/// Small-font threshold for first-page affiliation index lines.
pub const AFFILIATION_INDEX_FONT_RATIO: f32 = 0.82;

/// References-list auto-detection: at least this many `[N]` starts within
/// the window, no earlier than this fraction of the document.
pub const REFERENCES_MIN_MARKERS: usize = 3;
pub const REFERENCES_WINDOW_LINES: usize = 40;
pub const REFERENCES_MIN_DOC_FRACTION: f32 = 0.35;

/// A candidate table ends at a vertical gap larger than this many body-font
/// heights below the previous row.
pub const TABLE_MAX_ROW_GAP_FONTS: f32 = 2.5;

/// X-center clustering tolerance for table column inference, in multiples
/// of the row font size.
pub const TABLE_COLUMN_TOLERANCE_FONTS: f32 = 2.0;
