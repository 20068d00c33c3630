//! FILENAME: core/tabulate/src/options.rs
//! PURPOSE: Conversion settings passed down from the embedding program.

/// Which text of a category goes into the output rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryField {
    #[default]
    Label,
    Code,
}

/// How the response is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConvertMode {
    /// Rows are written while the response is still arriving.
    #[default]
    Streamed,
    /// Non-streaming fallback: the whole response is decoded first. Small tables only.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Field delimiter of the delimited text output.
    pub delimiter: u8,
    pub category_field: CategoryField,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            delimiter: b',',
            category_field: CategoryField::Label,
        }
    }
}
