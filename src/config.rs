//! Configuration handling for csvnest

/// How byte arrays are written inside a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteArrayFormat {
    /// Standard padded Base64
    #[default]
    Base64,
    /// Unsigned byte values joined by `;`, e.g. `10;255`
    SemicolonDelimited,
}

impl std::str::FromStr for ByteArrayFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base64" => Ok(ByteArrayFormat::Base64),
            "semicolon" | "semicolon-delimited" => Ok(ByteArrayFormat::SemicolonDelimited),
            _ => Err(format!("Unknown byte array format: {}", s)),
        }
    }
}

/// Configuration shared by the encoder and the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Literal written for (and recognised as) the null value
    pub null_marker: String,
    /// Encoding used for byte arrays
    pub byte_array_format: ByteArrayFormat,
    /// CSV quote character
    pub quote: u8,
    /// Trim leading/trailing whitespace from cells before conversion
    pub trim_strings: bool,
    /// Skip header columns that name no bean property instead of failing
    pub ignore_unknown_properties: bool,
    /// Return a bare map instead of a one-element sequence when a dynamic
    /// decode finds exactly one data row
    pub collapse_single_row: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            null_marker: "null".to_string(),
            byte_array_format: ByteArrayFormat::default(),
            quote: b'"',
            trim_strings: false,
            ignore_unknown_properties: false,
            collapse_single_row: true,
        }
    }
}

impl CodecConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the null marker literal
    pub fn with_null_marker(mut self, marker: impl Into<String>) -> Self {
        self.null_marker = marker.into();
        self
    }

    /// Set byte array encoding
    pub fn with_byte_array_format(mut self, format: ByteArrayFormat) -> Self {
        self.byte_array_format = format;
        self
    }

    /// Set the CSV quote character
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Enable trimming of cell text before conversion
    pub fn with_trim_strings(mut self, trim: bool) -> Self {
        self.trim_strings = trim;
        self
    }

    /// Ignore header columns that are not bean properties
    pub fn with_ignore_unknown_properties(mut self, ignore: bool) -> Self {
        self.ignore_unknown_properties = ignore;
        self
    }

    /// Control single-row collapsing for dynamic decodes
    pub fn with_collapse_single_row(mut self, collapse: bool) -> Self {
        self.collapse_single_row = collapse;
        self
    }
}
