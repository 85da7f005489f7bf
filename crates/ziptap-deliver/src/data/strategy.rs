use std::fmt;

/// The three ways archive bytes reach a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Materialize into a temporary file, then stream the file.
    TmpFile,
    /// Produce on a background job into a bounded pipe.
    Piped,
    /// Produce directly into the response sink.
    Streaming,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [Self::TmpFile, Self::Piped, Self::Streaming];

    /// Path segment under `/download/`.
    pub fn route(self) -> &'static str {
        match self {
            Self::TmpFile => "tmp-file",
            Self::Piped => "piped",
            Self::Streaming => "streaming",
        }
    }

    /// Attachment name offered to the client.
    pub fn file_name(self) -> String {
        format!("compressed-{}.zip", self.route())
    }

    /// Human label used in timing logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::TmpFile => "Using a temporary file",
            Self::Piped => "Piping",
            Self::Streaming => "Streaming",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}
