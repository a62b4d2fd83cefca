use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading the text formats that populate the engine at startup.
///
/// Implementors handle format-specific parsing; the path-based entry point is shared.
pub trait InputFile {
    /// The parsed record produced by the format.
    type Output;

    /// The error type for parsing and I/O failures.
    type Error: Error + From<io::Error>;

    /// Parses a record from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader reports an I/O failure.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, Self::Error>;

    /// Parses a record from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Output, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
