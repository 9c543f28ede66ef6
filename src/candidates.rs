//! Candidate list loading
//!
//! The list is plain text, one resolver per line. Everything from a `#` to the
//! end of the line is a comment; surrounding whitespace is ignored and lines
//! left empty are skipped. Order and duplicates are preserved.

use crate::{
    error::{ErrorContext, Result},
    models::Candidate,
};
use std::path::Path;

/// Parse candidates from the text of a list
pub fn parse_candidates(text: &str) -> Vec<Candidate> {
    text.lines()
        .filter_map(|line| {
            let address = line.split('#').next().unwrap_or_default().trim();
            if address.is_empty() {
                None
            } else {
                Some(Candidate::new(address))
            }
        })
        .collect()
}

/// Read and parse a candidate list file
pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidate list {}", path.display()))?;
    Ok(parse_candidates(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn addresses(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.address()).collect()
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let text = "\
# public resolvers
8.8.8.8   # Google
  1.1.1.1

#9.9.9.9
208.67.222.222#OpenDNS
   # indented comment
";
        let candidates = parse_candidates(text);
        assert_eq!(addresses(&candidates), vec!["8.8.8.8", "1.1.1.1", "208.67.222.222"]);
    }

    #[test]
    fn test_duplicates_and_order_are_preserved() {
        let candidates = parse_candidates("9.9.9.9\n1.1.1.1\n9.9.9.9\n");
        assert_eq!(addresses(&candidates), vec!["9.9.9.9", "1.1.1.1", "9.9.9.9"]);
    }

    #[test]
    fn test_windows_line_endings() {
        let candidates = parse_candidates("8.8.8.8\r\n1.1.1.1 # cf\r\n");
        assert_eq!(addresses(&candidates), vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn test_empty_text_gives_no_candidates() {
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates("# only comments\n\n   \n").is_empty());
    }

    #[test]
    fn test_load_candidates_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "8.8.8.8 # primary").unwrap();
        writeln!(file, "[2606:4700:4700::1111]:53").unwrap();

        let candidates = load_candidates(file.path()).unwrap();
        assert_eq!(addresses(&candidates), vec!["8.8.8.8", "[2606:4700:4700::1111]:53"]);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let error = load_candidates(Path::new("/nonexistent/resolvers.txt")).unwrap_err();
        assert_eq!(error.category(), "IO");
        assert!(error.to_string().contains("/nonexistent/resolvers.txt"));
    }
}
