//! docstr-syntax: docstring normalization and field grammar.
//!
//! Shared by the `docstr` parser. Turns a raw docstring of any supported
//! style into a [`Document`] of reST blocks, and provides the recognizers
//! for field names and type bodies.

pub mod dialect;
pub mod document;
pub mod error;
pub mod field;
pub mod prepare;
mod scan;
pub mod style;

pub use document::{Block, Document};
pub use error::{Result, SyntaxError};
pub use field::{classify, tokenize_type, FieldKind, TypeBody, TypeToken};
pub use style::Style;

/// Prepare, translate and parse a raw docstring.
pub fn normalize(raw: &str, style: Style) -> Result<Document> {
    let lines = prepare::prepare(raw);
    let rst = dialect::to_rst(style, &lines);
    Document::parse(&rst)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMPY: &str = "Join two strings.

        Parameters
        ----------
        foo : 'foo' | 'bar' = 'foo'
            The first.
        bar : str
            The second.

        Returns
        -------
        str
            The joined string.

        Notes
        -----
        Nothing special.
        ";

    #[test]
    fn numpy_docstring_to_blocks() {
        let doc = normalize(NUMPY, Style::Numpy).unwrap();
        assert_eq!(doc.description().as_deref(), Some("Join two strings."));
        assert_eq!(
            doc.blocks[1],
            Block::Field {
                name: "param foo".into(),
                body: "The first.".into(),
            }
        );
        assert_eq!(
            doc.blocks[2],
            Block::Field {
                name: "type foo".into(),
                body: "'foo' | 'bar' = 'foo'".into(),
            }
        );
        assert!(matches!(
            doc.blocks.last(),
            Some(Block::Section { title, .. }) if title == "Notes"
        ));
    }

    #[test]
    fn google_matches_numpy_fields() {
        let google = "Join two strings.

            Args:
                foo ('foo' | 'bar' = 'foo'): The first.
                bar (str): The second.

            Returns:
                str: The joined string.

            Notes:
                Nothing special.
            ";
        let fields = |doc: Document| -> Vec<Block> {
            doc.blocks.into_iter().filter(Block::is_structured).collect()
        };
        assert_eq!(
            fields(normalize(google, Style::Google).unwrap()),
            fields(normalize(NUMPY, Style::Numpy).unwrap())
        );
    }
}
