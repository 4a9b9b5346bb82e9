/// The classified kind of a SPARQL operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Select,
    Construct,
    Describe,
    Ask,
    Update,
    Unknown,
}

/// Whether a read operation produces tabular bindings or RDF triples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultShape {
    Tabular,
    Graph,
}

impl OperationKind {
    pub fn result_shape(self) -> ResultShape {
        match self {
            OperationKind::Construct | OperationKind::Describe => ResultShape::Graph,
            _ => ResultShape::Tabular,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Select => "SELECT",
            OperationKind::Construct => "CONSTRUCT",
            OperationKind::Describe => "DESCRIBE",
            OperationKind::Ask => "ASK",
            OperationKind::Update => "UPDATE",
            OperationKind::Unknown => "UNKNOWN",
        }
    }
}

/// Determines the kind of a SPARQL operation with a linear keyword scan.
///
/// Line comments are dropped, `<...>` spans are skipped, and `PREFIX`/`BASE`
/// may legally precede the operative keyword. This is not a parser; it only
/// has to find the first operative keyword token.
pub fn classify(text: &str) -> OperationKind {
    let mut word = String::new();
    let mut in_comment = false;
    let mut in_iri = false;
    for c in text.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            continue;
        }
        if in_iri {
            if c == '>' {
                in_iri = false;
            }
            continue;
        }
        match c {
            '#' => {
                in_comment = true;
                if let Some(kind) = take_keyword(&mut word) {
                    return kind;
                }
            }
            '<' => {
                in_iri = true;
                if let Some(kind) = take_keyword(&mut word) {
                    return kind;
                }
            }
            c if c.is_ascii_alphanumeric() || c == '_' => word.push(c),
            _ => {
                if let Some(kind) = take_keyword(&mut word) {
                    return kind;
                }
            }
        }
    }
    take_keyword(&mut word).unwrap_or(OperationKind::Unknown)
}

fn take_keyword(word: &mut String) -> Option<OperationKind> {
    let kind = keyword(word);
    word.clear();
    kind
}

fn keyword(word: &str) -> Option<OperationKind> {
    if word.is_empty() {
        return None;
    }
    Some(match word.to_ascii_uppercase().as_str() {
        "SELECT" => OperationKind::Select,
        "CONSTRUCT" => OperationKind::Construct,
        "DESCRIBE" => OperationKind::Describe,
        "ASK" => OperationKind::Ask,
        "INSERT" | "DELETE" | "WITH" | "LOAD" | "CLEAR" | "CREATE" | "DROP" | "COPY" | "MOVE"
        | "ADD" => OperationKind::Update,
        // PREFIX, BASE and every other token are skipped.
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_read_operations() {
        assert_eq!(classify("SELECT * WHERE { ?s ?p ?o }"), OperationKind::Select);
        assert_eq!(
            classify("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }"),
            OperationKind::Construct
        );
        assert_eq!(classify("DESCRIBE <http://ex.org/x>"), OperationKind::Describe);
        assert_eq!(classify("ASK { ?s ?p ?o }"), OperationKind::Ask);
    }

    #[test]
    fn update_keywords_collapse_to_update() {
        for text in [
            "INSERT DATA { <http://x/s> <http://x/p> <http://x/o> }",
            "DELETE WHERE { ?s ?p ?o }",
            "WITH <http://x/g> DELETE { ?s ?p ?o } WHERE { ?s ?p ?o }",
            "LOAD <http://x/data.ttl>",
            "CLEAR GRAPH <http://x/g>",
            "CREATE GRAPH <http://x/g>",
            "DROP GRAPH <http://x/g>",
            "COPY <http://x/a> TO <http://x/b>",
            "MOVE <http://x/a> TO <http://x/b>",
            "ADD <http://x/a> TO <http://x/b>",
        ] {
            assert_eq!(classify(text), OperationKind::Update, "{text}");
        }
    }

    #[test]
    fn prefix_and_base_are_skipped() {
        assert_eq!(
            classify("PREFIX ex: <http://x/> SELECT * WHERE {?s ?p ?o}"),
            OperationKind::Select
        );
        assert_eq!(
            classify("BASE <http://x/>\nPREFIX ex: <http://x/>\nASK { ?s ex:p ?o }"),
            OperationKind::Ask
        );
    }

    #[test]
    fn classification_is_comment_insensitive() {
        let query = "SELECT * WHERE { ?s ?p ?o }";
        let commented = format!("# a comment\n# SELECT is mentioned here too\n{query}");
        assert_eq!(classify(&commented), classify(query));

        assert_eq!(
            classify("# leading comment\nINSERT DATA { <http://x/s> <http://x/p> <http://x/o> }"),
            OperationKind::Update
        );
    }

    #[test]
    fn keywords_inside_iris_are_ignored() {
        assert_eq!(
            classify("PREFIX ex: <http://select.example/drop#> ASK { ?s ex:p ?o }"),
            OperationKind::Ask
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("select * where { ?s ?p ?o }"), OperationKind::Select);
        assert_eq!(classify("insert data { <a://b> <a://c> <a://d> }"), OperationKind::Update);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(classify("SELECTION of things"), OperationKind::Unknown);
        assert_eq!(classify("ASKED { }"), OperationKind::Unknown);
    }

    #[test]
    fn no_keyword_yields_unknown() {
        assert_eq!(classify(""), OperationKind::Unknown);
        assert_eq!(classify("# only a comment"), OperationKind::Unknown);
        assert_eq!(classify("PREFIX ex: <http://x/>"), OperationKind::Unknown);
    }
}
