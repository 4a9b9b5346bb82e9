use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use headers::HeaderMapExt;
use headers_accept::Accept;
use mediatype::names::{APPLICATION, CSV, JSON, N_QUADS, N_TRIPLES, TEXT, TURTLE, XML};
use mediatype::{MediaType, Name};
use std::convert::Infallible;

/// Serialization of SELECT and ASK results, negotiated from the Accept
/// header. JSON is preferred and is also the fallback when the header is
/// missing or matches nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultsFormat {
    Json,
    Xml,
    Csv,
    Tsv,
}

/// Serialization of CONSTRUCT and DESCRIBE results. Turtle is preferred and
/// is also the fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphFormat {
    Turtle,
    JsonLd,
    RdfXml,
    NTriples,
    NQuads,
}

static RESULTS_MEDIA_TYPES: [MediaType<'_>; 6] = [
    MediaType::new(APPLICATION, Name::new_unchecked("sparql-results+json")),
    MediaType::new(APPLICATION, JSON),
    MediaType::new(APPLICATION, Name::new_unchecked("sparql-results+xml")),
    MediaType::new(APPLICATION, XML),
    MediaType::new(TEXT, CSV),
    MediaType::new(TEXT, Name::new_unchecked("tab-separated-values")),
];

static GRAPH_MEDIA_TYPES: [MediaType<'_>; 5] = [
    MediaType::new(TEXT, TURTLE),
    MediaType::new(APPLICATION, Name::new_unchecked("ld+json")),
    MediaType::new(APPLICATION, Name::new_unchecked("rdf+xml")),
    MediaType::new(APPLICATION, N_TRIPLES),
    MediaType::new(APPLICATION, N_QUADS),
];

impl ResultsFormat {
    pub const fn media_type(self) -> &'static str {
        match self {
            ResultsFormat::Json => "application/sparql-results+json",
            ResultsFormat::Xml => "application/sparql-results+xml",
            ResultsFormat::Csv => "text/csv",
            ResultsFormat::Tsv => "text/tab-separated-values",
        }
    }

    fn from_media_type(media_type: &MediaType<'_>) -> Option<Self> {
        match media_type.to_string().as_str() {
            "application/sparql-results+json" | "application/json" => Some(Self::Json),
            "application/sparql-results+xml" | "application/xml" => Some(Self::Xml),
            "text/csv" => Some(Self::Csv),
            "text/tab-separated-values" => Some(Self::Tsv),
            _ => None,
        }
    }
}

impl GraphFormat {
    pub const fn media_type(self) -> &'static str {
        match self {
            GraphFormat::Turtle => "text/turtle",
            GraphFormat::JsonLd => "application/ld+json",
            GraphFormat::RdfXml => "application/rdf+xml",
            GraphFormat::NTriples => "application/n-triples",
            GraphFormat::NQuads => "application/n-quads",
        }
    }

    fn from_media_type(media_type: &MediaType<'_>) -> Option<Self> {
        match media_type.to_string().as_str() {
            "text/turtle" => Some(Self::Turtle),
            "application/ld+json" => Some(Self::JsonLd),
            "application/rdf+xml" => Some(Self::RdfXml),
            "application/n-triples" => Some(Self::NTriples),
            "application/n-quads" => Some(Self::NQuads),
            _ => None,
        }
    }
}

/// Handles the content-negotiation for requests that return query results.
impl<S: Send + Sync> FromRequestParts<S> for ResultsFormat {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts.headers.typed_get::<Accept>();
        Ok(accept
            .and_then(|accept| {
                accept
                    .negotiate(&RESULTS_MEDIA_TYPES)
                    .and_then(Self::from_media_type)
            })
            .unwrap_or(Self::Json))
    }
}

/// Handles the content-negotiation for requests that return RDF data.
impl<S: Send + Sync> FromRequestParts<S> for GraphFormat {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts.headers.typed_get::<Accept>();
        Ok(accept
            .and_then(|accept| {
                accept
                    .negotiate(&GRAPH_MEDIA_TYPES)
                    .and_then(Self::from_media_type)
            })
            .unwrap_or(Self::Turtle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_offered_results_media_type_maps_to_a_format() {
        for media_type in &RESULTS_MEDIA_TYPES {
            assert!(
                ResultsFormat::from_media_type(media_type).is_some(),
                "unmapped media type {media_type}"
            );
        }
    }

    #[test]
    fn every_offered_graph_media_type_maps_to_a_format() {
        for media_type in &GRAPH_MEDIA_TYPES {
            assert!(
                GraphFormat::from_media_type(media_type).is_some(),
                "unmapped media type {media_type}"
            );
        }
    }

    #[test]
    fn preferred_formats_lead_their_lists() {
        assert_eq!(
            ResultsFormat::from_media_type(&RESULTS_MEDIA_TYPES[0]),
            Some(ResultsFormat::Json)
        );
        assert_eq!(
            GraphFormat::from_media_type(&GRAPH_MEDIA_TYPES[0]),
            Some(GraphFormat::Turtle)
        );
    }
}
