//! Request extractors

use serde::Deserialize;

use crate::errors::AppResult;
use crate::models::PlaylistRequest;

/// Raw playlist query parameters
///
/// Everything arrives as an optional string so that parsing (and the
/// resulting 400s) happens in one place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistQuery {
    pub service: Option<String>,
    pub region: Option<String>,
    pub sort: Option<String>,
    pub start_chno: Option<String>,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

impl PlaylistQuery {
    pub fn has_service(&self) -> bool {
        self.service.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    pub fn into_request(self) -> AppResult<PlaylistRequest> {
        PlaylistRequest::from_params(
            self.service.as_deref(),
            self.region.as_deref(),
            self.sort.as_deref(),
            self.start_chno.as_deref(),
            self.include.as_deref(),
            self.exclude.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegionSelector, SortOrder};

    #[test]
    fn test_query_deserialization() {
        let query: PlaylistQuery =
            query_from("service=Roku&region=CA&sort=chno&include=roku-a,roku-b");
        assert!(query.has_service());

        let request = query.into_request().unwrap();
        assert_eq!(request.region, RegionSelector::Code("ca".into()));
        assert_eq!(request.sort, SortOrder::ChannelNumber);
        assert_eq!(request.include.len(), 2);
    }

    #[test]
    fn test_blank_service_is_absent() {
        let query = PlaylistQuery {
            service: Some("  ".into()),
            ..Default::default()
        };
        assert!(!query.has_service());
    }

    fn query_from(raw: &str) -> PlaylistQuery {
        let uri: axum::http::Uri = format!("/?{raw}").parse().unwrap();
        axum::extract::Query::<PlaylistQuery>::try_from_uri(&uri).unwrap().0
    }
}
