use std::fmt;

const DETAIL_PREFIX: &str = "#/d/";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    List,
    Detail(String),
}

impl Route {
    /// Parses a fragment route. `#/d/<id>` with a non-empty id selects the
    /// detail view, anything else is the list.
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.trim();
        let Some(encoded) = fragment.strip_prefix(DETAIL_PREFIX) else {
            return Route::List;
        };
        let id = urlencoding::decode(encoded)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| encoded.to_string());
        if id.trim().is_empty() {
            Route::List
        } else {
            Route::Detail(id)
        }
    }

    pub fn to_fragment(&self) -> String {
        match self {
            Route::List => "#/".to_string(),
            Route::Detail(id) => detail_href(id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fragment())
    }
}

pub fn detail_href(id: &str) -> String {
    format!("{}{}", DETAIL_PREFIX, urlencoding::encode(id))
}

/// Identifies one navigation. Work started under an older token is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct RouteToken(pub u64);

impl RouteToken {
    pub fn next(self) -> Self {
        RouteToken(self.0.wrapping_add(1))
    }
}
