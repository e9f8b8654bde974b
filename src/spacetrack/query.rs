/// Ordered `key/value` pairs of a catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters(Vec<(String, String)>);

impl QueryParameters {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `k1/v1/k2/v2/...`
    pub fn to_path(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}/{}", k, v))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Latest element set per object over eclipse day
impl Default for QueryParameters {
    fn default() -> Self {
        let mut params = Self::new();
        params.push("class", "gp_history");
        params.push("EPOCH", "2024-04-08--2024-04-09");
        params.push("orderBy", "norad_cat_id,EPOCH");
        params.push("distinct", "NORAD_CAT_ID");
        params
    }
}

pub fn query_url(base_url: &str, params: &QueryParameters) -> String {
    format!(
        "{}/basicspacedata/query/{}/format/json",
        base_url.trim_end_matches('/'),
        params.to_path()
    )
}

pub fn login_url(base_url: &str) -> String {
    format!("{}/ajaxauth/login", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_parameter_order() {
        let mut params = QueryParameters::new();
        params.push("class", "gp");
        params.push("NORAD_CAT_ID", "25544");
        params.push("orderBy", "EPOCH desc");
        assert_eq!(params.to_path(), "class/gp/NORAD_CAT_ID/25544/orderBy/EPOCH desc");
    }

    #[test]
    fn query_url_requests_json() {
        let url = query_url("https://www.space-track.org/", &QueryParameters::default());
        assert_eq!(
            url,
            "https://www.space-track.org/basicspacedata/query/class/gp_history/\
             EPOCH/2024-04-08--2024-04-09/orderBy/norad_cat_id,EPOCH/distinct/NORAD_CAT_ID/format/json"
        );
    }

    #[test]
    fn login_url_from_base() {
        assert_eq!(
            login_url("https://www.space-track.org"),
            "https://www.space-track.org/ajaxauth/login"
        );
    }

    #[test]
    fn empty_parameters() {
        assert!(QueryParameters::new().is_empty());
        assert_eq!(QueryParameters::new().to_path(), "");
    }
}
