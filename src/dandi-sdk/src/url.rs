//! Parsing of archive URLs into structured references.
//!
//! Recognized shapes:
//! - `DANDI:000001` or `DANDI:000001/0.210831.2033`
//! - web: `https://<host>/dandiset/<id>[/<version>][/files?path=<p>]`
//! - API: `https://<host>/api/dandisets/<id>[/versions/<v>][/assets/?path=<p>]`
//!
//! A `path` (or `location`) query value with a trailing slash denotes a
//! folder; a value containing `*` denotes a glob; anything else an exact
//! asset path.

use ::url::Url;

use crate::error::DandiError;

/// How an asset-scoped URL selects assets within a Dandiset version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetScope {
    /// Exactly one asset at this path
    Path(String),
    /// Every asset under this path prefix
    Folder(String),
    /// Every asset whose path matches this glob pattern
    Glob(String),
}

/// A user-supplied URL resolved into a structured archive reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedDandiUrl {
    Dandiset {
        api_url: String,
        dandiset_id: String,
        version_id: Option<String>,
    },
    Assets {
        api_url: String,
        dandiset_id: String,
        version_id: Option<String>,
        scope: AssetScope,
    },
}

impl ParsedDandiUrl {
    pub fn api_url(&self) -> &str {
        match self {
            ParsedDandiUrl::Dandiset { api_url, .. } => api_url,
            ParsedDandiUrl::Assets { api_url, .. } => api_url,
        }
    }

    pub fn dandiset_id(&self) -> &str {
        match self {
            ParsedDandiUrl::Dandiset { dandiset_id, .. } => dandiset_id,
            ParsedDandiUrl::Assets { dandiset_id, .. } => dandiset_id,
        }
    }
}

const MAIN_API_URL: &str = "https://api.dandiarchive.org/api";

/// API endpoint for a web-frontend host. Known public deployments map to
/// their real API; anything else falls back to `https://<host>/api`.
fn api_url_for_host(host: &str) -> String {
    match host {
        "dandiarchive.org" | "www.dandiarchive.org" => MAIN_API_URL.to_string(),
        "gui-staging.dandiarchive.org" => "https://api-staging.dandiarchive.org/api".to_string(),
        _ => format!("https://{host}/api"),
    }
}

fn scope_from(value: &str) -> AssetScope {
    if value.contains('*') {
        AssetScope::Glob(value.to_string())
    } else if value.ends_with('/') {
        AssetScope::Folder(value.to_string())
    } else {
        AssetScope::Path(value.to_string())
    }
}

fn asset_path_query(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == "path" || k == "location")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

fn looks_like_dandiset_id(s: &str) -> bool {
    s.len() >= 6 && s.chars().all(|c| c.is_ascii_digit())
}

/// Parse a user-supplied string into a structured archive reference.
pub fn parse_dandi_url(input: &str) -> Result<ParsedDandiUrl, DandiError> {
    let unsupported = || DandiError::UnsupportedUrl(input.to_string());

    // DANDI:<id>[/<version>]
    if let Some(rest) = input
        .strip_prefix("DANDI:")
        .or_else(|| input.strip_prefix("dandi:"))
    {
        let (id, version) = match rest.split_once('/') {
            Some((id, v)) if !v.is_empty() => (id, Some(v.to_string())),
            Some((id, _)) => (id, None),
            None => (rest, None),
        };
        if !looks_like_dandiset_id(id) {
            return Err(unsupported());
        }
        return Ok(ParsedDandiUrl::Dandiset {
            api_url: MAIN_API_URL.to_string(),
            dandiset_id: id.to_string(),
            version_id: version,
        });
    }

    let url = Url::parse(input).map_err(|_| unsupported())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(unsupported());
    }
    let host = url.host_str().ok_or_else(unsupported)?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        // https://<host>/dandiset/<id>[/<version>][/files]
        ["dandiset", id, rest @ ..] if looks_like_dandiset_id(id) => {
            let api_url = api_url_for_host(host);
            let (version_id, at_files) = match rest {
                [] => (None, false),
                ["files"] => (None, true),
                [v] => (Some(v.to_string()), false),
                [v, "files"] => (Some(v.to_string()), true),
                _ => return Err(unsupported()),
            };
            match asset_path_query(&url) {
                Some(p) if at_files => Ok(ParsedDandiUrl::Assets {
                    api_url,
                    dandiset_id: id.to_string(),
                    version_id,
                    scope: scope_from(&p),
                }),
                None => Ok(ParsedDandiUrl::Dandiset {
                    api_url,
                    dandiset_id: id.to_string(),
                    version_id,
                }),
                Some(_) => Err(unsupported()),
            }
        }
        // https://<host>/api/dandisets/<id>[/versions/<v>][/assets]
        ["api", "dandisets", id, rest @ ..] if looks_like_dandiset_id(id) => {
            let api_url = format!("https://{host}/api");
            let (version_id, at_assets) = match rest {
                [] => (None, false),
                ["versions", v] => (Some(v.to_string()), false),
                ["versions", v, "assets"] => (Some(v.to_string()), true),
                ["assets"] => (None, true),
                _ => return Err(unsupported()),
            };
            match asset_path_query(&url) {
                Some(p) if at_assets => Ok(ParsedDandiUrl::Assets {
                    api_url,
                    dandiset_id: id.to_string(),
                    version_id,
                    scope: scope_from(&p),
                }),
                None => Ok(ParsedDandiUrl::Dandiset {
                    api_url,
                    dandiset_id: id.to_string(),
                    version_id,
                }),
                Some(_) => Err(unsupported()),
            }
        }
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dandi_scheme_parses() {
        let parsed = parse_dandi_url("DANDI:000027").unwrap();
        assert_eq!(
            parsed,
            ParsedDandiUrl::Dandiset {
                api_url: MAIN_API_URL.to_string(),
                dandiset_id: "000027".to_string(),
                version_id: None,
            }
        );
    }

    #[test]
    fn dandi_scheme_with_version() {
        let parsed = parse_dandi_url("DANDI:000027/0.210831.2033").unwrap();
        match parsed {
            ParsedDandiUrl::Dandiset { version_id, .. } => {
                assert_eq!(version_id.as_deref(), Some("0.210831.2033"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn web_dandiset_url() {
        let parsed = parse_dandi_url("https://dandiarchive.org/dandiset/000001/draft").unwrap();
        assert_eq!(
            parsed,
            ParsedDandiUrl::Dandiset {
                api_url: MAIN_API_URL.to_string(),
                dandiset_id: "000001".to_string(),
                version_id: Some("draft".to_string()),
            }
        );
    }

    #[test]
    fn files_url_with_exact_path_is_asset_scope() {
        let parsed =
            parse_dandi_url("https://archive/dandiset/000001/draft/files?path=sub-01/func.nwb")
                .unwrap();
        assert_eq!(
            parsed,
            ParsedDandiUrl::Assets {
                api_url: "https://archive/api".to_string(),
                dandiset_id: "000001".to_string(),
                version_id: Some("draft".to_string()),
                scope: AssetScope::Path("sub-01/func.nwb".to_string()),
            }
        );
    }

    #[test]
    fn trailing_slash_means_folder() {
        let parsed =
            parse_dandi_url("https://dandiarchive.org/dandiset/000001/draft/files?path=sub-01/")
                .unwrap();
        match parsed {
            ParsedDandiUrl::Assets { scope, .. } => {
                assert_eq!(scope, AssetScope::Folder("sub-01/".to_string()));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn star_means_glob() {
        let parsed =
            parse_dandi_url("https://dandiarchive.org/dandiset/000001/files?path=sub-*/*.nwb")
                .unwrap();
        match parsed {
            ParsedDandiUrl::Assets { scope, version_id, .. } => {
                assert_eq!(scope, AssetScope::Glob("sub-*/*.nwb".to_string()));
                assert_eq!(version_id, None);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn api_url_shapes() {
        let parsed =
            parse_dandi_url("https://api.dandiarchive.org/api/dandisets/000023").unwrap();
        assert_eq!(
            parsed,
            ParsedDandiUrl::Dandiset {
                api_url: "https://api.dandiarchive.org/api".to_string(),
                dandiset_id: "000023".to_string(),
                version_id: None,
            }
        );

        let parsed = parse_dandi_url(
            "https://api.dandiarchive.org/api/dandisets/000023/versions/draft/assets/?path=raw/",
        )
        .unwrap();
        assert_eq!(
            parsed,
            ParsedDandiUrl::Assets {
                api_url: "https://api.dandiarchive.org/api".to_string(),
                dandiset_id: "000023".to_string(),
                version_id: Some("draft".to_string()),
                scope: AssetScope::Folder("raw/".to_string()),
            }
        );
    }

    #[test]
    fn location_is_an_alias_for_path() {
        let parsed =
            parse_dandi_url("https://dandiarchive.org/dandiset/000001/files?location=a.nwb")
                .unwrap();
        match parsed {
            ParsedDandiUrl::Assets { scope, .. } => {
                assert_eq!(scope, AssetScope::Path("a.nwb".to_string()));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn unrecognized_urls_are_rejected() {
        for bad in [
            "not a url",
            "ftp://dandiarchive.org/dandiset/000001",
            "https://dandiarchive.org/about",
            "DANDI:notanid",
        ] {
            let err = parse_dandi_url(bad).unwrap_err();
            assert!(matches!(err, DandiError::UnsupportedUrl(_)), "{bad}");
        }
    }
}
