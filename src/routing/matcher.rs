//! Route matching
//!
//! Maps a request path to one of the server's endpoints. Exact paths are checked
//! before the content prefix.

const INDEX_PATH: &str = "/";
const FILE_LIST_PATH: &str = "/api/files";
const FILE_CONTENT_PREFIX: &str = "/api/file/";

/// Endpoint selected for a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// Landing page
    Index,
    /// JSON listing of script files
    FileList,
    /// Raw content of one script; carries the still percent-encoded tail
    FileContent(&'a str),
}

impl Endpoint<'_> {
    /// API endpoints answer with a permissive CORS header
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::FileList | Self::FileContent(_))
    }
}

/// Match a request target (path plus any query string) to an endpoint
pub fn match_endpoint(path: &str) -> Option<Endpoint<'_>> {
    match path {
        INDEX_PATH => Some(Endpoint::Index),
        FILE_LIST_PATH => Some(Endpoint::FileList),
        _ => path
            .strip_prefix(FILE_CONTENT_PREFIX)
            .map(Endpoint::FileContent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_exact() {
        assert_eq!(match_endpoint("/"), Some(Endpoint::Index));
        assert_eq!(match_endpoint("/api/files"), Some(Endpoint::FileList));
        assert_eq!(match_endpoint("/api/files/"), None);
        assert_eq!(match_endpoint("/index.html"), None);
    }

    #[test]
    fn test_match_content_prefix() {
        assert_eq!(
            match_endpoint("/api/file/deploy.sh"),
            Some(Endpoint::FileContent("deploy.sh"))
        );
        assert_eq!(
            match_endpoint("/api/file/..%2Fsecret.sh"),
            Some(Endpoint::FileContent("..%2Fsecret.sh"))
        );
        assert_eq!(match_endpoint("/api/file/"), Some(Endpoint::FileContent("")));
        assert_eq!(match_endpoint("/api/file"), None);
    }

    #[test]
    fn test_query_string_breaks_exact_match() {
        assert_eq!(match_endpoint("/?v=2"), None);
        assert_eq!(match_endpoint("/api/files?x=1"), None);
        assert_eq!(
            match_endpoint("/api/file/run.sh?download=1"),
            Some(Endpoint::FileContent("run.sh?download=1"))
        );
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(match_endpoint("/api/unknown"), None);
        assert_eq!(match_endpoint("/favicon.ico"), None);
        assert_eq!(match_endpoint(""), None);
    }

    #[test]
    fn test_is_api() {
        assert!(!Endpoint::Index.is_api());
        assert!(Endpoint::FileList.is_api());
        assert!(Endpoint::FileContent("a.sh").is_api());
    }
}
