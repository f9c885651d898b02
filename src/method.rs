//! HTTP method as a typed enum.
//!
//! Only the methods the client helpers send. Anything exotic goes through
//! [`http::Method`] directly.

use std::fmt;

/// A method the [`Client`](crate::Client) helpers send.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Delete,
    Get,
    Patch,
    Post,
    Put,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get    => "GET",
            Self::Patch  => "PATCH",
            Self::Post   => "POST",
            Self::Put    => "PUT",
        }
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Delete => http::Method::DELETE,
            Method::Get    => http::Method::GET,
            Method::Patch  => http::Method::PATCH,
            Method::Post   => http::Method::POST,
            Method::Put    => http::Method::PUT,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_matches_http_method() {
        for m in [Method::Delete, Method::Get, Method::Patch, Method::Post, Method::Put] {
            assert_eq!(http::Method::from(m).as_str(), m.as_str());
            assert_eq!(m.to_string(), m.as_str());
        }
    }
}
