use url::Url;

use crate::errors::BookingError;
use crate::summary::Id;

/// Convenience wrapper for URL generation functions.
#[derive(Clone, Debug)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,
}

impl Urls {
    /// Create a new instance. A missing trailing slash is added to `base`.
    pub fn new(base: impl AsRef<str>) -> Self {
        let mut base =
            Url::parse(base.as_ref()).unwrap_or_else(|_| panic!("parse {} as URL", base.as_ref()));

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Urls { base }
    }

    pub fn home(&self) -> Url {
        self.base.clone()
    }

    pub fn venues(&self) -> Result<Url, BookingError> {
        self.join("venues")
    }

    pub fn venue(&self, id: Id) -> Result<Url, BookingError> {
        self.join(&format!("venues/{}", id))
    }

    pub fn artists(&self) -> Result<Url, BookingError> {
        self.join("artists")
    }

    pub fn artist(&self, id: Id) -> Result<Url, BookingError> {
        self.join(&format!("artists/{}", id))
    }

    pub fn shows(&self) -> Result<Url, BookingError> {
        self.join("shows")
    }

    fn join(&self, path: &str) -> Result<Url, BookingError> {
        self.base
            .join(path)
            .map_err(|source| BookingError::UnableToBuildUrl {
                path: path.to_owned(),
                source,
            })
    }
}
