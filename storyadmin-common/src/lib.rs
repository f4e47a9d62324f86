pub mod time;
pub mod utils;

use std::path::PathBuf;

pub use color_eyre::{
    eyre::{bail, eyre as err, Context, Report},
    install,
};
pub use http::Uri;

use crate::time::DateShift;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_DATE_SHIFT_HOURS: i64 = 7;
pub const DEFAULT_TOKEN_FILE: &str = ".storyadmin-token";

#[twelf::config]
pub struct Conf {
    /// Base URL of the admin backend, without the `/beapi` prefix
    pub base_url: String,

    /// File the session token is kept in between runs
    pub token_file: Option<String>,

    /// Rows shown per list page
    pub page_size: Option<usize>,

    /// Hours added to server timestamps while they are being edited
    pub date_shift_hours: Option<i64>,

    /// Admin username used by `login` when none is passed
    pub username: Option<String>,

    /// Admin password used by `login` when none is passed
    pub password: Option<String>,
}

impl Conf {
    pub fn rows_per_page(&self) -> usize {
        match self.page_size {
            Some(size) if size > 0 => size,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn date_shift(&self) -> DateShift {
        DateShift::hours(self.date_shift_hours.unwrap_or(DEFAULT_DATE_SHIFT_HOURS))
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_file
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_FILE)
            .into()
    }

    /// Checks the base url parses and strips any trailing slash.
    pub fn backend(&self) -> Result<String, Report> {
        let trimmed = self.base_url.trim().trim_end_matches('/');

        let uri = Uri::try_from(trimmed)
            .with_context(|| format!("invalid base url `{}`", self.base_url))?;

        if uri.scheme().is_none() || uri.host().is_none() {
            bail!("base url `{}` needs a scheme and a host", self.base_url);
        }

        Ok(trimmed.to_string())
    }
}
