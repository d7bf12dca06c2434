//! Query construction for the Delphi Epidata API.
//!
//! Parameters keep the wire names the API expects. List parameters are
//! comma-joined and ranges are written `from-to`.

use crate::epiweek::EpiweekSpec;
use crate::error::{EpidataError, Result};
use std::fmt::Display;

/// Which revision of the data a `fluview` query asks for. `issues` and `lag`
/// are mutually exclusive on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// Most recent issue of every week
    Latest,
    /// Data as published in the given issues
    Issues(Vec<EpiweekSpec>),
    /// Data as reported `n` weeks after each epiweek
    Lag(u32),
}

/// Join list items with commas.
pub fn join_list<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn required_list<T: Display>(items: &[T], name: &'static str) -> Result<String> {
    if items.is_empty() {
        return Err(EpidataError::MissingParameter(name));
    }
    Ok(join_list(items))
}

/// A fully validated Epidata request: the `source` endpoint and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpidataQuery {
    params: Vec<(&'static str, String)>,
}

impl EpidataQuery {
    /// `fluview`: weighted ILI by HHS region.
    pub fn fluview<R: AsRef<str>>(
        regions: &[R],
        epiweeks: &[EpiweekSpec],
        revision: &Revision,
    ) -> Result<Self> {
        let regions: Vec<&str> = regions.iter().map(AsRef::as_ref).collect();
        let mut params = vec![
            ("source", "fluview".to_string()),
            ("regions", required_list(&regions, "regions")?),
            ("epiweeks", required_list(epiweeks, "epiweeks")?),
        ];
        match revision {
            Revision::Latest => {}
            Revision::Issues(issues) => params.push(("issues", required_list(issues, "issues")?)),
            Revision::Lag(lag) => params.push(("lag", lag.to_string())),
        }
        Ok(EpidataQuery { params })
    }

    /// `ilinet`: ILINet data by location; `auth` unlocks restricted locations.
    pub fn ilinet<L: AsRef<str>>(
        locations: &[L],
        epiweeks: &[EpiweekSpec],
        auth: Option<&str>,
    ) -> Result<Self> {
        let locations: Vec<&str> = locations.iter().map(AsRef::as_ref).collect();
        let mut params = vec![
            ("source", "ilinet".to_string()),
            ("locations", required_list(&locations, "locations")?),
            ("epiweeks", required_list(epiweeks, "epiweeks")?),
        ];
        if let Some(auth) = auth {
            params.push(("auth", auth.to_string()));
        }
        Ok(EpidataQuery { params })
    }

    /// `stateili`: state level ILI, always authenticated.
    pub fn stateili<S: AsRef<str>>(auth: &str, states: &[S], epiweeks: &[EpiweekSpec]) -> Result<Self> {
        if auth.is_empty() {
            return Err(EpidataError::MissingParameter("auth"));
        }
        let states: Vec<&str> = states.iter().map(AsRef::as_ref).collect();
        Ok(EpidataQuery {
            params: vec![
                ("source", "stateili".to_string()),
                ("auth", auth.to_string()),
                ("states", required_list(&states, "states")?),
                ("epiweeks", required_list(epiweeks, "epiweeks")?),
            ],
        })
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn source(&self) -> &str {
        self.param("source").unwrap_or_default()
    }

    /// The pinned lag, if this query asked for one.
    pub fn lag(&self) -> Option<u32> {
        self.param("lag").and_then(|lag| lag.parse().ok())
    }

    /// Short description for log lines. Never includes the auth token.
    pub fn describe(&self) -> String {
        self.params
            .iter()
            .filter(|(key, _)| *key != "auth")
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
