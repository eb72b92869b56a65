use std::collections::HashMap;
use anyhow::{anyhow, Context, Result};
use reqwest::Url;

/// Options of a `--sink` argument, written `kind[,key=value...]`.
#[derive(Debug, Default)]
pub struct Args {
    values: HashMap<String, String>,
}

impl Args {
    pub fn parse(arg: &str) -> Result<(String, Self)> {
        let (kind, rest) = arg.split_once(',').unwrap_or((arg, ""));
        let mut values = HashMap::new();

        for pair in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                anyhow!("expected key=value, got '{}'", pair)
            })?;
            values.insert(key.trim().to_owned(), value.trim().to_owned());
        }

        Ok((kind.trim().to_ascii_lowercase(), Self { values }))
    }

    pub fn get(&self, key: &str) -> Result<&str> {
        match self.values.get(key) {
            Some(value) => Ok(value.as_str()),
            None        => Err(anyhow!("missing sink option '{}'", key)),
        }
    }

    pub fn url(&self, key: &str) -> Result<Url> {
        let value = self.get(key)?;
        Url::parse(value).with_context(|| format!("invalid {} '{}'", key, value))
    }
}
